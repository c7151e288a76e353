//! Filter state holder and fetch orchestrator for one dashboard screen
//!
//! Every fetch takes a ticket from a per-screen generation counter and a
//! fresh cancellation token; issuing a new fetch cancels the previous token.
//! A response may only touch the view state while its ticket is still the
//! current generation, so summary and rows always come from the most
//! recently issued request.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vysyamala_core::CurrentUser;

use crate::api_client::DashboardTransport;
use crate::error::{DashboardError, DashboardResult};
use crate::filters::{CardFilters, CountKey};
use crate::kpi::KpiSection;
use crate::query::QueryParams;
use crate::screen::{ExportableScreen, Screen};
use crate::text_filter::filter_rows;

/// What happened to one fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// The response replaced summary and rows
    Committed {
        /// Number of rows received
        rows: usize,
    },
    /// A newer fetch was issued; this one changed nothing
    Superseded,
    /// The request or decode failed; previous data was kept
    Failed(DashboardError),
}

impl FetchOutcome {
    /// Whether the response was committed
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    /// Whether a newer fetch took over
    #[must_use]
    pub const fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

/// What the row table should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView<R> {
    /// Nothing fetched yet
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch failed and there is nothing to show
    Failed(String),
    /// The last completed fetch produced no (matching) rows
    NoRecords,
    /// Rows to render
    Rows(Vec<R>),
}

struct ViewState<S: Screen> {
    filters: S::Filters,
    summary: Option<S::Summary>,
    original_rows: Vec<S::Row>,
    rows: Vec<S::Row>,
    notice: Option<String>,
    last_error: Option<String>,
    loading: bool,
    completed: bool,
    scroll_requested: bool,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl<S: Screen> ViewState<S> {
    const fn new(filters: S::Filters) -> Self {
        Self {
            filters,
            summary: None,
            original_rows: Vec::new(),
            rows: Vec::new(),
            notice: None,
            last_error: None,
            loading: false,
            completed: false,
            scroll_requested: false,
            generation: 0,
            in_flight: None,
        }
    }

    fn refilter(&mut self) {
        self.rows = filter_rows(&self.original_rows, S::search_query(&self.filters));
    }
}

/// Clears the loading state of a fetch whose future is dropped mid-request
///
/// Only touches the state while `ticket` is still the current generation,
/// so a newer fetch keeps its own loading flag.
struct LoadingGuard<S: Screen> {
    state: Arc<Mutex<ViewState<S>>>,
    ticket: u64,
    armed: bool,
}

impl<S: Screen> LoadingGuard<S> {
    const fn new(state: Arc<Mutex<ViewState<S>>>, ticket: u64) -> Self {
        Self {
            state,
            ticket,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<S: Screen> Drop for LoadingGuard<S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock();
        if state.generation == self.ticket {
            debug!(screen = S::NAME, ticket = self.ticket, "fetch dropped before completion");
            state.in_flight = None;
            state.loading = false;
            state.refilter();
        }
    }
}

/// Drives one dashboard screen
///
/// Cloning is cheap; clones share the same view state.
pub struct DashboardController<S: Screen, T: DashboardTransport + ?Sized> {
    state: Arc<Mutex<ViewState<S>>>,
    transport: Arc<T>,
    user: Arc<CurrentUser>,
}

impl<S: Screen, T: DashboardTransport + ?Sized> Clone for DashboardController<S, T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            transport: Arc::clone(&self.transport),
            user: Arc::clone(&self.user),
        }
    }
}

impl<S: Screen, T: DashboardTransport + ?Sized> fmt::Debug for DashboardController<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DashboardController")
            .field("screen", &S::NAME)
            .field("user", &self.user)
            .field("filters", &state.filters)
            .field("loading", &state.loading)
            .field("rows", &state.rows.len())
            .finish_non_exhaustive()
    }
}

impl<S: Screen, T: DashboardTransport + ?Sized> DashboardController<S, T> {
    /// Controller with the screen's default filters for `user`
    pub fn new(transport: Arc<T>, user: CurrentUser) -> Self {
        let filters = S::default_filters(&user);
        Self {
            state: Arc::new(Mutex::new(ViewState::new(filters))),
            transport,
            user: Arc::new(user),
        }
    }

    /// Identity this controller fetches for
    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    /// Current filters
    pub fn filters(&self) -> S::Filters {
        self.state.lock().filters.clone()
    }

    /// Edit the filters without fetching; returns the updated record
    ///
    /// Changes reach the server on the next [`apply_filters`](Self::apply_filters).
    pub fn set_filters<F>(&self, update: F) -> S::Filters
    where
        F: FnOnce(&mut S::Filters),
    {
        let mut state = self.state.lock();
        update(&mut state.filters);
        if !state.loading {
            state.refilter();
        }
        state.filters.clone()
    }

    /// Query the next fetch would send
    pub fn query(&self) -> QueryParams {
        S::query(&self.state.lock().filters, &self.user)
    }

    /// Fetch with the current filters, superseding any fetch in flight
    pub async fn apply_filters(&self) -> FetchOutcome {
        let (ticket, token, query) = {
            let mut state = self.state.lock();
            if let Some(previous) = state.in_flight.take() {
                previous.cancel();
            }
            state.generation = state.generation.wrapping_add(1);
            let token = CancellationToken::new();
            state.in_flight = Some(token.clone());
            state.loading = true;
            (state.generation, token, S::query(&state.filters, &self.user))
        };

        debug!(screen = S::NAME, ticket, query = %query, "fetching dashboard data");

        let mut guard = LoadingGuard::new(Arc::clone(&self.state), ticket);
        let response = token
            .run_until_cancelled(self.transport.get_json(S::ENDPOINT, &query))
            .await;
        // Reached only when the future ran to completion; disarm before locking
        guard.disarm();

        let Some(response) = response else {
            debug!(screen = S::NAME, ticket, "request cancelled");
            return FetchOutcome::Superseded;
        };
        let decoded = response.and_then(S::decode);

        let mut state = self.state.lock();
        if state.generation != ticket {
            debug!(screen = S::NAME, ticket, "discarding stale response");
            return FetchOutcome::Superseded;
        }
        state.in_flight = None;
        state.loading = false;
        state.completed = true;

        match decoded {
            Ok(payload) => {
                let rows = payload.rows.len();
                state.summary = Some(payload.summary);
                state.original_rows = payload.rows;
                state.notice = payload.notice;
                state.last_error = None;
                state.refilter();
                info!(screen = S::NAME, ticket, rows, "dashboard data committed");
                FetchOutcome::Committed { rows }
            }
            Err(error) => {
                warn!(
                    screen = S::NAME,
                    ticket,
                    network = error.is_network(),
                    %error,
                    "dashboard fetch failed"
                );
                state.last_error = Some(error.to_string());
                state.refilter();
                FetchOutcome::Failed(error)
            }
        }
    }

    /// Restore the default filters and fetch once
    pub async fn reset_filters(&self) -> FetchOutcome {
        {
            let mut state = self.state.lock();
            state.filters = S::default_filters(&self.user);
        }
        self.apply_filters().await
    }

    /// Update the client-side search text; never fetches
    ///
    /// While a fetch is in flight the text is only stored and gets applied
    /// to the rows that fetch commits. Returns the number of visible rows.
    pub fn set_search_query(&self, query: &str) -> usize {
        let mut state = self.state.lock();
        S::set_search_query(&mut state.filters, query);
        if !state.loading {
            state.refilter();
        }
        state.rows.len()
    }

    /// Abandon the fetch in flight, if any
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if let Some(token) = state.in_flight.take() {
            token.cancel();
        }
        state.generation = state.generation.wrapping_add(1);
        state.loading = false;
    }

    /// Latest committed summary
    pub fn summary(&self) -> Option<S::Summary> {
        self.state.lock().summary.clone()
    }

    /// KPI cards for the latest committed summary
    pub fn cards(&self) -> Vec<KpiSection> {
        self.state
            .lock()
            .summary
            .as_ref()
            .map(S::cards)
            .unwrap_or_default()
    }

    /// Rows after the client-side text filter
    pub fn rows(&self) -> Vec<S::Row> {
        self.state.lock().rows.clone()
    }

    /// Rows exactly as last fetched
    pub fn all_rows(&self) -> Vec<S::Row> {
        self.state.lock().original_rows.clone()
    }

    /// Whether a fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Message of the last failed fetch, cleared by the next commit
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    /// Informational message from the last commit
    pub fn notice(&self) -> Option<String> {
        self.state.lock().notice.clone()
    }

    /// What the table should currently render
    pub fn table_view(&self) -> TableView<S::Row> {
        let state = self.state.lock();
        if state.loading {
            TableView::Loading
        } else if !state.rows.is_empty() {
            TableView::Rows(state.rows.clone())
        } else if let (Some(error), true) = (&state.last_error, state.original_rows.is_empty()) {
            TableView::Failed(error.clone())
        } else if state.completed {
            TableView::NoRecords
        } else {
            TableView::Idle
        }
    }

    /// Consume a pending "scroll the table into view" request
    pub fn take_scroll_request(&self) -> bool {
        std::mem::take(&mut self.state.lock().scroll_requested)
    }

    pub(crate) fn update_filters<R>(&self, update: impl FnOnce(&mut S::Filters) -> R) -> R {
        update(&mut self.state.lock().filters)
    }
}

impl<S, T> DashboardController<S, T>
where
    S: Screen,
    S::Filters: CardFilters,
    T: DashboardTransport + ?Sized,
{
    /// Card click: toggle the category and fetch
    pub async fn click_card(&self, key: &CountKey) -> FetchOutcome {
        {
            let mut state = self.state.lock();
            state.filters.count_filter_mut().toggle(key);
            state.filters.on_card_selected();
            state.scroll_requested = true;
            debug!(
                screen = S::NAME,
                count_filter = state.filters.count_filter().as_str(),
                "card clicked"
            );
        }
        self.apply_filters().await
    }

    /// Category currently selected
    pub fn active_card(&self) -> Option<CountKey> {
        self.state.lock().filters.count_filter().get().cloned()
    }
}

impl<S, T> DashboardController<S, T>
where
    S: ExportableScreen,
    T: DashboardTransport + ?Sized,
{
    /// Download the spreadsheet for the current filters
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails.
    pub async fn export(&self) -> DashboardResult<ExportFile> {
        let query = S::export_query(&self.state.lock().filters, &self.user);
        info!(screen = S::NAME, query = %query, "downloading report");

        let bytes = self.transport.get_bytes(S::ENDPOINT, &query).await?;
        Ok(ExportFile {
            file_name: export_file_name(S::EXPORT_STEM, chrono::Local::now().date_naive()),
            bytes,
        })
    }
}

/// A downloaded spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// Suggested file name, e.g. `Marriage_Report_2025-08-12.xlsx`
    pub file_name: String,
    /// Spreadsheet bytes
    pub bytes: Bytes,
}

impl ExportFile {
    /// Write the file into `dir`, returning the full path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn write_to(&self, dir: &Path) -> DashboardResult<PathBuf> {
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

/// `<stem>_<YYYY-MM-DD>.xlsx`
#[must_use]
pub fn export_file_name(stem: &str, date: NaiveDate) -> String {
    format!("{stem}_{}.xlsx", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 12).unwrap_or_default();
        assert_eq!(
            export_file_name("Marriage_Report", date),
            "Marriage_Report_2025-08-12.xlsx"
        );
    }

    #[test]
    fn test_outcome_predicates() {
        assert!(FetchOutcome::Committed { rows: 0 }.is_committed());
        assert!(FetchOutcome::Superseded.is_superseded());
        assert!(!FetchOutcome::Failed(DashboardError::invalid_request("x")).is_committed());
    }
}
