//! Advance search: paged profile search over a large criteria form

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use vysyamala_core::types::{optional_text, string_or_number};
use vysyamala_core::utils::split_iso_date;
use vysyamala_core::{Count, CurrentUser};

use super::text_cell;
use crate::api_client::DashboardTransport;
use crate::controller::{DashboardController, FetchOutcome};
use crate::error::{DashboardError, DashboardResult};
use crate::query::QueryParams;
use crate::screen::{Payload, Screen, TableRow, decode_body, server_message, success_flag};
use crate::text_filter::Searchable;

/// Rows per page when nothing else was chosen
pub const DEFAULT_PER_PAGE: usize = 10;

/// Notice shown when the server reports no match without a message
pub const NO_RECORDS_NOTICE: &str = "No records found";

/// Advance search screen marker
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvanceSearch;

/// The search form
///
/// Every field is free text or a list of option ids; blank fields are not
/// sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    /// Profile id
    pub profile_id: String,
    /// Profile name
    pub name: String,
    /// Date of birth, `YYYY-MM-DD`; sent as separate day, month and year
    pub dob: String,
    /// Minimum age
    pub age_from: String,
    /// Maximum age
    pub age_to: String,
    /// Gender
    pub gender: String,
    /// Mobile, phone or WhatsApp number
    pub contact: String,
    /// Email address
    pub email: String,
    /// Father's name
    pub father_name: String,
    /// Father's occupation
    pub father_occupation: String,
    /// Mother's name
    pub mother_name: String,
    /// Mother's occupation
    pub mother_occupation: String,
    /// Family business name
    pub business_name: String,
    /// Employer
    pub company_name: String,
    /// State id
    pub state: String,
    /// City
    pub city: String,
    /// Profile status code
    pub status: String,
    /// Who created the profile
    pub created_by: String,
    /// Address text
    pub address: String,
    /// Admin comments text
    pub admin_comments: String,
    /// Lower annual income bound (income option id)
    pub min_annual_income: String,
    /// Upper annual income bound (income option id)
    pub max_annual_income: String,
    /// Membership plan id
    pub membership: String,
    /// Marital status ids
    pub marital_statuses: Vec<String>,
    /// Birth star ids
    pub birth_stars: Vec<String>,
    /// Highest education id
    pub education: String,
    /// Field of study id
    pub field_of_study: String,
    /// Degree ids
    pub degrees: Vec<String>,
    /// Delete status
    pub delete_status: String,
}

fn join_ids(ids: &[String]) -> String {
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

impl SearchCriteria {
    /// Append the form's API parameters to `query`
    pub fn write_query(&self, query: &mut QueryParams) {
        query.push("search_profile_id", &self.profile_id);
        query.push("profile_name", &self.name);
        if let Some((day, month, year)) = split_iso_date(&self.dob) {
            query.push("dob_date", day);
            query.push("dob_month", month);
            query.push("dob_year", year);
        }
        query
            .push("age_from", &self.age_from)
            .push("age_to", &self.age_to)
            .push("gender", &self.gender)
            .push("mobile_no", &self.contact)
            .push("email_id", &self.email)
            .push("father_name", &self.father_name)
            .push("father_occupation", &self.father_occupation)
            .push("mother_name", &self.mother_name)
            .push("mother_occupation", &self.mother_occupation)
            .push("business_name", &self.business_name)
            .push("company_name", &self.company_name)
            .push("state", &self.state)
            .push("city", &self.city)
            .push("status", &self.status)
            .push("created_by", &self.created_by)
            .push("address", &self.address)
            .push("admin_comments", &self.admin_comments)
            .push("min_anual_income", &self.min_annual_income)
            .push("max_anual_income", &self.max_annual_income)
            .push("membership", &self.membership)
            .push("martial_status", join_ids(&self.marital_statuses))
            .push("matching_stars", join_ids(&self.birth_stars))
            .push("education", &self.education)
            .push("field_of_study", &self.field_of_study)
            .push("degree", join_ids(&self.degrees))
            .push("delete_status", &self.delete_status);
    }
}

/// Filters of the advance search screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceSearchFilters {
    /// Submitted form
    pub criteria: SearchCriteria,
    /// Zero-based page index
    pub page: usize,
    /// Rows per page
    pub per_page: usize,
    /// Client-side search over profile id and name
    pub search_query: String,
}

impl Default for AdvanceSearchFilters {
    fn default() -> Self {
        Self {
            criteria: SearchCriteria::default(),
            page: 0,
            per_page: DEFAULT_PER_PAGE,
            search_query: String::new(),
        }
    }
}

/// Result counts of the advance search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchSummary {
    /// Matches across all pages
    pub total_count: Count,
}

impl SearchSummary {
    /// Number of pages at `per_page` rows each
    #[must_use]
    pub fn page_count(self, per_page: usize) -> usize {
        let total = usize::try_from(self.total_count.get()).unwrap_or(usize::MAX);
        total.div_ceil(per_page.max(1))
    }
}

/// One search hit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchProfile {
    /// Profile id
    #[serde(default, deserialize_with = "string_or_number")]
    pub profile_id: String,
    /// Profile name
    #[serde(default, deserialize_with = "optional_text")]
    pub profile_name: Option<String>,
    /// Photo URL
    #[serde(default)]
    pub profile_img: Option<String>,
    /// Age in years
    #[serde(default, deserialize_with = "optional_text")]
    pub profile_age: Option<String>,
    /// Gender
    #[serde(default)]
    pub profile_gender: Option<String>,
    /// Height
    #[serde(default, deserialize_with = "optional_text")]
    pub height: Option<String>,
    /// Profession
    #[serde(default)]
    pub profession: Option<String>,
    /// City or state
    #[serde(default)]
    pub location: Option<String>,
    /// Birth star
    #[serde(default)]
    pub star: Option<String>,
    /// `1` when the profile is verified
    #[serde(default)]
    pub verified: Count,
}

impl SearchProfile {
    /// Whether the profile carries the verified badge
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified.get() == 1
    }
}

impl Searchable for SearchProfile {
    fn search_fields(&self) -> [&str; 2] {
        [&self.profile_id, self.profile_name.as_deref().unwrap_or_default()]
    }
}

impl TableRow for SearchProfile {
    const HEADERS: &'static [&'static str] = &[
        "Profile ID",
        "Name",
        "Age",
        "Gender",
        "Height",
        "Profession",
        "Location",
        "Star",
        "Verified",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.profile_id.clone(),
            text_cell(self.profile_name.as_deref()),
            text_cell(self.profile_age.as_deref()),
            text_cell(self.profile_gender.as_deref()),
            text_cell(self.height.as_deref()),
            text_cell(self.profession.as_deref()),
            text_cell(self.location.as_deref()),
            text_cell(self.star.as_deref()),
            if self.is_verified() { "yes" } else { "no" }.to_string(),
        ]
    }
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(default)]
    profiles: Option<Vec<SearchProfile>>,
    #[serde(default)]
    total_count: Option<Count>,
}

impl Screen for AdvanceSearch {
    type Filters = AdvanceSearchFilters;
    type Summary = SearchSummary;
    type Row = SearchProfile;

    const NAME: &'static str = "advance-search";
    const ENDPOINT: &'static str = "api/common-search/";

    fn default_filters(_user: &CurrentUser) -> AdvanceSearchFilters {
        AdvanceSearchFilters::default()
    }

    fn query(filters: &AdvanceSearchFilters, _user: &CurrentUser) -> QueryParams {
        let mut query = QueryParams::new();
        filters.criteria.write_query(&mut query);
        query
            .push("page_number", (filters.page + 1).to_string())
            .push("per_page", filters.per_page.max(1).to_string());
        query
    }

    /// A non-success `Status` is an empty result, not an error
    fn decode(body: Value) -> DashboardResult<Payload<SearchSummary, SearchProfile>> {
        if success_flag(&body) != Some(true) {
            let notice = server_message(&body).unwrap_or_else(|| NO_RECORDS_NOTICE.to_string());
            debug!(%notice, "search returned no result");
            return Ok(Payload {
                summary: SearchSummary::default(),
                rows: Vec::new(),
                notice: Some(notice),
            });
        }

        let body: SearchBody = decode_body(Self::ENDPOINT, body)?;
        let rows = body.profiles.unwrap_or_default();
        let total_count = body
            .total_count
            .filter(|count| count.get() > 0)
            .unwrap_or_else(|| Count(rows.len() as u64));
        Ok(Payload::new(SearchSummary { total_count }, rows))
    }

    fn search_query(filters: &AdvanceSearchFilters) -> &str {
        &filters.search_query
    }

    fn set_search_query(filters: &mut AdvanceSearchFilters, query: &str) {
        query.clone_into(&mut filters.search_query);
    }
}

impl<T: DashboardTransport + ?Sized> DashboardController<AdvanceSearch, T> {
    /// Run a new search from the first page
    pub async fn submit(&self, criteria: SearchCriteria) -> FetchOutcome {
        self.update_filters(|filters| {
            filters.criteria = criteria;
            filters.page = 0;
        });
        self.apply_filters().await
    }

    /// Zero-based page currently shown
    pub fn current_page(&self) -> usize {
        self.filters().page
    }

    /// Pages available for the last result
    pub fn page_count(&self) -> usize {
        let per_page = self.filters().per_page;
        self.summary()
            .map_or(0, |summary| summary.page_count(per_page))
    }

    /// Jump to a one-based page number, as typed into the "go to" box
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InvalidRequest`] for page numbers outside
    /// the last result; nothing is fetched in that case.
    pub async fn go_to_page(&self, page_number: usize) -> DashboardResult<FetchOutcome> {
        let pages = self.page_count();
        if page_number == 0 || page_number > pages {
            return Err(DashboardError::invalid_request(format!(
                "page {page_number} is outside 1..={pages}"
            )));
        }
        self.update_filters(|filters| filters.page = page_number - 1);
        Ok(self.apply_filters().await)
    }

    /// Fetch the following page; `None` on the last page
    pub async fn next_page(&self) -> Option<FetchOutcome> {
        let next = self.current_page() + 1;
        if next >= self.page_count() {
            return None;
        }
        self.update_filters(|filters| filters.page = next);
        Some(self.apply_filters().await)
    }

    /// Fetch the preceding page; `None` on the first page
    pub async fn previous_page(&self) -> Option<FetchOutcome> {
        let previous = self.current_page().checked_sub(1)?;
        self.update_filters(|filters| filters.page = previous);
        Some(self.apply_filters().await)
    }

    /// Change the page size and go back to the first page
    pub async fn set_per_page(&self, per_page: usize) -> FetchOutcome {
        self.update_filters(|filters| {
            filters.per_page = per_page.max(1);
            filters.page = 0;
        });
        self.apply_filters().await
    }
}

/// Profiles ticked in the result table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSelection {
    selected: BTreeSet<String>,
}

impl ProfileSelection {
    /// Empty selection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick or untick one profile
    pub fn toggle(&mut self, profile_id: &str) {
        if !self.selected.remove(profile_id) {
            self.selected.insert(profile_id.to_string());
        }
    }

    /// Header checkbox: untick everything when the whole page is ticked,
    /// otherwise select exactly the page
    pub fn toggle_all(&mut self, page: &[SearchProfile]) {
        if self.all_selected(page) {
            self.selected.clear();
        } else {
            self.selected = page.iter().map(|p| p.profile_id.clone()).collect();
        }
    }

    /// Whether every row of a non-empty page is ticked
    #[must_use]
    pub fn all_selected(&self, page: &[SearchProfile]) -> bool {
        !page.is_empty() && page.iter().all(|p| self.selected.contains(&p.profile_id))
    }

    /// Whether `profile_id` is ticked
    #[must_use]
    pub fn contains(&self, profile_id: &str) -> bool {
        self.selected.contains(profile_id)
    }

    /// Ticked profile ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Number of ticked profiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is ticked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Untick everything
    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
