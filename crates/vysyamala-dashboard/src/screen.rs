//! The contract every dashboard screen implements

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use vysyamala_core::CurrentUser;

use crate::error::{DashboardError, DashboardResult};
use crate::kpi::KpiSection;
use crate::query::QueryParams;
use crate::text_filter::Searchable;

/// Summary and rows decoded from one response
#[derive(Debug, Clone, PartialEq)]
pub struct Payload<S, R> {
    /// Aggregate counts behind the KPI cards
    pub summary: S,
    /// Row list for the table
    pub rows: Vec<R>,
    /// Informational message to show alongside an empty result
    pub notice: Option<String>,
}

impl<S, R> Payload<S, R> {
    /// Payload without a notice
    pub const fn new(summary: S, rows: Vec<R>) -> Self {
        Self {
            summary,
            rows,
            notice: None,
        }
    }
}

/// Rows that can be rendered as a plain table
pub trait TableRow {
    /// Column headings, in cell order
    const HEADERS: &'static [&'static str];

    /// Display text of every cell
    fn cells(&self) -> Vec<String>;
}

/// One dashboard screen: its filter record, wire format and cards
pub trait Screen: Send + Sync + 'static {
    /// Filter record
    type Filters: Clone + fmt::Debug + Send + Sync + 'static;
    /// Aggregate counts
    type Summary: Clone + fmt::Debug + Send + Sync + 'static;
    /// One table row
    type Row: Clone + fmt::Debug + Searchable + TableRow + Send + Sync + 'static;

    /// Name used in logs
    const NAME: &'static str;

    /// Endpoint path relative to the API base URL
    const ENDPOINT: &'static str;

    /// Filters a freshly opened or reset screen starts with
    fn default_filters(user: &CurrentUser) -> Self::Filters;

    /// Server-side query for the current filters; blank fields are omitted
    fn query(filters: &Self::Filters, user: &CurrentUser) -> QueryParams;

    /// Split a response body into summary and rows
    ///
    /// # Errors
    ///
    /// Returns an error when the body signals failure or has the wrong shape.
    fn decode(body: Value) -> DashboardResult<Payload<Self::Summary, Self::Row>>;

    /// Client-side search text held in the filters
    fn search_query(filters: &Self::Filters) -> &str;

    /// Replace the client-side search text
    fn set_search_query(filters: &mut Self::Filters, query: &str);

    /// KPI cards projected from a summary
    fn cards(_summary: &Self::Summary) -> Vec<KpiSection> {
        Vec::new()
    }
}

/// Screens whose report can be downloaded as a spreadsheet
pub trait ExportableScreen: Screen {
    /// File name stem, e.g. `Marriage_Report`
    const EXPORT_STEM: &'static str;

    /// Query for the download: the fetch query plus the export flag
    fn export_query(filters: &Self::Filters, user: &CurrentUser) -> QueryParams {
        Self::query(filters, user).with_export()
    }
}

/// Interpret the `status` / `Status` success flag of a response body
///
/// Booleans, non-zero numbers and the strings `"1"`, `"true"` and
/// `"success"` count as success. `None` means neither key is present.
#[must_use]
pub fn success_flag(body: &Value) -> Option<bool> {
    let flag = body.get("status").or_else(|| body.get("Status"))?;
    Some(match flag {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "success" | "ok"
        ),
        _ => false,
    })
}

/// Server supplied `message`, if any
#[must_use]
pub fn server_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("Message"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Fail unless the body carries a truthy success flag
///
/// # Errors
///
/// Returns [`DashboardError::Unsuccessful`] for a missing or false flag.
pub fn ensure_success(endpoint: &str, body: &Value) -> DashboardResult<()> {
    if success_flag(body) == Some(true) {
        Ok(())
    } else {
        Err(DashboardError::Unsuccessful {
            endpoint: endpoint.to_string(),
            message: server_message(body).unwrap_or_else(|| "status flag not set".to_string()),
        })
    }
}

/// Deserialize a typed response, tagging errors with the endpoint
///
/// # Errors
///
/// Returns [`DashboardError::Decode`] when the shape does not match.
pub fn decode_body<T: DeserializeOwned>(endpoint: &str, body: Value) -> DashboardResult<T> {
    serde_json::from_value(body).map_err(|e| DashboardError::decode(endpoint, e.to_string()))
}
