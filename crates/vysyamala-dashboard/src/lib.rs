//! Filter-driven dashboards for the Vysyamala admin back office
//!
//! Each screen keeps an in-memory filter record, turns it into a query,
//! fetches summary counts and rows from the admin API and exposes the
//! result as KPI cards and a table. Only the most recently issued fetch of
//! a screen may commit; older in-flight requests are cancelled.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api_client;
pub mod controller;
pub mod error;
pub mod filters;
pub mod kpi;
pub mod query;
pub mod screen;
pub mod screens;
pub mod text_filter;

// Re-export commonly used types
pub use api_client::{ApiClient, DashboardTransport, ProfileOwner, fetch_profile_owners};
pub use controller::{DashboardController, ExportFile, FetchOutcome, TableView};
pub use error::{DashboardError, DashboardResult};
pub use filters::{CardFilters, CountFilter, CountKey, Gender, Region, SortOrder};
pub use kpi::{KpiCard, KpiSection, RegionalCounts};
pub use query::QueryParams;
pub use screen::{ExportableScreen, Payload, Screen, TableRow};
pub use screens::{AdvanceSearch, DailyWork, Delete, Marriage};
