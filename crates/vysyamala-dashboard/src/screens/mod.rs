//! The four admin dashboards

pub mod advance_search;
pub mod daily_work;
pub mod delete;
pub mod marriage;

pub use advance_search::{AdvanceSearch, ProfileSelection, SearchCriteria, SearchProfile};
pub use daily_work::{DailyWork, DailyWorkFilters, DailyWorkRow, DailyWorkSummary};
pub use delete::{Delete, DeleteFilters, DeleteRow, DeleteSummary};
pub use marriage::{Marriage, MarriageFilters, MarriageProfile, MarriageSummary};

use vysyamala_core::utils::{display_date, display_text};

/// `N/A` for blank text cells
pub(crate) fn text_cell(value: Option<&str>) -> String {
    display_text(value).to_string()
}

/// `YYYY-MM-DD` or `N/A` for timestamp cells
pub(crate) fn date_cell(value: Option<&str>) -> String {
    display_date(value)
}
