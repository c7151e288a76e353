//! Delete dashboard: deleted profiles by plan, region and reason

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vysyamala_core::types::{optional_text, string_or_number};
use vysyamala_core::{Count, CurrentUser};

use super::{date_cell, text_cell};
use crate::error::DashboardResult;
use crate::filters::{COUNT_FILTER_PARAM, CardFilters, CountFilter};
use crate::kpi::{KpiCard, KpiSection, RegionalCounts};
use crate::query::QueryParams;
use crate::screen::{ExportableScreen, Payload, Screen, TableRow, decode_body, ensure_success};
use crate::text_filter::Searchable;

/// Delete screen marker
#[derive(Debug, Clone, Copy, Default)]
pub struct Delete;

/// Filters of the Delete screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteFilters {
    /// Start of the delete date range, `YYYY-MM-DD`
    pub from_date: String,
    /// End of the delete date range, `YYYY-MM-DD`
    pub to_date: String,
    /// Profile owner
    pub owner: String,
    /// Selected KPI category
    pub count_filter: CountFilter,
    /// Client-side search over profile id and name
    pub search_query: String,
}

impl CardFilters for DeleteFilters {
    fn count_filter(&self) -> &CountFilter {
        &self.count_filter
    }

    fn count_filter_mut(&mut self) -> &mut CountFilter {
        &mut self.count_filter
    }
}

/// Deleted profiles per plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeletePlanCounts {
    /// Premium members
    pub premium: RegionalCounts,
    /// Free members
    pub free: RegionalCounts,
    /// Offer members
    pub offer: RegionalCounts,
    /// Prospects
    #[serde(alias = "propect")]
    pub prospect: RegionalCounts,
}

/// Summary of the Delete screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteSummary {
    /// Every deleted profile in range
    pub total_deleted: Count,
    /// Tamil Nadu versus other states
    pub region_counts: RegionalCounts,
    /// Split by plan and region
    pub plan_counts: DeletePlanCounts,
    /// Deleted this month
    pub current_month_deleted: Count,
    /// Deleted as duplicates
    pub duplicate: Count,
    /// Deleted as fake
    pub fake: Count,
    /// Deleted because the marriage was settled
    pub marriage_settled: Count,
    /// Any other reason
    pub others: Count,
    /// Hidden rather than deleted
    pub hidden: Count,
    /// Hidden this month
    pub current_month_hidden: Count,
    /// Awaiting a delete decision
    pub pending: Count,
    /// Awaiting a delete decision since this month
    pub current_month_pending: Count,
}

/// One deleted profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRow {
    /// Profile id
    #[serde(rename = "ProfileId", default, deserialize_with = "string_or_number")]
    pub profile_id: String,
    /// Profile name
    #[serde(rename = "Profile_name", default, deserialize_with = "optional_text")]
    pub profile_name: Option<String>,
    /// City
    #[serde(rename = "Profile_city", default)]
    pub city: Option<String>,
    /// State
    #[serde(default)]
    pub state: Option<String>,
    /// How the delete was requested, e.g. online
    #[serde(default)]
    pub mode: Option<String>,
    /// When the profile was deleted
    #[serde(default)]
    pub delete_date: Option<String>,
    /// When the profile was created
    #[serde(rename = "DateOfJoin", default)]
    pub created_date: Option<String>,
    /// Profile owner
    #[serde(default)]
    pub owner_name: Option<String>,
    /// Secondary delete status
    #[serde(default)]
    pub secondary_delete_status: Option<String>,
    /// Free-text comments for the "others" secondary status
    #[serde(default)]
    pub secondary_delete_comments: Option<String>,
}

impl Searchable for DeleteRow {
    fn search_fields(&self) -> [&str; 2] {
        [&self.profile_id, self.profile_name.as_deref().unwrap_or_default()]
    }
}

impl TableRow for DeleteRow {
    const HEADERS: &'static [&'static str] = &[
        "Profile ID",
        "Name",
        "City",
        "State",
        "Mode",
        "Delete Date",
        "Creation Date",
        "Owner",
        "Secondary Delete Status",
        "Secondary Delete Others Comments",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.profile_id.clone(),
            text_cell(self.profile_name.as_deref()),
            text_cell(self.city.as_deref()),
            text_cell(self.state.as_deref()),
            text_cell(self.mode.as_deref()),
            date_cell(self.delete_date.as_deref()),
            date_cell(self.created_date.as_deref()),
            text_cell(self.owner_name.as_deref()),
            text_cell(self.secondary_delete_status.as_deref()),
            text_cell(self.secondary_delete_comments.as_deref()),
        ]
    }
}

#[derive(Deserialize)]
struct DeleteBody {
    #[serde(flatten)]
    summary: DeleteSummary,
    #[serde(default)]
    data: Option<Vec<DeleteRow>>,
}

impl Screen for Delete {
    type Filters = DeleteFilters;
    type Summary = DeleteSummary;
    type Row = DeleteRow;

    const NAME: &'static str = "delete";
    const ENDPOINT: &'static str = "api/delete-report/";

    fn default_filters(user: &CurrentUser) -> DeleteFilters {
        DeleteFilters {
            owner: user.default_owner(),
            ..DeleteFilters::default()
        }
    }

    fn query(filters: &DeleteFilters, user: &CurrentUser) -> QueryParams {
        QueryParams::new()
            .with("from_date", &filters.from_date)
            .with("to_date", &filters.to_date)
            .with(COUNT_FILTER_PARAM, filters.count_filter.as_str())
            .with("owner", user.owner_scope(&filters.owner))
    }

    fn decode(body: Value) -> DashboardResult<Payload<DeleteSummary, DeleteRow>> {
        ensure_success(Self::ENDPOINT, &body)?;
        let body: DeleteBody = decode_body(Self::ENDPOINT, body)?;
        Ok(Payload::new(body.summary, body.data.unwrap_or_default()))
    }

    fn search_query(filters: &DeleteFilters) -> &str {
        &filters.search_query
    }

    fn set_search_query(filters: &mut DeleteFilters, query: &str) {
        query.clone_into(&mut filters.search_query);
    }

    fn cards(summary: &DeleteSummary) -> Vec<KpiSection> {
        let plans = &summary.plan_counts;
        vec![
            KpiSection::new(
                "Deleted Profiles",
                vec![
                    KpiCard::new("Total Delete", summary.total_deleted, ""),
                    KpiCard::regional("Tamilnadu / Others", summary.region_counts, "all"),
                    KpiCard::regional("Premium - TN/OTH", plans.premium, "premium"),
                    KpiCard::regional("Free - TN/OTH", plans.free, "free"),
                    KpiCard::regional("Offer - TN/OTH", plans.offer, "offer"),
                    KpiCard::regional("Prospect - TN/OTH", plans.prospect, "prospect"),
                    KpiCard::new(
                        "Current Month Delete",
                        summary.current_month_deleted,
                        "current_month",
                    ),
                ],
            ),
            KpiSection::new(
                "Reasons",
                vec![
                    KpiCard::new("Duplicate", summary.duplicate, "duplicate"),
                    KpiCard::new("Fake", summary.fake, "fake"),
                    KpiCard::new(
                        "Got married - Marriage settled",
                        summary.marriage_settled,
                        "marriage_settled",
                    ),
                    KpiCard::new("Others", summary.others, "others"),
                ],
            ),
            KpiSection::new(
                "Hidden / Pending",
                vec![
                    KpiCard::new("Hidden", summary.hidden, "hidden"),
                    KpiCard::new(
                        "Current Month Hidden",
                        summary.current_month_hidden,
                        "current_month_hidden",
                    ),
                    KpiCard::new("Pending", summary.pending, "pending"),
                    KpiCard::new(
                        "Current Month Pending",
                        summary.current_month_pending,
                        "current_month_pending",
                    ),
                ],
            ),
        ]
    }
}

impl ExportableScreen for Delete {
    const EXPORT_STEM: &'static str = "Delete_Report";
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::filters::{CountKey, Region};
    use crate::kpi::find_card;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_query_and_export_query() {
        let staff = CurrentUser::new("8", "4");
        let mut filters = Delete::default_filters(&staff);
        filters.to_date = "2025-08-31".to_string();
        filters.count_filter.toggle(&CountKey::new("fake"));

        assert_eq!(
            Delete::query(&filters, &staff).to_query_string(),
            "to_date=2025-08-31&countFilter=fake&owner=8"
        );
        assert_eq!(
            Delete::export_query(&filters, &staff).to_query_string(),
            "to_date=2025-08-31&countFilter=fake&owner=8&export=excel"
        );
    }

    #[test]
    fn test_decode_and_cards() {
        let body = json!({
            "status": true,
            "total_deleted": 100,
            "region_counts": {"total": 100, "tn": 40, "non-tn": 60},
            "plan_counts": {"offer": {"total": 20, "tn": 15, "non-tn": 5}},
            "duplicate": 4,
            "data": [{"ProfileId": "VYS12345", "Profile_name": "John Doe", "Profile_city": "Chennai"}]
        });
        let payload = Delete::decode(body).unwrap();
        assert_eq!(payload.summary.duplicate, Count(4));
        assert_eq!(payload.rows[0].cells()[2], "Chennai");

        let sections = Delete::cards(&payload.summary);
        assert_eq!(sections[0].cards[1].display_value(), "100 - 40/60");
        assert_eq!(sections[0].cards[4].display_value(), "20 - 15/5");

        let tn = CountKey::new("all").regional(Region::TamilNadu);
        assert_eq!(find_card(&sections, &tn).map(|c| c.label), Some("Tamilnadu / Others"));
    }

    #[test]
    fn test_null_rows_decode_as_empty() {
        let payload = Delete::decode(json!({"status": 1, "data": null})).unwrap();
        assert!(payload.rows.is_empty());
    }
}
