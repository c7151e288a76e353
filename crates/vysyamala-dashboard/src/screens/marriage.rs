//! Marriage dashboard: profiles whose marriage was settled

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vysyamala_core::types::{optional_text, string_or_number};
use vysyamala_core::{Count, CurrentUser};

use super::{date_cell, text_cell};
use crate::api_client::DashboardTransport;
use crate::controller::{DashboardController, FetchOutcome};
use crate::error::DashboardResult;
use crate::filters::{COUNT_FILTER_PARAM, CardFilters, CountFilter, Gender, SortOrder};
use crate::kpi::{KpiCard, KpiSection, RegionalCounts};
use crate::query::QueryParams;
use crate::screen::{ExportableScreen, Payload, Screen, TableRow, decode_body, ensure_success};
use crate::text_filter::Searchable;

/// Marriage screen marker
#[derive(Debug, Clone, Copy, Default)]
pub struct Marriage;

/// Filters of the Marriage screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarriageFilters {
    /// Date the range applies to (`particular_id`)
    pub particulars: String,
    /// Start of the date range, `YYYY-MM-DD`
    pub from_date: String,
    /// End of the date range, `YYYY-MM-DD`
    pub to_date: String,
    /// Profile owner
    pub owner: String,
    /// Exact profile id searched on the server
    pub profile_id: String,
    /// Client-side search over profile id and name
    pub search_query: String,
    /// Selected KPI category
    pub count_filter: CountFilter,
    /// Gender restriction, if any
    pub gender: Option<Gender>,
    /// Row order
    pub order: SortOrder,
}

impl CardFilters for MarriageFilters {
    fn count_filter(&self) -> &CountFilter {
        &self.count_filter
    }

    fn count_filter_mut(&mut self) -> &mut CountFilter {
        &mut self.count_filter
    }

    fn on_card_selected(&mut self) {
        self.search_query.clear();
        self.gender = None;
        self.order = SortOrder::Desc;
    }
}

/// Plan counts with a regional split
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanCounts {
    /// Premium members
    pub premium: RegionalCounts,
    /// Free and offer members together
    pub free_offer: RegionalCounts,
    /// Prospects
    #[serde(alias = "propect")]
    pub prospect: RegionalCounts,
}

/// Call workload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarriageWorkCounts {
    /// Calls due today
    pub today_work: Count,
    /// Overdue calls
    pub pending_work: Count,
}

/// Action workload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarriageTaskCounts {
    /// Actions due today
    pub today_task: Count,
    /// Overdue actions
    pub pending_task: Count,
}

/// Summary of the Marriage screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarriageSummary {
    /// Every settled profile
    pub total_profiles: Count,
    /// Split by plan and region
    pub plan_counts: PlanCounts,
    /// Call workload
    pub work_counts: MarriageWorkCounts,
    /// Action workload
    pub task_counts: MarriageTaskCounts,
    /// Profiles assigned to the operator
    pub assigned_to_me: Count,
}

/// One settled profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarriageProfile {
    /// Profile id
    #[serde(rename = "ProfileId", default, deserialize_with = "string_or_number")]
    pub profile_id: String,
    /// Date the profile was marked deleted
    #[serde(default)]
    pub dh_date_time: Option<String>,
    /// Profile name
    #[serde(rename = "Profile_name", default, deserialize_with = "optional_text")]
    pub profile_name: Option<String>,
    /// Age in years
    #[serde(default, deserialize_with = "optional_text")]
    pub age: Option<String>,
    /// Membership plan
    #[serde(default)]
    pub plan_name: Option<String>,
    /// State
    #[serde(default)]
    pub state: Option<String>,
    /// City
    #[serde(rename = "Profile_city", default)]
    pub profile_city: Option<String>,
    /// Profile owner
    #[serde(default)]
    pub owner_name: Option<String>,
    /// Marriage date
    #[serde(default)]
    pub marriagedate: Option<String>,
    /// Engagement date
    #[serde(default)]
    pub engagementdate: Option<String>,
    /// Profile id of the groom or bride, when also a member
    #[serde(default, deserialize_with = "optional_text")]
    pub groombridevysysaid: Option<String>,
    /// How the marriage was settled
    #[serde(default)]
    pub settledthru: Option<String>,
    /// Marriage photo details
    #[serde(default)]
    pub marriagephotodetails: Option<String>,
    /// Engagement photo details
    #[serde(default)]
    pub engagementphotodetails: Option<String>,
    /// Invitation details
    #[serde(default)]
    pub marriageinvitationdetails: Option<String>,
    /// Last call
    #[serde(default)]
    pub last_call_date: Option<String>,
    /// Notes from the last call
    #[serde(default)]
    pub last_call_comments: Option<String>,
    /// Next scheduled call
    #[serde(default)]
    pub next_call_date: Option<String>,
}

impl Searchable for MarriageProfile {
    fn search_fields(&self) -> [&str; 2] {
        [&self.profile_id, self.profile_name.as_deref().unwrap_or_default()]
    }
}

impl TableRow for MarriageProfile {
    const HEADERS: &'static [&'static str] = &[
        "Profile ID",
        "Deleted",
        "Name",
        "Age",
        "Plan",
        "State",
        "City",
        "Owner",
        "Marriage Date",
        "Engagement Date",
        "Groom/Bride ID",
        "Settled Thru",
        "Marriage Photo",
        "Engagement Photo",
        "Invitation",
        "Last Call",
        "Last Call Comments",
        "Next Call",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.profile_id.clone(),
            date_cell(self.dh_date_time.as_deref()),
            text_cell(self.profile_name.as_deref()),
            text_cell(self.age.as_deref()),
            text_cell(self.plan_name.as_deref()),
            text_cell(self.state.as_deref()),
            text_cell(self.profile_city.as_deref()),
            text_cell(self.owner_name.as_deref()),
            text_cell(self.marriagedate.as_deref()),
            text_cell(self.engagementdate.as_deref()),
            text_cell(self.groombridevysysaid.as_deref()),
            text_cell(self.settledthru.as_deref()),
            text_cell(self.marriagephotodetails.as_deref()),
            text_cell(self.engagementphotodetails.as_deref()),
            text_cell(self.marriageinvitationdetails.as_deref()),
            date_cell(self.last_call_date.as_deref()),
            text_cell(self.last_call_comments.as_deref()),
            date_cell(self.next_call_date.as_deref()),
        ]
    }
}

#[derive(Deserialize)]
struct MarriageBody {
    #[serde(flatten)]
    summary: MarriageSummary,
    #[serde(default)]
    data: Option<Vec<MarriageProfile>>,
}

impl Screen for Marriage {
    type Filters = MarriageFilters;
    type Summary = MarriageSummary;
    type Row = MarriageProfile;

    const NAME: &'static str = "marriage";
    const ENDPOINT: &'static str = "api/marriage-report/";

    fn default_filters(user: &CurrentUser) -> MarriageFilters {
        MarriageFilters {
            owner: user.default_owner(),
            ..MarriageFilters::default()
        }
    }

    fn query(filters: &MarriageFilters, user: &CurrentUser) -> QueryParams {
        QueryParams::new()
            .with("particular_id", &filters.particulars)
            .with("from_date", &filters.from_date)
            .with("to_date", &filters.to_date)
            .with("profile_id", &filters.profile_id)
            .with(COUNT_FILTER_PARAM, filters.count_filter.as_str())
            .with("genderFilter", filters.gender.map_or("", Gender::as_str))
            .with("order_by", filters.order.as_str())
            .with("owner", user.owner_scope(&filters.owner))
    }

    fn decode(body: Value) -> DashboardResult<Payload<MarriageSummary, MarriageProfile>> {
        ensure_success(Self::ENDPOINT, &body)?;
        let body: MarriageBody = decode_body(Self::ENDPOINT, body)?;
        Ok(Payload::new(body.summary, body.data.unwrap_or_default()))
    }

    fn search_query(filters: &MarriageFilters) -> &str {
        &filters.search_query
    }

    fn set_search_query(filters: &mut MarriageFilters, query: &str) {
        query.clone_into(&mut filters.search_query);
    }

    fn cards(summary: &MarriageSummary) -> Vec<KpiSection> {
        let plans = &summary.plan_counts;
        vec![
            KpiSection::new(
                "Overall",
                vec![
                    KpiCard::new("Total Profiles", summary.total_profiles, ""),
                    KpiCard::regional("Premium - TN/OTH", plans.premium, "premium"),
                    KpiCard::regional("Free + Offer - TN/OTH", plans.free_offer, "free"),
                    KpiCard::regional("Prospect - TN/OTH", plans.prospect, "prospect"),
                ],
            ),
            KpiSection::new(
                "Work",
                vec![
                    KpiCard::new("Today's Work", summary.work_counts.today_work, "today_work"),
                    KpiCard::new("Pending Work", summary.work_counts.pending_work, "pending_work"),
                    KpiCard::new("Today's Action", summary.task_counts.today_task, "today_task"),
                    KpiCard::new("Pending Action", summary.task_counts.pending_task, "pending_task"),
                    KpiCard::new("Assigned Work", summary.assigned_to_me, "assigned_to_me"),
                ],
            ),
        ]
    }
}

impl ExportableScreen for Marriage {
    const EXPORT_STEM: &'static str = "Marriage_Report";
}

impl<T: DashboardTransport + ?Sized> DashboardController<Marriage, T> {
    /// Flip the row order and fetch right away
    pub async fn toggle_sort_order(&self) -> FetchOutcome {
        self.update_filters(|filters| filters.order = filters.order.toggled());
        self.apply_filters().await
    }

    /// Restrict to one gender; applied on the next fetch
    pub fn set_gender(&self, gender: Option<Gender>) -> MarriageFilters {
        self.set_filters(|filters| filters.gender = gender)
    }

    /// Empty the search box and show every fetched row again
    pub fn clear_search(&self) -> usize {
        self.set_search_query("")
    }
}
