//! Daily Work dashboard: call and action workload per staff member

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vysyamala_core::types::{optional_text, string_or_number};
use vysyamala_core::{Count, CurrentUser};

use super::{date_cell, text_cell};
use crate::api_client::DashboardTransport;
use crate::controller::DashboardController;
use crate::error::DashboardResult;
use crate::filters::{COUNT_FILTER_PARAM, CardFilters, CountFilter};
use crate::kpi::{KpiCard, KpiSection};
use crate::query::QueryParams;
use crate::screen::{ExportableScreen, Payload, Screen, TableRow, decode_body, ensure_success};
use crate::text_filter::Searchable;

/// Daily Work screen marker
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyWork;

/// Filters of the Daily Work screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyWorkFilters {
    /// Staff member whose work is listed (`owner`)
    pub staff: String,
    /// Selected KPI category
    pub count_filter: CountFilter,
    /// Client-side search over profile id and name
    pub search_query: String,
}

impl CardFilters for DailyWorkFilters {
    fn count_filter(&self) -> &CountFilter {
        &self.count_filter
    }

    fn count_filter_mut(&mut self) -> &mut CountFilter {
        &mut self.count_filter
    }
}

/// Work and action counts of one plan segment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkCounts {
    /// Calls due today
    pub todays_work: Count,
    /// Overdue calls
    pub pending_work: Count,
    /// Actions due today
    pub todays_action: Count,
    /// Overdue actions
    pub pending_action: Count,
    /// Work assigned to the selected staff member
    pub assigned_work: Count,
}

/// `counts_by_type` block of the response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountsByType {
    /// Every plan together
    pub all: WorkCounts,
    /// Renewals
    pub renewal: WorkCounts,
    /// New registrations
    pub registration: WorkCounts,
    /// Prospects
    pub prospect: WorkCounts,
    /// Premium members
    pub premium: WorkCounts,
}

/// Summary of the Daily Work screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyWorkSummary {
    /// Counts per plan segment
    pub counts_by_type: CountsByType,
    /// Rows matching the selected category
    pub filtered_count: Count,
}

/// One work item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWorkRow {
    /// Profile id, e.g. `VYS12345`
    #[serde(rename = "ProfileId", default, deserialize_with = "string_or_number")]
    pub profile_id: String,
    /// Profile name
    #[serde(rename = "Profile_name", default, deserialize_with = "optional_text")]
    pub profile_name: Option<String>,
    /// Registration timestamp
    #[serde(rename = "DateOfJoin", default)]
    pub date_of_join: Option<String>,
    /// Next scheduled call
    #[serde(default)]
    pub next_call_date: Option<String>,
    /// Last login timestamp
    #[serde(rename = "Last_login_date", default)]
    pub last_login_date: Option<String>,
    /// Work category the row was listed under
    #[serde(default)]
    pub dashboard_type: Option<String>,
    /// Profile owner
    #[serde(default)]
    pub owner_name: Option<String>,
    /// Membership plan
    #[serde(default)]
    pub plan_name: Option<String>,
}

impl Searchable for DailyWorkRow {
    fn search_fields(&self) -> [&str; 2] {
        [&self.profile_id, self.profile_name.as_deref().unwrap_or_default()]
    }
}

impl TableRow for DailyWorkRow {
    const HEADERS: &'static [&'static str] = &[
        "Profile ID",
        "Date of Join",
        "Plan",
        "Owner",
        "Work Type",
        "Next Call",
        "Last Login",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.profile_id.clone(),
            date_cell(self.date_of_join.as_deref()),
            text_cell(self.plan_name.as_deref()),
            text_cell(self.owner_name.as_deref()),
            text_cell(self.dashboard_type.as_deref()),
            date_cell(self.next_call_date.as_deref()),
            date_cell(self.last_login_date.as_deref()),
        ]
    }
}

#[derive(Deserialize)]
struct DailyWorkBody {
    #[serde(default)]
    counts_by_type: CountsByType,
    #[serde(default)]
    filtered_count: Count,
    #[serde(default)]
    data: Option<Vec<DailyWorkRow>>,
}

fn work_section(
    title: &'static str,
    labels: [&'static str; 5],
    prefix: &str,
    counts: &WorkCounts,
) -> KpiSection {
    let [today_work, pending_work, today_task, pending_task, assigned] = labels;
    KpiSection::new(
        title,
        vec![
            KpiCard::new(today_work, counts.todays_work, &format!("{prefix}_today_work")),
            KpiCard::new(pending_work, counts.pending_work, &format!("{prefix}_pending_work")),
            KpiCard::new(today_task, counts.todays_action, &format!("{prefix}_today_task")),
            KpiCard::new(pending_task, counts.pending_action, &format!("{prefix}_pending_task")),
            KpiCard::new(assigned, counts.assigned_work, &format!("{prefix}_assigned_to_me")),
        ],
    )
}

impl Screen for DailyWork {
    type Filters = DailyWorkFilters;
    type Summary = DailyWorkSummary;
    type Row = DailyWorkRow;

    const NAME: &'static str = "daily-work";
    const ENDPOINT: &'static str = "api/daily-work-report/";

    fn default_filters(user: &CurrentUser) -> DailyWorkFilters {
        DailyWorkFilters {
            staff: user.default_owner(),
            ..DailyWorkFilters::default()
        }
    }

    fn query(filters: &DailyWorkFilters, user: &CurrentUser) -> QueryParams {
        QueryParams::new()
            .with("owner", user.owner_scope(&filters.staff))
            .with(COUNT_FILTER_PARAM, filters.count_filter.as_str())
    }

    fn decode(body: Value) -> DashboardResult<Payload<DailyWorkSummary, DailyWorkRow>> {
        ensure_success(Self::ENDPOINT, &body)?;
        let body: DailyWorkBody = decode_body(Self::ENDPOINT, body)?;
        Ok(Payload::new(
            DailyWorkSummary {
                counts_by_type: body.counts_by_type,
                filtered_count: body.filtered_count,
            },
            body.data.unwrap_or_default(),
        ))
    }

    fn search_query(filters: &DailyWorkFilters) -> &str {
        &filters.search_query
    }

    fn set_search_query(filters: &mut DailyWorkFilters, query: &str) {
        query.clone_into(&mut filters.search_query);
    }

    fn cards(summary: &DailyWorkSummary) -> Vec<KpiSection> {
        let counts = &summary.counts_by_type;
        let all = &counts.all;
        vec![
            KpiSection::new(
                "Overall",
                vec![
                    KpiCard::new("Total Call Work", all.todays_work, "all_today_work"),
                    KpiCard::new("Total Pending Work", all.pending_work, "all_pending_work"),
                    KpiCard::new("Total Action Work", all.todays_action, "all_today_task"),
                    KpiCard::new("Total Pending Action", all.pending_action, "all_pending_task"),
                ],
            ),
            work_section(
                "Renewal",
                ["Ren-TW", "Ren-PW", "Ren-TA", "Ren-PA", "Ren-AW"],
                "renewal",
                &counts.renewal,
            ),
            work_section(
                "Registration",
                ["Reg-TW", "Reg-PW", "Reg-TA", "Reg-PA", "Reg-AW"],
                "reg",
                &counts.registration,
            ),
            work_section(
                "Prospect",
                ["Pro-TW", "Pro-PW", "Pro-TA", "Pro-PA", "Pro-AW"],
                "pros",
                &counts.prospect,
            ),
            work_section(
                "Premium",
                ["Pre-TW", "Pre-PW", "Pre-TA", "Pre-PA", "Pre-AW"],
                "pre",
                &counts.premium,
            ),
        ]
    }
}

impl ExportableScreen for DailyWork {
    const EXPORT_STEM: &'static str = "Daily_Work_Report";
}

impl<T: DashboardTransport + ?Sized> DashboardController<DailyWork, T> {
    /// Pick the staff member whose work is listed
    ///
    /// Clears the card selection; the new staff member is fetched on the
    /// next apply.
    pub fn select_staff(&self, staff: &str) -> DailyWorkFilters {
        self.set_filters(|filters| {
            staff.trim().clone_into(&mut filters.staff);
            filters.count_filter.clear();
        })
    }
}
