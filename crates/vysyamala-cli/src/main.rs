//! Vysyamala admin dashboards from the terminal
//!
//! Each subcommand drives one dashboard screen once: build the filters from
//! flags, optionally click a KPI card, fetch, optionally narrow the rows with
//! the client-side text filter, and print the cards and the table.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use vysyamala_core::{Config, CurrentUser, init_logging};
use vysyamala_dashboard::screens::{DailyWorkFilters, DeleteFilters, MarriageFilters, SearchCriteria};
use vysyamala_dashboard::{
    AdvanceSearch, ApiClient, CardFilters, CountKey, DailyWork, DashboardController,
    DashboardError, DashboardResult, Delete, ExportableScreen, FetchOutcome, Gender, Marriage,
    Screen, SortOrder,
};

/// Command line interface for the admin dashboards
#[derive(Parser)]
#[command(
    name = "vysyamala-admin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Back-office dashboards of the Vysyamala matrimony service",
    long_about = "Fetches the Daily Work, Marriage, Delete and Advance Search dashboards from the admin API and prints their KPI cards and row tables."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Print results and logs as JSON
    #[arg(long)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the dashboard subcommands
#[derive(Args, Debug, Clone, Default)]
struct ViewArgs {
    /// KPI card key to click before fetching, e.g. `premium_tn`
    #[arg(long, value_name = "KEY")]
    card: Option<String>,

    /// Client-side filter over profile id and name
    #[arg(short, long, value_name = "TEXT")]
    search: Option<String>,
}

/// Date range and owner flags
#[derive(Args, Debug, Clone, Default)]
struct RangeArgs {
    /// Start date, `YYYY-MM-DD`
    #[arg(long, value_name = "DATE")]
    from: Option<String>,

    /// End date, `YYYY-MM-DD`
    #[arg(long, value_name = "DATE")]
    to: Option<String>,

    /// Profile owner id (privileged users only)
    #[arg(long, value_name = "ID")]
    owner: Option<String>,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Daily Work report of one staff member
    DailyWork {
        /// Staff member id (privileged users only)
        #[arg(long, value_name = "ID")]
        staff: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Marriage settlement report
    Marriage {
        #[command(flatten)]
        range: RangeArgs,

        /// Marriage particulars id
        #[arg(long, value_name = "ID")]
        particulars: Option<String>,

        /// Single profile id
        #[arg(long, value_name = "PROFILE")]
        profile_id: Option<String>,

        /// Gender (male or female)
        #[arg(long)]
        gender: Option<Gender>,

        /// Sort order (asc or desc)
        #[arg(long)]
        order: Option<SortOrder>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Deleted profiles report
    Delete {
        #[command(flatten)]
        range: RangeArgs,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Paged advance search
    Search {
        #[command(flatten)]
        criteria: SearchArgs,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page
        #[arg(long, default_value_t = vysyamala_dashboard::screens::advance_search::DEFAULT_PER_PAGE)]
        per_page: usize,

        /// Client-side filter over profile id and name
        #[arg(short, long, value_name = "TEXT")]
        search: Option<String>,
    },

    /// List profile owners for the staff picker
    Owners,

    /// Download a report spreadsheet
    Export {
        /// Report to download
        #[arg(value_enum)]
        report: Report,

        #[command(flatten)]
        range: RangeArgs,

        /// KPI card key to narrow the report to
        #[arg(long, value_name = "KEY")]
        card: Option<String>,

        /// Output directory (defaults to `export.output_dir`)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Show the resolved configuration
    Config,
}

/// Advance search form flags
#[derive(Args, Debug, Clone, Default)]
struct SearchArgs {
    /// Profile id
    #[arg(long)]
    profile_id: Option<String>,

    /// Profile name
    #[arg(long)]
    name: Option<String>,

    /// Date of birth, `YYYY-MM-DD`
    #[arg(long)]
    dob: Option<String>,

    /// Minimum age
    #[arg(long)]
    age_from: Option<String>,

    /// Maximum age
    #[arg(long)]
    age_to: Option<String>,

    /// Gender
    #[arg(long)]
    gender: Option<String>,

    /// Mobile number
    #[arg(long)]
    mobile: Option<String>,

    /// Email address
    #[arg(long)]
    email: Option<String>,

    /// State id
    #[arg(long)]
    state: Option<String>,

    /// City
    #[arg(long)]
    city: Option<String>,

    /// Membership plan id
    #[arg(long)]
    membership: Option<String>,

    /// Marital status ids
    #[arg(long, value_delimiter = ',')]
    marital_status: Vec<String>,

    /// Birth star ids
    #[arg(long, value_delimiter = ',')]
    star: Vec<String>,
}

impl From<SearchArgs> for SearchCriteria {
    fn from(args: SearchArgs) -> Self {
        Self {
            profile_id: args.profile_id.unwrap_or_default(),
            name: args.name.unwrap_or_default(),
            dob: args.dob.unwrap_or_default(),
            age_from: args.age_from.unwrap_or_default(),
            age_to: args.age_to.unwrap_or_default(),
            gender: args.gender.unwrap_or_default(),
            contact: args.mobile.unwrap_or_default(),
            email: args.email.unwrap_or_default(),
            state: args.state.unwrap_or_default(),
            city: args.city.unwrap_or_default(),
            membership: args.membership.unwrap_or_default(),
            marital_statuses: args.marital_status,
            birth_stars: args.star,
            ..Self::default()
        }
    }
}

/// Reports that can be downloaded
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Report {
    /// Daily Work report
    DailyWork,
    /// Marriage report
    Marriage,
    /// Delete report
    Delete,
}

/// Main entry point
///
/// # Errors
///
/// Returns an error if configuration, logging, a fetch or an export fails
#[tokio::main]
async fn main() -> DashboardResult<()> {
    let cli = Cli::parse();

    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json {
        "json".clone_into(&mut config.logging.format);
    }
    init_logging(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        "Vysyamala admin starting"
    );

    let user = config.current_user();
    let client = Arc::new(ApiClient::from_config(&config.api)?);
    let as_json = cli.json;

    match cli.command {
        Commands::DailyWork { staff, view } => {
            let controller = DashboardController::<DailyWork, _>::new(client, user);
            controller.set_filters(|filters: &mut DailyWorkFilters| {
                set_if_some(&mut filters.staff, staff);
            });
            show_card_screen(&controller, &view, as_json).await
        }
        Commands::Marriage {
            range,
            particulars,
            profile_id,
            gender,
            order,
            view,
        } => {
            let controller = DashboardController::<Marriage, _>::new(client, user);
            controller.set_filters(|filters: &mut MarriageFilters| {
                range.apply(&mut filters.from_date, &mut filters.to_date, &mut filters.owner);
                set_if_some(&mut filters.particulars, particulars);
                set_if_some(&mut filters.profile_id, profile_id);
                filters.gender = gender;
                filters.order = order.unwrap_or_default();
            });
            show_card_screen(&controller, &view, as_json).await
        }
        Commands::Delete { range, view } => {
            let controller = DashboardController::<Delete, _>::new(client, user);
            controller.set_filters(|filters: &mut DeleteFilters| {
                range.apply(&mut filters.from_date, &mut filters.to_date, &mut filters.owner);
            });
            show_card_screen(&controller, &view, as_json).await
        }
        Commands::Search {
            criteria,
            page,
            per_page,
            search,
        } => {
            let controller = DashboardController::<AdvanceSearch, _>::new(client, user);
            run_search(&controller, criteria.into(), page, per_page, search.as_deref(), as_json)
                .await
        }
        Commands::Owners => list_owners(&client, as_json).await,
        Commands::Export {
            report,
            range,
            card,
            output,
        } => {
            let dir = output.unwrap_or_else(|| config.export.output_dir.clone());
            run_export(client, user, report, &range, card.map(CountKey::new), &dir).await
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            describe_user(&user);
            Ok(())
        }
    }
}

impl RangeArgs {
    fn apply(&self, from: &mut String, to: &mut String, owner: &mut String) {
        set_if_some(from, self.from.clone());
        set_if_some(to, self.to.clone());
        set_if_some(owner, self.owner.clone());
    }
}

fn set_if_some(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn describe_user(user: &CurrentUser) {
    if user.is_privileged() {
        eprintln!("Signed in as {} (all owners visible)", user.id());
    } else {
        eprintln!("Signed in as {} (own profiles only)", user.id());
    }
}

/// Turn a fetch outcome into the process result
fn finish(outcome: FetchOutcome) -> DashboardResult<()> {
    match outcome {
        FetchOutcome::Committed { rows } => {
            info!(rows, "fetch committed");
            Ok(())
        }
        FetchOutcome::Superseded => {
            warn!("fetch was superseded");
            Ok(())
        }
        FetchOutcome::Failed(err) => Err(err),
    }
}

/// Click the requested card (which fetches) or apply the filters as they are
async fn show_card_screen<S>(
    controller: &DashboardController<S, ApiClient>,
    view: &ViewArgs,
    as_json: bool,
) -> DashboardResult<()>
where
    S: Screen,
    S::Filters: CardFilters,
{
    let outcome = match &view.card {
        Some(card) => controller.click_card(&CountKey::new(card.as_str())).await,
        None => controller.apply_filters().await,
    };
    finish(outcome)?;

    if let Some(text) = &view.search {
        let shown = controller.set_search_query(text);
        info!(shown, query = %text, "text filter applied");
    }
    print_view(controller, as_json)
}

fn print_view<S: Screen>(
    controller: &DashboardController<S, ApiClient>,
    as_json: bool,
) -> DashboardResult<()> {
    let notice = controller.notice();
    output::print_screen(
        &controller.cards(),
        &controller.table_view(),
        notice.as_deref(),
        as_json,
    )?;
    Ok(())
}

/// Download a report, optionally narrowed to one card, into `dir`
async fn export<S>(
    controller: &DashboardController<S, ApiClient>,
    card: Option<&CountKey>,
    dir: &Path,
) -> DashboardResult<()>
where
    S: ExportableScreen,
    S::Filters: CardFilters,
{
    if let Some(card) = card {
        controller.set_filters(|filters| filters.count_filter_mut().toggle(card));
    }
    let file = controller.export().await?;
    if file.bytes.is_empty() {
        return Err(DashboardError::invalid_request(format!(
            "{} export returned an empty file",
            S::NAME
        )));
    }
    let path = file.write_to(dir).await?;
    println!("{}", path.display());
    Ok(())
}

/// One page of the advance search
async fn run_search(
    controller: &DashboardController<AdvanceSearch, ApiClient>,
    criteria: SearchCriteria,
    page: usize,
    per_page: usize,
    search: Option<&str>,
    as_json: bool,
) -> DashboardResult<()> {
    controller.set_filters(|filters| {
        filters.criteria = criteria;
        filters.page = page.saturating_sub(1);
        filters.per_page = per_page.max(1);
    });
    finish(controller.apply_filters().await)?;
    if let Some(text) = search {
        controller.set_search_query(text);
    }
    if !as_json {
        println!(
            "Page {} of {}",
            controller.current_page() + 1,
            controller.page_count()
        );
    }
    print_view(controller, as_json)
}

async fn list_owners(client: &ApiClient, as_json: bool) -> DashboardResult<()> {
    let owners = client.profile_owners().await?;
    if as_json {
        let list: Vec<_> = owners
            .iter()
            .map(|o| serde_json::json!({"id": o.id, "username": o.username}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        for owner in &owners {
            println!("{:>6}  {}", owner.id, owner.username);
        }
    }
    Ok(())
}

async fn run_export(
    client: Arc<ApiClient>,
    user: CurrentUser,
    report: Report,
    range: &RangeArgs,
    card: Option<CountKey>,
    dir: &Path,
) -> DashboardResult<()> {
    match report {
        Report::DailyWork => {
            let controller = DashboardController::<DailyWork, _>::new(client, user);
            controller.set_filters(|filters| set_if_some(&mut filters.staff, range.owner.clone()));
            export(&controller, card.as_ref(), dir).await
        }
        Report::Marriage => {
            let controller = DashboardController::<Marriage, _>::new(client, user);
            controller.set_filters(|filters| {
                range.apply(&mut filters.from_date, &mut filters.to_date, &mut filters.owner);
            });
            export(&controller, card.as_ref(), dir).await
        }
        Report::Delete => {
            let controller = DashboardController::<Delete, _>::new(client, user);
            controller.set_filters(|filters| {
                range.apply(&mut filters.from_date, &mut filters.to_date, &mut filters.owner);
            });
            export(&controller, card.as_ref(), dir).await
        }
    }
}
