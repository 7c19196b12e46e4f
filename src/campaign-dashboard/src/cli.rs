use campaign_core::types::DateInterval;
use campaign_reporting::{QueryState, SortDirection, SortField, StatusFilter};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "campaign-dashboard")]
#[command(about = "Campaign analytics dashboard over synthetic marketing data")]
#[command(version)]
pub struct Cli {
    /// Generator seed (overrides config)
    #[arg(long, global = true, env = "CAMPAIGN_DASHBOARD__DASHBOARD__SEED")]
    pub seed: Option<u64>,

    /// Rows per table page (overrides config)
    #[arg(long, global = true, env = "CAMPAIGN_DASHBOARD__DASHBOARD__PAGE_SIZE")]
    pub page_size: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print metrics, insights, charts and one table page as JSON
    Snapshot {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Write the filtered and sorted table to a file
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output path (defaults to the configured file name)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// csv or json
        #[arg(long, default_value = "csv")]
        format: String,
    },
    /// Keep refreshing on the configured interval until Ctrl-C
    Watch {
        #[command(flatten)]
        filters: FilterArgs,
        /// Stop after this many applied snapshots
        #[arg(long)]
        ticks: Option<u64>,
        /// Refresh interval in seconds (overrides config)
        #[arg(long, env = "CAMPAIGN_DASHBOARD__DASHBOARD__REFRESH_INTERVAL_SECS")]
        interval_secs: Option<u64>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Start of the date range (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// End of the date range (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Case-insensitive campaign name search
    #[arg(long, default_value = "")]
    pub search: String,
    /// all, active, paused or ended
    #[arg(long, default_value = "all")]
    pub status: String,
    /// Column to sort by
    #[arg(long, default_value = "revenue")]
    pub sort: String,
    /// asc or desc
    #[arg(long, default_value = "desc")]
    pub direction: String,
    /// Only rows of this week label, e.g. "Week 2"
    #[arg(long)]
    pub week: Option<String>,
    /// 1-based table page
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

impl FilterArgs {
    pub fn date_range(&self) -> DateInterval {
        DateInterval {
            from: self.from,
            to: self.to,
        }
    }

    /// Unknown status or sort values are accepted and disable that stage.
    pub fn query_state(&self) -> QueryState {
        let status_filter = StatusFilter::parse(&self.status);
        if status_filter == StatusFilter::All && !self.status.trim().eq_ignore_ascii_case("all") {
            warn!(status = %self.status, "Unknown status, showing all campaigns");
        }
        let sort_field = SortField::parse(&self.sort);
        if sort_field.is_none() {
            warn!(sort = %self.sort, "Unknown sort column, keeping generated order");
        }

        QueryState {
            search_term: self.search.clone(),
            status_filter,
            sort_field,
            sort_direction: SortDirection::parse(&self.direction),
            selected_week: self.week.clone(),
            current_page: self.page.max(1),
        }
    }
}
