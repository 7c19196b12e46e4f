use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Week labels used by the weekly activity chart and the campaign table.
pub const WEEK_LABELS: [&str; 4] = ["Week 1", "Week 2", "Week 3", "Week 4"];

/// Rounds to two decimal places, the precision of ctr and roas.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to one decimal place, the precision of insight changes.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ─── Metrics ────────────────────────────────────────────────────────────────

/// Headline figures shown on the metric cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub revenue: u64,
    pub users: u64,
    pub conversions: u64,
    pub growth_rate: f64,
}

/// A single chart point. `date` drives the date-range filter; the optional
/// numeric fields carry the extra series of the monthly chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub name: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversions: Option<u64>,
}

impl SeriesPoint {
    pub fn new(name: impl Into<String>, value: f64, date: Option<NaiveDate>) -> Self {
        Self {
            name: name.into(),
            value,
            date: date.map(|d| d.format("%Y-%m-%d").to_string()),
            revenue: None,
            users: None,
            conversions: None,
        }
    }
}

// ─── Campaign table ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Paused,
    Ended,
}

impl CampaignStatus {
    pub const ALL: [CampaignStatus; 3] = [
        CampaignStatus::Active,
        CampaignStatus::Paused,
        CampaignStatus::Ended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(CampaignStatus::Active),
            "paused" => Ok(CampaignStatus::Paused),
            "ended" => Ok(CampaignStatus::Ended),
            other => Err(format!("unknown campaign status '{other}'")),
        }
    }
}

/// One row of the campaign performance table.
///
/// Field order is the column order of the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRow {
    pub id: String,
    pub campaign: String,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    /// clicks / impressions × 100, two decimals.
    pub ctr: f64,
    pub cost: u64,
    pub revenue: u64,
    /// revenue / cost, two decimals.
    pub roas: f64,
    pub status: CampaignStatus,
    pub date: String,
    pub week: String,
}

/// Raw counters for a campaign; `CampaignRow::new` derives ctr and roas.
#[derive(Debug, Clone)]
pub struct CampaignCounters {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub cost: u64,
    pub revenue: u64,
}

impl CampaignRow {
    pub fn new(
        id: impl Into<String>,
        campaign: impl Into<String>,
        counters: CampaignCounters,
        status: CampaignStatus,
        date: NaiveDate,
        week: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            campaign: campaign.into(),
            impressions: counters.impressions,
            clicks: counters.clicks,
            conversions: counters.conversions,
            ctr: click_through_rate(counters.clicks, counters.impressions),
            cost: counters.cost,
            revenue: counters.revenue,
            roas: return_on_ad_spend(counters.revenue, counters.cost),
            status,
            date: date.format("%Y-%m-%d").to_string(),
            week: week.into(),
        }
    }
}

/// CTR as a percentage rounded to two decimals; 0 when there were no impressions.
pub fn click_through_rate(clicks: u64, impressions: u64) -> f64 {
    if impressions == 0 {
        return 0.0;
    }
    round2(clicks as f64 / impressions as f64 * 100.0)
}

/// ROAS rounded to two decimals; 0 when nothing was spent.
pub fn return_on_ad_spend(revenue: u64, cost: u64) -> f64 {
    if cost == 0 {
        return 0.0;
    }
    round2(revenue as f64 / cost as f64)
}

// ─── Date interval ──────────────────────────────────────────────────────────

/// Inclusive date interval picked in the date-range control. Filtering is
/// active only when both ends are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateInterval {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Both bounds, or `None` when the interval does not filter.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.bounds().is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.bounds()
            .is_some_and(|(from, to)| from <= date && date <= to)
    }
}

// ─── Insights ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Steady,
}

impl Trend {
    pub fn of(change: f64) -> Self {
        if change > 0.0 {
            Trend::Up
        } else if change < 0.0 {
            Trend::Down
        } else {
            Trend::Steady
        }
    }
}

/// Period-over-period changes, in percent, behind the insights panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub revenue_change: f64,
    pub users_change: f64,
    pub conversions_change: f64,
}

impl Insights {
    /// `↑12.5%`, `↓3.0%` or `steady`.
    pub fn describe(change: f64) -> String {
        match Trend::of(change) {
            Trend::Up => format!("↑{change:.1}%"),
            Trend::Down => format!("↓{:.1}%", change.abs()),
            Trend::Steady => "steady".to_string(),
        }
    }

    pub fn lines(&self) -> Vec<(&'static str, Trend, String)> {
        [
            ("Revenue", self.revenue_change),
            ("Users", self.users_change),
            ("Conversions", self.conversions_change),
        ]
        .into_iter()
        .map(|(label, change)| (label, Trend::of(change), Self::describe(change)))
        .collect()
    }
}

impl Default for Insights {
    fn default() -> Self {
        Self {
            revenue_change: 12.5,
            users_change: 8.2,
            conversions_change: 15.3,
        }
    }
}

// ─── Batches ────────────────────────────────────────────────────────────────

/// Everything one generation cycle produces. Replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub metrics: MetricSnapshot,
    pub revenue_series: Vec<SeriesPoint>,
    pub user_series: Vec<SeriesPoint>,
    pub traffic_sources: Vec<SeriesPoint>,
    pub device_conversions: Vec<SeriesPoint>,
    pub campaigns: Vec<CampaignRow>,
    pub insights: Insights,
}

/// A batch as published by the refresh loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub token: u64,
    pub data: DashboardData,
    pub refreshed_at: DateTime<Utc>,
}
