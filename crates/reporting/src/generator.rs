//! Synthetic dashboard data. Every call draws a fresh batch from uniform
//! distributions; seed the random source to get a reproducible fixture.

use campaign_core::types::{
    round1, CampaignCounters, CampaignRow, CampaignStatus, DashboardData, Insights,
    MetricSnapshot, SeriesPoint, WEEK_LABELS,
};
use chrono::{Datelike, Days, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

pub const CAMPAIGN_NAMES: [&str; 10] = [
    "Black Friday Sale",
    "Spring Collection",
    "Brand Awareness Q4",
    "Retargeting Campaign",
    "Product Launch",
    "Holiday Special",
    "Newsletter Signup",
    "Video Ad Campaign",
    "Search Campaign",
    "Display Network",
];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const TRAFFIC_SOURCES: [(&str, f64); 6] = [
    ("Organic Search", 45.2),
    ("Direct", 22.8),
    ("Social Media", 15.6),
    ("Email", 8.9),
    ("Paid Ads", 5.2),
    ("Referral", 2.3),
];

const DEVICES: [&str; 3] = ["Desktop", "Mobile", "Tablet"];

/// Anything that can produce a fresh dashboard batch.
pub trait DashboardSource: Send + 'static {
    fn next_batch(&mut self) -> DashboardData;
}

pub struct DataGenerator<R: Rng = StdRng> {
    rng: R,
    anchor: Option<NaiveDate>,
}

impl DataGenerator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> DataGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng, anchor: None }
    }

    /// Pins "today"; otherwise the current UTC date is used per batch.
    pub fn with_anchor(mut self, today: NaiveDate) -> Self {
        self.anchor = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.anchor.unwrap_or_else(|| Utc::now().date_naive())
    }

    pub fn generate_metrics(&mut self) -> MetricSnapshot {
        MetricSnapshot {
            revenue: self.rng.gen_range(150_000..200_000),
            users: self.rng.gen_range(25_000..30_000),
            conversions: self.rng.gen_range(2_500..3_000),
            growth_rate: self.rng.gen_range(5.0..25.0),
        }
    }

    /// One point per month of the anchor year, dated the first of the month.
    pub fn generate_revenue_series(&mut self, today: NaiveDate) -> Vec<SeriesPoint> {
        MONTHS
            .iter()
            .enumerate()
            .map(|(index, month)| {
                let date = NaiveDate::from_ymd_opt(today.year(), index as u32 + 1, 1);
                let mut point = SeriesPoint::new(
                    *month,
                    self.rng.gen_range(100_000..150_000) as f64,
                    date,
                );
                point.revenue = Some(self.rng.gen_range(100_000..150_000));
                point.users = Some(self.rng.gen_range(15_000..18_000));
                point.conversions = Some(self.rng.gen_range(1_200..1_500));
                point
            })
            .collect()
    }

    /// Weekly active users for the current month.
    pub fn generate_user_series(&mut self, today: NaiveDate) -> Vec<SeriesPoint> {
        let start = month_start(today);
        WEEK_LABELS
            .iter()
            .enumerate()
            .map(|(index, week)| {
                let date = start.checked_add_days(Days::new(index as u64 * 7));
                let mut point =
                    SeriesPoint::new(*week, self.rng.gen_range(15_000..20_000) as f64, date);
                point.users = Some(self.rng.gen_range(15_000..20_000));
                point
            })
            .collect()
    }

    /// Share of sessions per traffic source, in percent.
    pub fn generate_traffic_sources(&self, today: NaiveDate) -> Vec<SeriesPoint> {
        let start = month_start(today);
        TRAFFIC_SOURCES
            .iter()
            .enumerate()
            .map(|(index, (name, share))| {
                SeriesPoint::new(*name, *share, start.checked_add_days(Days::new(index as u64)))
            })
            .collect()
    }

    pub fn generate_device_conversions(&mut self, today: NaiveDate) -> Vec<SeriesPoint> {
        let start = month_start(today);
        DEVICES
            .iter()
            .enumerate()
            .map(|(index, device)| {
                SeriesPoint::new(
                    *device,
                    self.rng.gen_range(500..1_500) as f64,
                    start.checked_add_days(Days::new(index as u64)),
                )
            })
            .collect()
    }

    /// The ten campaigns of the performance table. Ids are unique within
    /// the batch only.
    pub fn generate_campaigns(&mut self, today: NaiveDate) -> Vec<CampaignRow> {
        CAMPAIGN_NAMES
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let impressions: u64 = self.rng.gen_range(50_000..150_000);
                let clicks = (impressions as f64 * self.rng.gen_range(0.01..0.06)) as u64;
                let conversions = (clicks as f64 * self.rng.gen_range(0.02..0.12)) as u64;
                let cost: u64 = self.rng.gen_range(1_000..6_000);
                let revenue = (conversions as f64 * self.rng.gen_range(50.0..150.0)) as u64;
                let status = CampaignStatus::ALL[self.rng.gen_range(0..CampaignStatus::ALL.len())];
                let days_ago = self.rng.gen_range(0..365);
                let date = today.checked_sub_days(Days::new(days_ago)).unwrap_or(today);
                let week = WEEK_LABELS[self.rng.gen_range(0..WEEK_LABELS.len())];

                CampaignRow::new(
                    format!("campaign-{}", index + 1),
                    *name,
                    CampaignCounters {
                        impressions,
                        clicks,
                        conversions,
                        cost,
                        revenue,
                    },
                    status,
                    date,
                    week,
                )
            })
            .collect()
    }

    pub fn generate_insights(&mut self) -> Insights {
        Insights {
            revenue_change: round1(self.rng.gen_range(-5.0..15.0)),
            users_change: round1(self.rng.gen_range(-3.0..12.0)),
            conversions_change: round1(self.rng.gen_range(-5.0..20.0)),
        }
    }

    pub fn generate_batch(&mut self) -> DashboardData {
        let today = self.today();
        let data = DashboardData {
            metrics: self.generate_metrics(),
            revenue_series: self.generate_revenue_series(today),
            user_series: self.generate_user_series(today),
            traffic_sources: self.generate_traffic_sources(today),
            device_conversions: self.generate_device_conversions(today),
            campaigns: self.generate_campaigns(today),
            insights: self.generate_insights(),
        };
        debug!(%today, campaigns = data.campaigns.len(), "Generated dashboard batch");
        data
    }
}

impl<R: Rng + Send + 'static> DashboardSource for DataGenerator<R> {
    fn next_batch(&mut self) -> DashboardData {
        self.generate_batch()
    }
}

fn month_start(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}
