//! Campaign performance dashboard — the stateful side of the pipeline.
//!
//! `DashboardView` holds the latest snapshot together with the date range and
//! table state the user has picked, and reruns the pure filters on demand.

use crate::date_filter::filter_by_date_range;
use crate::export::{export, ExportFormat};
use crate::query::{
    filter_and_sort, query_table_with_page_size, total_pages, QueryState, SortField,
    StatusFilter, TablePage,
};
use campaign_core::config::DashboardConfig;
use campaign_core::error::DashboardResult;
use campaign_core::types::{
    CampaignRow, DashboardData, DashboardSnapshot, DateInterval, Insights, MetricSnapshot,
    SeriesPoint,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

/// Chart series narrowed to the selected date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub revenue: Vec<SeriesPoint>,
    pub users: Vec<SeriesPoint>,
    pub traffic_sources: Vec<SeriesPoint>,
    pub device_conversions: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverview {
    pub token: u64,
    pub refreshed_at: DateTime<Utc>,
    pub date_range: DateInterval,
    pub metrics: MetricSnapshot,
    pub insights: Insights,
    pub charts: ChartSeries,
    pub table: TablePage,
}

pub struct DashboardView {
    snapshot: Option<Arc<DashboardSnapshot>>,
    date_range: DateInterval,
    query: QueryState,
    page_size: usize,
}

impl DashboardView {
    pub fn new(page_size: usize) -> Self {
        Self {
            snapshot: None,
            date_range: DateInterval::default(),
            query: QueryState::default(),
            page_size: page_size.max(1),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.page_size)
    }

    // ─── Snapshots ─────────────────────────────────────────────────────────

    /// Replaces the current batch. Snapshots older than the one shown are
    /// ignored. Returns whether the snapshot was taken.
    pub fn apply_snapshot(&mut self, snapshot: Arc<DashboardSnapshot>) -> bool {
        if let Some(current) = &self.snapshot {
            if snapshot.token < current.token {
                debug!(
                    token = snapshot.token,
                    current = current.token,
                    "Ignored older dashboard snapshot"
                );
                return false;
            }
        }
        self.snapshot = Some(snapshot);
        self.reclamp();
        true
    }

    /// Loads a batch directly, outside the refresh loop.
    pub fn load(&mut self, data: DashboardData) {
        let token = self.snapshot.as_ref().map_or(1, |s| s.token + 1);
        self.apply_snapshot(Arc::new(DashboardSnapshot {
            token,
            data,
            refreshed_at: Utc::now(),
        }));
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot.is_none()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.snapshot.as_ref().map(|s| s.refreshed_at)
    }

    pub fn metrics(&self) -> Option<&MetricSnapshot> {
        self.snapshot.as_ref().map(|s| &s.data.metrics)
    }

    pub fn insights(&self) -> Option<&Insights> {
        self.snapshot.as_ref().map(|s| &s.data.insights)
    }

    // ─── User interactions ─────────────────────────────────────────────────

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn date_range(&self) -> DateInterval {
        self.date_range
    }

    pub fn set_date_range(&mut self, interval: DateInterval) {
        self.date_range = interval;
        self.reclamp();
    }

    pub fn set_query(&mut self, query: QueryState) {
        self.query = query;
        self.reclamp();
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.query.search_term = term.into();
        self.reclamp();
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.query.status_filter = filter;
        self.reclamp();
    }

    pub fn toggle_sort(&mut self, field: SortField) {
        self.query.toggle_sort(field);
    }

    /// Chart click on a week; clicking the selected week clears the filter.
    pub fn select_week(&mut self, week: &str) {
        self.query.select_week(week);
        self.reclamp();
    }

    pub fn clear_week(&mut self) {
        self.query.clear_week();
        self.reclamp();
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.query.current_page = page;
        self.reclamp();
    }

    pub fn next_page(&mut self) {
        let pages = self.total_pages();
        self.query.next_page(pages);
    }

    pub fn previous_page(&mut self) {
        self.query.previous_page();
    }

    // ─── Derived views ─────────────────────────────────────────────────────

    fn interval(&self) -> Option<&DateInterval> {
        Some(&self.date_range)
    }

    pub fn campaigns_in_range(&self) -> Cow<'_, [CampaignRow]> {
        match &self.snapshot {
            Some(s) => filter_by_date_range(&s.data.campaigns, self.interval()),
            None => Cow::Owned(Vec::new()),
        }
    }

    /// Rows behind the table, filtered and sorted but not paginated.
    pub fn filtered_rows(&self) -> Vec<CampaignRow> {
        filter_and_sort(&self.campaigns_in_range(), &self.query)
    }

    pub fn table(&self) -> TablePage {
        query_table_with_page_size(&self.campaigns_in_range(), &self.query, self.page_size)
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered_rows().len(), self.page_size)
    }

    pub fn charts(&self) -> ChartSeries {
        let Some(s) = &self.snapshot else {
            return ChartSeries {
                revenue: Vec::new(),
                users: Vec::new(),
                traffic_sources: Vec::new(),
                device_conversions: Vec::new(),
            };
        };
        let interval = self.interval();
        ChartSeries {
            revenue: filter_by_date_range(&s.data.revenue_series, interval).into_owned(),
            users: filter_by_date_range(&s.data.user_series, interval).into_owned(),
            traffic_sources: filter_by_date_range(&s.data.traffic_sources, interval).into_owned(),
            device_conversions: filter_by_date_range(&s.data.device_conversions, interval)
                .into_owned(),
        }
    }

    /// Exports the current filtered and sorted rows; `Ok(None)` when empty.
    pub fn export(&self, format: ExportFormat) -> DashboardResult<Option<String>> {
        export(&self.filtered_rows(), format)
    }

    pub fn overview(&self) -> Option<DashboardOverview> {
        let s = self.snapshot.as_ref()?;
        Some(DashboardOverview {
            token: s.token,
            refreshed_at: s.refreshed_at,
            date_range: self.date_range,
            metrics: s.data.metrics.clone(),
            insights: s.data.insights.clone(),
            charts: self.charts(),
            table: self.table(),
        })
    }

    /// Pages requested before the first batch arrives are kept until there
    /// are rows to clamp against.
    fn reclamp(&mut self) {
        if self.snapshot.is_none() {
            return;
        }
        let filtered = self.filtered_rows().len();
        self.query.clamp_page(filtered, self.page_size);
    }
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}
