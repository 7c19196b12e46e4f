//! Campaign dashboard reporting: date-range filtering, the campaign table
//! query pipeline, exports, synthetic data, and the refresh loop.

pub mod dashboard;
pub mod date_filter;
pub mod export;
pub mod generator;
pub mod query;
pub mod refresh;

pub use dashboard::{ChartSeries, DashboardOverview, DashboardView};
pub use date_filter::{filter_by_date_range, Dated};
pub use export::{export_csv, export_json, ExportFormat};
pub use generator::{DashboardSource, DataGenerator};
pub use query::{
    filter_and_sort, query_table, QueryState, SortDirection, SortField, StatusFilter, TablePage,
    DEFAULT_PAGE_SIZE,
};
pub use refresh::{RefreshHandle, RefreshSequencer, RefreshSettings, MIN_REFRESH_INTERVAL};
