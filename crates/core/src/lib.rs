//! Shared domain types, configuration and error type for the campaign
//! dashboard.

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{DashboardError, DashboardResult};
