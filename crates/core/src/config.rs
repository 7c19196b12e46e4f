use crate::error::{DashboardError, DashboardResult};
use serde::Deserialize;
use std::time::Duration;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_DASHBOARD__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_initial_load_delay_ms")]
    pub initial_load_delay_ms: u64,
    #[serde(default = "default_refresh_delay_ms")]
    pub refresh_delay_ms: u64,
    /// Fixed generator seed; unset means a fresh entropy seed per run.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_file_name")]
    pub file_name: String,
}

// Default functions
fn default_page_size() -> usize {
    10
}
fn default_refresh_interval_secs() -> u64 {
    30
}
fn default_initial_load_delay_ms() -> u64 {
    1500
}
fn default_refresh_delay_ms() -> u64 {
    800
}
fn default_export_file_name() -> String {
    "campaigns-export.csv".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            refresh_interval_secs: default_refresh_interval_secs(),
            initial_load_delay_ms: default_initial_load_delay_ms(),
            refresh_delay_ms: default_refresh_delay_ms(),
            seed: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_export_file_name(),
        }
    }
}

impl DashboardConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn initial_load_delay(&self) -> Duration {
        Duration::from_millis(self.initial_load_delay_ms)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }
}

impl AppConfig {
    /// Load configuration from environment variables, rejecting out-of-range
    /// values.
    pub fn load() -> DashboardResult<Self> {
        let mut loaded = Self::from_env()?;
        loaded.validate()?;
        if loaded.export.file_name.trim().is_empty() {
            loaded.export.file_name = default_export_file_name();
        }
        Ok(loaded)
    }

    /// Read environment variables without range checks.
    pub fn from_env() -> DashboardResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CAMPAIGN_DASHBOARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn validate(&self) -> DashboardResult<()> {
        if self.dashboard.page_size == 0 {
            return Err(DashboardError::Config(
                "dashboard.page_size must be at least 1".to_string(),
            ));
        }
        if self.dashboard.refresh_interval_secs == 0 {
            return Err(DashboardError::Config(
                "dashboard.refresh_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resets each out-of-range value to its default and returns the keys
    /// that were reset. Other values are kept.
    pub fn reset_invalid(&mut self) -> Vec<&'static str> {
        let mut reset = Vec::new();
        if self.dashboard.page_size == 0 {
            self.dashboard.page_size = default_page_size();
            reset.push("dashboard.page_size");
        }
        if self.dashboard.refresh_interval_secs == 0 {
            self.dashboard.refresh_interval_secs = default_refresh_interval_secs();
            reset.push("dashboard.refresh_interval_secs");
        }
        if self.export.file_name.trim().is_empty() {
            self.export.file_name = default_export_file_name();
            reset.push("export.file_name");
        }
        reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.dashboard.page_size, 10);
        assert_eq!(config.dashboard.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.dashboard.initial_load_delay(), Duration::from_millis(1500));
        assert_eq!(config.dashboard.refresh_delay(), Duration::from_millis(800));
        assert!(config.dashboard.seed.is_none());
        assert_eq!(config.export.file_name, "campaigns-export.csv");
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"dashboard": {"page_size": 25}}"#).unwrap();
        assert_eq!(config.dashboard.page_size, 25);
        assert_eq!(config.dashboard.refresh_interval_secs, 30);
        assert_eq!(config.export.file_name, "campaigns-export.csv");
    }

    #[test]
    fn test_zero_refresh_interval_rejected() {
        let mut config = AppConfig::default();
        config.dashboard.refresh_interval_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
        assert!(err.to_string().contains("refresh_interval_secs"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = AppConfig::default();
        config.dashboard.page_size = 0;
        assert!(matches!(config.validate(), Err(DashboardError::Config(_))));
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_reset_invalid_keeps_valid_overrides() {
        let mut config: AppConfig = serde_json::from_str(
            r#"{"dashboard": {"page_size": 0, "refresh_interval_secs": 0, "seed": 42},
                "export": {"file_name": "  "}}"#,
        )
        .unwrap();
        let reset = config.reset_invalid();
        assert_eq!(
            reset,
            vec![
                "dashboard.page_size",
                "dashboard.refresh_interval_secs",
                "export.file_name"
            ]
        );
        assert_eq!(config.dashboard.page_size, 10);
        assert_eq!(config.dashboard.refresh_interval_secs, 30);
        assert_eq!(config.dashboard.seed, Some(42));
        assert_eq!(config.export.file_name, "campaigns-export.csv");
        assert!(config.validate().is_ok());
    }
}
