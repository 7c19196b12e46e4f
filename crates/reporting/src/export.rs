//! Export of the filtered and sorted campaign table.

use campaign_core::error::{DashboardError, DashboardResult};
use campaign_core::types::CampaignRow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(DashboardError::InvalidArgument(format!(
                "unsupported export format '{other}'"
            ))),
        }
    }
}

/// Writes `rows` as CSV with a header row in field order. Fields holding
/// commas, quotes or line breaks are quoted.
///
/// Returns `Ok(None)` when there is nothing to export.
pub fn export_csv(rows: &[CampaignRow]) -> DashboardResult<Option<String>> {
    if rows.is_empty() {
        debug!("Nothing to export");
        return Ok(None);
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::with_capacity(rows.len() * 128));
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| DashboardError::Export(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::Export(e.to_string()))?;
    let csv = String::from_utf8(bytes).map_err(|e| DashboardError::Export(e.to_string()))?;

    metrics::counter!("dashboard.export.rows").increment(rows.len() as u64);
    info!(rows = rows.len(), "Campaign table exported as CSV");
    Ok(Some(csv))
}

/// Same rows as a pretty-printed JSON array; `Ok(None)` when empty.
pub fn export_json(rows: &[CampaignRow]) -> DashboardResult<Option<String>> {
    if rows.is_empty() {
        debug!("Nothing to export");
        return Ok(None);
    }
    let json = serde_json::to_string_pretty(rows)?;
    metrics::counter!("dashboard.export.rows").increment(rows.len() as u64);
    info!(rows = rows.len(), "Campaign table exported as JSON");
    Ok(Some(json))
}

pub fn export(rows: &[CampaignRow], format: ExportFormat) -> DashboardResult<Option<String>> {
    match format {
        ExportFormat::Csv => export_csv(rows),
        ExportFormat::Json => export_json(rows),
    }
}
