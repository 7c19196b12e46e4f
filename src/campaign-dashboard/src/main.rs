//! Campaign Dashboard, the command-line front end for the campaign analytics
//! pipeline.
//!
//! Generates a synthetic batch, applies the date range and table filters, and
//! prints, exports or keeps refreshing the result.

mod cli;

use anyhow::Context;
use campaign_core::config::AppConfig;
use campaign_core::error::DashboardResult;
use campaign_reporting::{
    DashboardOverview, DashboardView, DataGenerator, ExportFormat, RefreshHandle, RefreshSettings,
};
use clap::Parser;
use cli::{Cli, Command, FilterArgs};
use std::path::PathBuf;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "campaign_dashboard=info,campaign_reporting=info".into()
            }),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    // Load configuration; out-of-range keys fall back one by one
    let mut config = AppConfig::from_env().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    for key in config.reset_invalid() {
        warn!(key, "Rejected configuration value, using default");
    }

    // Apply CLI overrides
    if let Some(seed) = cli.seed {
        config.dashboard.seed = Some(seed);
    }
    if let Some(page_size) = cli.page_size {
        config.dashboard.page_size = page_size.max(1);
    }

    info!(
        page_size = config.dashboard.page_size,
        refresh_interval_secs = config.dashboard.refresh_interval_secs,
        seed = ?config.dashboard.seed,
        "Configuration loaded"
    );

    match cli.command {
        Command::Snapshot { filters } => snapshot(&config, &filters),
        Command::Export {
            filters,
            output,
            format,
        } => export(&config, &filters, output, &format),
        Command::Watch {
            filters,
            ticks,
            interval_secs,
        } => {
            if let Some(secs) = interval_secs {
                config.dashboard.refresh_interval_secs = secs.max(1);
            }
            watch(&config, &filters, ticks).await
        }
    }
}

fn generator(config: &AppConfig) -> DataGenerator {
    match config.dashboard.seed {
        Some(seed) => DataGenerator::seeded(seed),
        None => DataGenerator::from_entropy(),
    }
}

fn filtered_view(config: &AppConfig, filters: &FilterArgs) -> DashboardView {
    let mut view = DashboardView::from_config(&config.dashboard);
    view.set_date_range(filters.date_range());
    view.set_query(filters.query_state());
    view
}

fn loaded_view(config: &AppConfig, filters: &FilterArgs, mut generator: DataGenerator) -> DashboardView {
    let mut view = filtered_view(config, filters);
    view.load(generator.generate_batch());
    view
}

fn snapshot_overview(
    config: &AppConfig,
    filters: &FilterArgs,
    generator: DataGenerator,
) -> anyhow::Result<DashboardOverview> {
    loaded_view(config, filters, generator)
        .overview()
        .context("dashboard has no data after loading a batch")
}

fn export_content(
    config: &AppConfig,
    filters: &FilterArgs,
    generator: DataGenerator,
    format: ExportFormat,
) -> DashboardResult<Option<String>> {
    loaded_view(config, filters, generator).export(format)
}

fn snapshot(config: &AppConfig, filters: &FilterArgs) -> anyhow::Result<()> {
    let overview = snapshot_overview(config, filters, generator(config))?;
    println!("{}", serde_json::to_string_pretty(&overview)?);
    Ok(())
}

fn export(
    config: &AppConfig,
    filters: &FilterArgs,
    output: Option<PathBuf>,
    format: &str,
) -> anyhow::Result<()> {
    let format: ExportFormat = format.parse()?;
    let path = output.unwrap_or_else(|| {
        PathBuf::from(&config.export.file_name).with_extension(format.extension())
    });

    match export_content(config, filters, generator(config), format)? {
        Some(content) => {
            std::fs::write(&path, content)
                .with_context(|| format!("failed to write export to {}", path.display()))?;
            info!(path = %path.display(), %format, "Export written");
        }
        None => info!("Nothing to export for the selected filters"),
    }
    Ok(())
}

async fn watch(config: &AppConfig, filters: &FilterArgs, ticks: Option<u64>) -> anyhow::Result<()> {
    let mut view = filtered_view(config, filters);
    let handle = RefreshHandle::spawn(generator(config), RefreshSettings::from(&config.dashboard));
    let mut updates = handle.subscribe();
    let mut applied: u64 = 0;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    warn!("Refresh loop ended unexpectedly");
                    break;
                }
                let latest = updates.borrow_and_update().clone();
                let Some(snapshot) = latest else { continue };
                if !view.apply_snapshot(snapshot) {
                    continue;
                }
                applied += 1;

                if let Some(overview) = view.overview() {
                    info!(
                        token = overview.token,
                        revenue = overview.metrics.revenue,
                        filtered = overview.table.total_filtered,
                        page = overview.table.current_page,
                        total_pages = overview.table.total_pages,
                        "Dashboard updated"
                    );
                    println!("{}", serde_json::to_string(&overview)?);
                }

                if ticks.is_some_and(|limit| applied >= limit) {
                    break;
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    handle.shutdown();
    info!(applied, "Campaign dashboard stopped");
    Ok(())
}
