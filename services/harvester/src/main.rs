//! Street-level imagery harvester.
//!
//! Reads regions from a YAML file and downloads imagery along each one.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use harvester::config::HarvestConfig;
use harvester::harvest::{self, Harvester};
use harvester::StreetViewClient;
use streetview_common::Region;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(about = "Download street-level imagery along configured regions")]
struct Args {
    /// Regions configuration file
    #[arg(short, long, env = "CONFIG_PATH", default_value = "config/regions.yaml")]
    config: PathBuf,

    /// Override the output root from the config file
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Only process this region (name or folder name, disabled regions included)
    #[arg(short, long)]
    region: Option<String>,

    /// Imagery API key
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Log the planned grids and exit without downloading
    #[arg(long)]
    dry_run: bool,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let builder = fmt().with_env_filter(filter).with_target(false);
    match args.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// A missing or blank key is fatal before any region is touched.
fn resolve_api_key(api_key: Option<String>) -> Result<String> {
    api_key
        .filter(|k| !k.trim().is_empty())
        .context("API key not found. Set API_KEY in the environment or a .env file")
}

/// Load the config file and pick the regions to process.
fn load_config(args: &Args) -> Result<(HarvestConfig, Vec<Region>)> {
    let mut config = HarvestConfig::load(&args.config)?;
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    let regions = config.select_regions(args.region.as_deref())?;
    Ok((config, regions))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    if args.dry_run {
        let (config, regions) = load_config(&args)?;
        info!(regions = regions.len(), "Dry run, no requests will be made");
        harvest::log_plans(&regions, &config.sampling, &config.output_dir);
        return Ok(());
    }

    let api_key = resolve_api_key(args.api_key.clone())?;

    let (config, regions) = load_config(&args)?;

    let client = StreetViewClient::new(&config.imagery, api_key)?;
    let mut harvester = Harvester::new(
        client,
        config.output_dir.clone(),
        config.sampling.clone(),
        &config.pacing,
    );

    info!(
        regions = regions.len(),
        output_dir = %config.output_dir.display(),
        "Starting imagery harvest"
    );

    let reports = harvester.run(&regions).await;

    let downloaded: usize = reports.iter().map(|r| r.downloaded).sum();
    let unavailable: usize = reports.iter().map(|r| r.unavailable).sum();
    let failed: usize = reports.iter().map(|r| r.failed).sum();
    info!(
        regions = reports.len(),
        downloaded,
        unavailable,
        failed,
        "All regions processed"
    );

    Ok(())
}
