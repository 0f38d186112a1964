//! Portfolio three-factor exposure CLI.
//!
//! Usage:
//! - `exposure sync --sheet positions.csv` canonicalizes a spreadsheet export
//! - `exposure holdings` values positions at the latest prices
//! - `exposure regress` runs the Fama-French three-factor regression
//! - `exposure run` does holdings then regress

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use exposure::{
    data::{
        ExposureConfig, YahooPriceSource, canonicalize_positions, holdings_frame, load_factor_file,
        read_positions, read_sheet_export, read_weights, top_holdings, validate_positions,
        write_holdings, write_position_snapshots,
    },
    model::{ExposurePipeline, RegressionReport, WeightNormalizer, history_window},
    primitives::Date,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Rows shown in the holdings summary.
const TOP_HOLDINGS: usize = 10;

#[derive(Debug, Parser)]
#[command(name = "exposure", version, about = "Portfolio Fama-French three-factor exposure")]
struct Cli {
    /// TOML configuration file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "config/exposure.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Canonicalize a spreadsheet export and write position snapshots.
    Sync {
        /// CSV export of the positions sheet.
        #[arg(long)]
        sheet: PathBuf,
    },
    /// Value positions at the latest prices and write the weight table.
    Holdings,
    /// Regress the weighted portfolio on the three factors.
    Regress,
    /// Holdings followed by regress.
    Run,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ExposureConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    let today = Local::now().date_naive();

    match cli.command {
        Command::Sync { sheet } => sync(&config, &sheet, today),
        Command::Holdings => {
            let source = YahooPriceSource::new()?;
            holdings(&config, &source, today)
        }
        Command::Regress => {
            let source = YahooPriceSource::new()?;
            regress(&config, &source, today)
        }
        Command::Run => {
            let source = YahooPriceSource::new()?;
            holdings(&config, &source, today)?;
            regress(&config, &source, today)
        }
    }
}

fn sync(config: &ExposureConfig, sheet: &Path, today: Date) -> Result<()> {
    let mapping = config.column_mapping()?;
    let rows = read_sheet_export(sheet)
        .with_context(|| format!("reading sheet export {}", sheet.display()))?;
    let as_of = config.options.include_as_of.then_some(today);

    let positions = validate_positions(canonicalize_positions(&rows, &mapping, as_of)?)?;
    let raw = write_position_snapshots(
        &positions,
        &config.paths.positions,
        &config.paths.raw_positions_dir,
        today,
    )?;

    println!("Wrote raw snapshot: {}", raw.display());
    println!("Wrote processed latest: {}", config.paths.positions.display());
    Ok(())
}

fn holdings(config: &ExposureConfig, source: &YahooPriceSource, today: Date) -> Result<()> {
    let positions = read_positions(&config.paths.positions)
        .with_context(|| format!("reading positions {}", config.paths.positions.display()))?;
    info!(positions = positions.len(), "loaded positions");

    let pipeline = ExposurePipeline::new(source)
        .with_normalizer(WeightNormalizer::with_tolerance(config.options.weight_tolerance));
    let normalized = pipeline.holdings(&positions, today)?;
    write_holdings(&config.paths.holdings, &normalized.holdings)?;

    let frame = holdings_frame(&normalized.holdings)?;
    println!("{}", top_holdings(&frame, TOP_HOLDINGS)?);
    println!("Total value: {:.2}", normalized.total_value());
    Ok(())
}

fn regress(config: &ExposureConfig, source: &YahooPriceSource, today: Date) -> Result<()> {
    let weights = read_weights(&config.paths.holdings, config.options.weight_tolerance)
        .with_context(|| format!("reading holdings {}", config.paths.holdings.display()))?;
    let factors = load_factor_file(&config.paths.factor_file)?;

    let (start, end) = history_window(today, config.options.history_years);
    let result = ExposurePipeline::new(source).regress(&weights, &factors, start, end)?;
    RegressionReport::new(&result).print_summary();
    Ok(())
}
