use analytics::AnalysisEngine;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use configuration::{Config, LevelSettings, load_config};
use core_types::{FundamentalsSnapshot, PriceSeries};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// The main entry point for the Lodestar analysis tool.
fn main() -> Result<()> {
    // Load environment variables from .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Held until exit so buffered file logs are flushed.
    let _log_guard = init_logging(cli.log_dir.as_deref())?;

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, config),
        Commands::Levels(args) => handle_levels(args, config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Price-level and intrinsic-value analytics for a single ticker.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the TOML configuration file. A missing file means defaults.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Also write logs to a daily rolling file in this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis on a snapshot file and print the report as JSON.
    Analyze(AnalyzeArgs),
    /// Print the strike, airbag and knock-out prices for a given price.
    Levels(LevelsArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// The snapshot JSON: `{ "ticker": .., "bars": [..], "fundamentals": {..} }`.
    #[arg(long)]
    input: PathBuf,

    #[command(flatten)]
    levels: LevelOverrides,
}

#[derive(Parser)]
struct LevelsArgs {
    /// The current price.
    #[arg(long)]
    price: Decimal,

    #[command(flatten)]
    levels: LevelOverrides,
}

/// Percentages of the current price; 0 disables a level.
#[derive(Args, Debug, Default)]
struct LevelOverrides {
    #[arg(long)]
    strike_pct: Option<Decimal>,
    #[arg(long)]
    airbag_pct: Option<Decimal>,
    #[arg(long)]
    knockout_pct: Option<Decimal>,
}

impl LevelOverrides {
    fn apply(&self, settings: &mut LevelSettings) {
        if let Some(pct) = self.strike_pct {
            settings.strike_pct = pct;
        }
        if let Some(pct) = self.airbag_pct {
            settings.airbag_pct = pct;
        }
        if let Some(pct) = self.knockout_pct {
            settings.knockout_pct = pct;
        }
    }
}

/// The on-disk input of the `analyze` command.
#[derive(Debug, Deserialize)]
struct Snapshot {
    ticker: String,
    bars: PriceSeries,
    #[serde(default)]
    fundamentals: FundamentalsSnapshot,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the stderr subscriber (`RUST_LOG`, default `info`) and the optional file sink.
fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "lodestar.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;
    Ok(guard)
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_analyze(args: AnalyzeArgs, mut config: Config) -> Result<()> {
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read snapshot {}", args.input.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse snapshot {}", args.input.display()))?;
    tracing::info!(
        ticker = %snapshot.ticker,
        bars = snapshot.bars.len(),
        input = %args.input.display(),
        "Loaded snapshot"
    );

    args.levels.apply(&mut config.levels);
    let engine = AnalysisEngine::new(config)?;
    let report = engine
        .run(&snapshot.ticker, &snapshot.bars, &snapshot.fundamentals)
        .with_context(|| format!("Analysis of {} failed", snapshot.ticker))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn handle_levels(args: LevelsArgs, mut config: Config) -> Result<()> {
    args.levels.apply(&mut config.levels);
    let levels = technicals::PriceLevelCalculator::new()
        .compute_from_settings(args.price, &config.levels)
        .context("Failed to compute price levels")?;

    println!("{}", serde_json::to_string_pretty(&levels)?);
    Ok(())
}
