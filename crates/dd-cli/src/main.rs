mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dd_core::{Regime, ValueSeries, export_json, import_json};

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "ddepth", about = "Derivative-depth signal classifier")]
struct Cli {
    /// TOML configuration file (falls back to $DDEPTH_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every sample of a series snapshot
    Classify {
        /// Snapshot JSON file
        snapshot: PathBuf,

        /// Print the snapshot with depths filled in instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print contiguous regime segments of a series snapshot
    Segments {
        /// Snapshot JSON file
        snapshot: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Classify { snapshot, json } => cmd_classify(&config, snapshot, *json),
        Commands::Segments { snapshot } => cmd_segments(&config, snapshot),
        Commands::Config => cmd_config(&config),
    }
}

fn load_series(config: &CliConfig, path: &Path) -> Result<ValueSeries<f64>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let series = import_json(&json, &config.depth)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    tracing::info!("loaded {} samples from {}", series.len(), path.display());
    Ok(series)
}

fn cmd_classify(config: &CliConfig, path: &Path, json: bool) -> Result<()> {
    let mut series = load_series(config, path)?;
    let depths = series
        .calc_deriv_depths()
        .context("failed to classify series")?
        .to_vec();

    if json {
        let out = export_json(&series).context("failed to serialize snapshot")?;
        println!("{out}");
        return Ok(());
    }

    println!(
        "{:>6}  {:>14}  {:>14}  {:<5}  {:>10}  regime",
        "index", "coordinate", "value", "valid", "depth"
    );
    for (index, &depth) in depths.iter().enumerate() {
        let value = series.read_at(index)?;
        println!(
            "{:>6}  {:>14.6}  {:>14.6}  {:<5}  {:>10}  {}",
            index,
            series.coordinate_of(index),
            value,
            series.is_valid(index),
            depth,
            Regime::from_depth(depth),
        );
    }
    Ok(())
}

fn cmd_segments(config: &CliConfig, path: &Path) -> Result<()> {
    let mut series = load_series(config, path)?;
    let segments = series.segments().context("failed to classify series")?;

    for seg in &segments {
        println!(
            "{}..={}  [{}, {}]  {}",
            seg.start,
            seg.end,
            series.coordinate_of(seg.start),
            series.coordinate_of(seg.end),
            seg.regime,
        );
    }

    let boundaries = segments
        .iter()
        .filter(|s| s.regime == Regime::Boundary)
        .count();
    if boundaries > 0 {
        tracing::info!("{boundaries} regime boundaries");
    }
    Ok(())
}

fn cmd_config(config: &CliConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
