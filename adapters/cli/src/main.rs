#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a scripted Skywatch session.

mod session;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use skywatch_world::WorldConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use session::SessionOptions;

/// Runs a scripted session against the enemy agents and prints a summary.
#[derive(Debug, Parser)]
#[command(name = "skywatch", author, version, about, long_about = None)]
struct Args {
    /// TOML file describing the world; defaults apply to omitted keys.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the spawn point seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of fixed simulation ticks to run.
    #[arg(long, default_value_t = 3_000)]
    ticks: u32,
    /// Length of a fixed tick in milliseconds.
    #[arg(long, default_value_t = 20)]
    tick_ms: u64,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Skywatch command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    info!(seed = config.rng_seed, ticks = args.ticks, "starting session");

    let summary = session::run(
        config,
        SessionOptions {
            ticks: args.ticks,
            dt: Duration::from_millis(args.tick_ms.max(1)),
        },
    )?;
    println!("{summary}");
    Ok(())
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<WorldConfig> {
    let Some(path) = path else {
        return Ok(WorldConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}
