#![forbid(unsafe_code)]

mod config;
mod constants;
mod keys;
mod locale;
mod mapping;
mod rules;
mod schema;
mod store;
mod sync;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{Level as TraceLevel, info};
use tracing_subscriber::FmtSubscriber;

use config::SyncConfig;
use store::DiskStore;
use sync::Mode;

/// Regenerate scope mappings, settings schema and locale descriptions from
/// the TextMate token color rules
#[derive(Debug, Parser)]
#[command(name = "token-color-sync", version)]
struct Cli {
    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Repository root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Config file (defaults to <root>/token-sync.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn init_logging() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "warn".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "info" => TraceLevel::INFO,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::WARN,
    };

    // stdout carries the report
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to install log subscriber")?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let mut store = DiskStore;
    let config = SyncConfig::load(&store, &root, cli.config.as_deref())?;
    let mode = if cli.dry_run { Mode::DryRun } else { Mode::Apply };
    info!(root = %root.display(), ?mode, "Starting token color sync");

    let report = sync::run(&mut store, &root, &config, mode)?;
    print!("{report}");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging().and_then(|()| run(cli)) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
