//! Dirlist-Catalog main entry point
//!
//! This is the command-line interface for the directory-listing cataloger.

use anyhow::Context;
use clap::Parser;
use dirlist_catalog::config::{default_config, load_config_with_hash, Config};
use dirlist_catalog::crawler::{run_crawl, CrawlOutcome, ShutdownSignal};
use dirlist_catalog::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Dirlist-Catalog: a directory-listing media cataloger
///
/// Walks nested directory listings depth-first, one request at a time, and
/// writes every media file found to a JSON catalog. Press Ctrl-C to stop;
/// progress is saved before exit.
#[derive(Parser, Debug)]
#[command(name = "dirlist-catalog")]
#[command(version)]
#[command(about = "A directory-listing media cataloger", long_about = None)]
struct Cli {
    /// Optional TOML file overriding the built-in settings
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Register the interrupt listener before anything can be fetched
    let shutdown = ShutdownSignal::new();
    let _listener = shutdown.listen_for_ctrl_c();

    let config = load(cli.config.as_deref())?;

    tracing::info!("Rate limit delay: {}ms", config.crawler.request_delay);
    tracing::info!("Press Ctrl+C to stop and save progress.");

    let report = run_crawl(&config, shutdown)
        .await
        .context("failed to set up the crawler")?;

    match report.outcome {
        CrawlOutcome::Completed => tracing::info!("Scrape complete!"),
        CrawlOutcome::Interrupted => tracing::info!("Scrape interrupted, progress saved"),
    }

    if !cli.quiet {
        print_statistics(&report.statistics);
    }

    Ok(())
}

/// Loads the configuration file if one was given, else the built-in defaults
fn load(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::info!("No configuration file given, using built-in settings");
            Ok(default_config()?)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dirlist_catalog=info,warn"),
            1 => EnvFilter::new("dirlist_catalog=debug,info"),
            2 => EnvFilter::new("dirlist_catalog=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
