//! Crawler module for directory-listing traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with pacing and retry logic
//! - Listing parsing and link extraction
//! - Depth-first traversal and cataloging
//! - Cooperative shutdown

mod coordinator;
mod fetcher;
mod parser;
mod shutdown;

pub use coordinator::{classify_link, Coordinator, CrawlOutcome, CrawlReport, LinkKind};
pub use fetcher::{build_http_client, is_rate_limited, FetchError, FetchStats, Fetcher};
pub use parser::{parse_listing, ListingLink, ParsedListing};
pub use shutdown::ShutdownSignal;

use crate::config::Config;
use crate::output::JsonCatalogWriter;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and fetcher
/// 2. Walk the listing tree from the configured root
/// 3. Checkpoint the catalog to the configured JSON file
/// 4. Write the final checkpoint, also when `shutdown` fires
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `shutdown` - Flag that stops the walk at the next fetch
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The walk ended, completed or interrupted
/// * `Err(CrawlError)` - The crawler could not be set up
///
/// # Example
///
/// ```no_run
/// use dirlist_catalog::config::Config;
/// use dirlist_catalog::crawler::{run_crawl, ShutdownSignal};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(&Config::default(), ShutdownSignal::new()).await?;
/// println!("{} entries", report.catalog.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, shutdown: ShutdownSignal) -> Result<CrawlReport, CrawlError> {
    let sink = JsonCatalogWriter::new(&config.output.catalog_path);
    let coordinator = Coordinator::new(config, sink, shutdown)?;
    Ok(coordinator.run().await)
}
