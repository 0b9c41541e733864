//! Crawler coordinator - main traversal logic
//!
//! This module contains the depth-first walk over directory listings:
//! - Fetching each directory once, in document order
//! - Classifying links as directories, media files or noise
//! - Building catalog entries from file names
//! - Periodic and final checkpoints, including on interruption

use crate::catalog::{normalize_filename, Catalog, CatalogEntry, DownloadLink};
use crate::config::{validate, Config};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{parse_listing, ListingLink, ParsedListing};
use crate::crawler::shutdown::ShutdownSignal;
use crate::output::{CatalogSink, CrawlStatistics};
use crate::state::CrawlContext;
use crate::url::{file_name, has_media_extension, is_within_scope, resolve_href};
use crate::CrawlError;
use std::time::Instant;
use url::Url;

/// How a traversal ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// Every reachable directory was visited
    Completed,

    /// Shutdown was requested before the walk finished
    Interrupted,
}

/// Everything a finished run hands back
#[derive(Debug)]
pub struct CrawlReport {
    pub outcome: CrawlOutcome,
    pub statistics: CrawlStatistics,
    pub catalog: Catalog,
}

/// What a single link on a listing page leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// A sub-listing to descend into
    Directory(Url),

    /// A leaf media file to catalog
    File(Url),

    /// Anything else, with the reason it is ignored
    Skip(&'static str),
}

/// Classifies one link found on `page`
///
/// - Links resolving to `root` from any page other than `root` are skipped
///   (cycle guard).
/// - An href ending in `/` is a directory if it stays inside `root`'s tree.
/// - Otherwise the link is a file if its name has a media extension.
pub fn classify_link(page: &Url, href: &str, root: &Url, extensions: &[String]) -> LinkKind {
    let url = match resolve_href(page, href) {
        Ok(url) => url,
        Err(_) => return LinkKind::Skip("unresolvable href"),
    };

    if url == *root && page != root {
        return LinkKind::Skip("leads back to root");
    }

    if href.ends_with('/') {
        if !is_within_scope(&url, root) {
            return LinkKind::Skip("directory outside root");
        }
        return LinkKind::Directory(url);
    }

    if has_media_extension(&url, extensions) {
        LinkKind::File(url)
    } else {
        LinkKind::Skip("not a media file")
    }
}

/// A fetched listing whose links are being walked
struct Frame {
    page: Url,
    links: std::vec::IntoIter<ListingLink>,
}

/// Main crawler coordinator structure
///
/// Owns the run's `CrawlContext`. The walk is an explicit stack of
/// listing frames: the top frame yields its next link, a directory link
/// pushes a new frame before the remaining siblings are looked at, and an
/// exhausted frame is popped. This is the same order as a recursive
/// depth-first walk.
///
/// Once `run` has started, a final checkpoint is written exactly once: when
/// `run` returns, or when the run is dropped before finishing (panic or a
/// cancelled future). A coordinator that never ran writes nothing.
pub struct Coordinator<S: CatalogSink> {
    root: Url,
    fetcher: Fetcher,
    sink: S,
    shutdown: ShutdownSignal,
    context: CrawlContext,
    extensions: Vec<String>,
    genre: String,
    link_label: String,
    checkpoint_interval: usize,
    stats: CrawlStatistics,
    finalized: bool,
}

impl<S: CatalogSink> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The run's configuration, validated here
    /// * `sink` - Where checkpoints are written
    /// * `shutdown` - Flag checked before every fetch
    ///
    /// Nothing is written to `sink` until `run` is called.
    pub fn new(config: &Config, sink: S, shutdown: ShutdownSignal) -> Result<Self, CrawlError> {
        let fetcher = Fetcher::from_config(&config.crawler, &config.http)?;
        Self::with_fetcher(config, fetcher, sink, shutdown)
    }

    /// Creates a coordinator around an existing fetcher
    pub fn with_fetcher(
        config: &Config,
        fetcher: Fetcher,
        sink: S,
        shutdown: ShutdownSignal,
    ) -> Result<Self, CrawlError> {
        validate(config)?;
        let root = Url::parse(&config.crawler.root_url)?;

        Ok(Self {
            root,
            fetcher,
            sink,
            shutdown,
            context: CrawlContext::new(),
            extensions: config
                .media
                .extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            genre: config.output.default_genre.clone(),
            link_label: config.output.link_label.clone(),
            checkpoint_interval: config.crawler.checkpoint_interval,
            stats: CrawlStatistics::default(),
            finalized: true,
        })
    }

    /// Runs the traversal to completion or interruption
    ///
    /// Page failures never end the run; they only cut off the failing
    /// page's subtree. The final checkpoint is written before returning.
    pub async fn run(mut self) -> CrawlReport {
        self.finalized = false;
        tracing::info!("Starting scrape of {}", self.root);
        tracing::info!("Checkpoints go to {}", self.sink.describe());

        let start = Instant::now();
        let outcome = self.traverse().await;
        self.stats.elapsed = start.elapsed();

        if outcome == CrawlOutcome::Interrupted {
            tracing::warn!(
                "Stopping early with {} entries",
                self.context.catalog().len()
            );
        }

        self.finalize();

        let fetch_stats = self.fetcher.stats();
        self.stats.rate_limit_waits = fetch_stats.rate_limit_waits;
        self.stats.transient_retries = fetch_stats.transient_retries;
        self.stats.entries = self.context.catalog().len() as u64;

        tracing::info!(
            "Traversal {:?}: {} entries from {} directories in {:?}",
            outcome,
            self.stats.entries,
            self.stats.pages_fetched,
            self.stats.elapsed
        );

        CrawlReport {
            outcome,
            statistics: self.stats.clone(),
            catalog: std::mem::take(&mut self.context).into_catalog(),
        }
    }

    async fn traverse(&mut self) -> CrawlOutcome {
        let root = self.root.clone();
        let mut stack = Vec::new();

        match self.enter_directory(root).await {
            Ok(Some(frame)) => stack.push(frame),
            Ok(None) => return CrawlOutcome::Completed,
            Err(outcome) => return outcome,
        }

        while let Some(frame) = stack.last_mut() {
            let Some(link) = frame.links.next() else {
                stack.pop();
                continue;
            };

            match classify_link(&frame.page, &link.href, &self.root, &self.extensions) {
                LinkKind::Directory(url) => match self.enter_directory(url).await {
                    Ok(Some(child)) => stack.push(child),
                    Ok(None) => {}
                    Err(outcome) => return outcome,
                },
                LinkKind::File(url) => self.record_file(url),
                LinkKind::Skip(reason) => {
                    tracing::trace!("Skipping {}: {}", link.href, reason);
                }
            }
        }

        CrawlOutcome::Completed
    }

    /// Claims and fetches a directory
    ///
    /// Returns `Ok(None)` when the directory was already visited or its
    /// fetch failed (subtree abandoned), and `Err(Interrupted)` when
    /// shutdown was requested before the fetch.
    async fn enter_directory(&mut self, url: Url) -> Result<Option<Frame>, CrawlOutcome> {
        if !self.context.mark_visited(&url) {
            tracing::trace!("Already visited {}", url);
            return Ok(None);
        }

        if self.shutdown.is_triggered() {
            return Err(CrawlOutcome::Interrupted);
        }

        tracing::info!("Entering {}", url);

        let body = match self.fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Abandoning subtree: {}", e);
                self.stats.pages_abandoned += 1;
                return Ok(None);
            }
        };
        self.stats.pages_fetched += 1;

        let listing = parse_listing(&body).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse listing {}: {}", url, e);
            self.stats.pages_unparsed += 1;
            ParsedListing::default()
        });

        if let Some(title) = &listing.title {
            tracing::debug!("Title: {}", title);
        }
        tracing::debug!("Found {} links in {}", listing.links.len(), url);

        Ok(Some(Frame {
            page: url,
            links: listing.links.into_iter(),
        }))
    }

    /// Turns a media file link into a catalog entry
    fn record_file(&mut self, url: Url) {
        let Some(name) = file_name(&url) else {
            return;
        };
        let (title, year) = normalize_filename(&name);

        let entry = CatalogEntry::new(
            title,
            year,
            DownloadLink {
                label: self.link_label.clone(),
                url: url.to_string(),
            },
            vec![self.genre.clone()],
        );
        let found = format!(
            "{} ({})",
            entry.title(),
            entry.year().map_or_else(|| "unknown".to_string(), |y| y.to_string())
        );

        match self.context.record_entry(&url, entry) {
            Some(size) => {
                tracing::info!("Found: {}", found);
                if size % self.checkpoint_interval == 0 {
                    tracing::info!("Checkpoint: saving {} entries", size);
                    self.checkpoint();
                }
            }
            None => {
                self.stats.duplicate_files += 1;
                tracing::debug!("Already catalogued {}", url);
            }
        }
    }

    /// Writes the whole catalog to the sink
    fn checkpoint(&mut self) {
        match self.sink.save(self.context.catalog()) {
            Ok(()) => self.stats.checkpoints += 1,
            Err(e) => tracing::error!(
                "Failed to write checkpoint to {}: {}",
                self.sink.describe(),
                e
            ),
        }
    }

    /// Writes the final checkpoint; later calls do nothing
    fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        self.checkpoint();
    }
}

impl<S: CatalogSink> Drop for Coordinator<S> {
    fn drop(&mut self) {
        if !self.finalized {
            tracing::warn!("Traversal ended unexpectedly, saving progress");
            self.finalize();
        }
    }
}
