//! Run statistics
//!
//! Counters collected by the coordinator during a traversal and printed
//! once the final checkpoint has been written.

use std::time::Duration;

/// Counters for one traversal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Directory pages fetched successfully
    pub pages_fetched: u64,

    /// Pages whose subtree was abandoned after a fetch failure
    pub pages_abandoned: u64,

    /// Pages that could not be parsed and were treated as empty
    pub pages_unparsed: u64,

    /// Rate-limit responses that triggered a cooldown
    pub rate_limit_waits: u64,

    /// Transient network failures that were retried
    pub transient_retries: u64,

    /// Catalog entries at the end of the run
    pub entries: u64,

    /// File links skipped because their URL was already catalogued
    pub duplicate_files: u64,

    /// Checkpoints written, including the final one
    pub checkpoints: u64,

    /// Wall-clock duration of the traversal
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Total directory pages the run attempted to fetch
    pub fn pages_attempted(&self) -> u64 {
        self.pages_fetched + self.pages_abandoned
    }

    /// Percentage of attempted pages that were fetched
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_attempted();
        if attempted == 0 {
            return 0.0;
        }
        (self.pages_fetched as f64 / attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Entries catalogued: {}", stats.entries);
    println!("  Directories fetched: {}", stats.pages_fetched);
    println!("  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    println!("  Checkpoints written: {}", stats.checkpoints);
    println!();

    if stats.pages_abandoned > 0 || stats.pages_unparsed > 0 {
        println!("Failures:");
        println!("  Abandoned subtrees: {}", stats.pages_abandoned);
        println!("  Unparsed pages: {}", stats.pages_unparsed);
        println!();
    }

    if stats.rate_limit_waits > 0 || stats.transient_retries > 0 {
        println!("Retries:");
        println!("  Rate-limit cooldowns: {}", stats.rate_limit_waits);
        println!("  Transient retries: {}", stats.transient_retries);
        println!();
    }

    if stats.duplicate_files > 0 {
        println!("Duplicate file links skipped: {}", stats.duplicate_files);
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} directories fetched)",
        stats.success_rate(),
        stats.pages_fetched,
        stats.pages_attempted()
    );
}
