//! State module for tracking crawl progress
//!
//! `CrawlContext` is the accumulator of a single run: the catalog built so
//! far plus the set of pages already visited.

mod context;

pub use context::CrawlContext;
