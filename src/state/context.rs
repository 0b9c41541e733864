use crate::catalog::{Catalog, CatalogEntry};
use std::collections::HashSet;
use url::Url;

/// Mutable state of one traversal
///
/// Owns the catalog and the visited set. Each `Coordinator` has its own
/// context, so independent runs in one process never share state.
#[derive(Debug, Default)]
pub struct CrawlContext {
    catalog: Catalog,

    /// Directory pages already fetched (or claimed for fetching)
    visited: HashSet<String>,

    /// File URLs already turned into entries
    catalogued: HashSet<String>,
}

impl CrawlContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a page URL for fetching
    ///
    /// Returns false if the URL was already visited; the set never shrinks,
    /// so each URL is claimed at most once per run.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    /// Appends an entry unless its file URL is already in the catalog
    ///
    /// Returns the new catalog size, or `None` for a duplicate.
    pub fn record_entry(&mut self, file_url: &Url, entry: CatalogEntry) -> Option<usize> {
        if !self.catalogued.insert(file_url.as_str().to_string()) {
            return None;
        }
        Some(self.catalog.push(entry))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Consumes the context, returning the catalog
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }
}
