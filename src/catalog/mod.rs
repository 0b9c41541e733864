//! Catalog data model
//!
//! The catalog is the single output artifact of a run. It serializes as
//! `{"movies": [CatalogEntry, ...]}` where each entry carries a title, an
//! optional year, at least one download link and a list of genre tags.

mod normalize;

pub use normalize::{normalize_filename, strip_extension};

use serde::{Deserialize, Serialize};

/// Earliest year accepted from a file name
pub const MIN_YEAR: u16 = 1900;

/// Latest year accepted from a file name
pub const MAX_YEAR: u16 = 2099;

/// A labelled download location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadLink {
    pub label: String,
    pub url: String,
}

/// One discovered media file
///
/// Entries are built whole and never modified after being appended, so a
/// checkpoint can never observe a partial record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    title: String,
    year: Option<u16>,
    download_links: Vec<DownloadLink>,
    genre: Vec<String>,
}

impl CatalogEntry {
    /// Creates an entry with a single download link
    ///
    /// A year outside `MIN_YEAR..=MAX_YEAR` is dropped.
    pub fn new(
        title: impl Into<String>,
        year: Option<u16>,
        link: DownloadLink,
        genre: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            year: year.filter(|y| (MIN_YEAR..=MAX_YEAR).contains(y)),
            download_links: vec![link],
            genre,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn year(&self) -> Option<u16> {
        self.year
    }

    pub fn download_links(&self) -> &[DownloadLink] {
        &self.download_links
    }

    pub fn genre(&self) -> &[String] {
        &self.genre
    }
}

/// Ordered, append-only list of entries in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    movies: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns the new catalog size
    pub fn push(&mut self, entry: CatalogEntry) -> usize {
        self.movies.push(entry);
        self.movies.len()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.movies
    }
}
