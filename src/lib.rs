//! Dirlist-Catalog: a directory-listing media cataloger
//!
//! This crate walks nested directory-listing pages on a remote file host,
//! depth-first and one request at a time, and records every media file it
//! finds as a catalog entry (title, year, download link). The catalog is
//! checkpointed to a JSON file periodically and on every exit path.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for run-level failures
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid HTTP header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

// Re-export commonly used types
pub use catalog::{normalize_filename, Catalog, CatalogEntry, DownloadLink};
pub use config::Config;
pub use crawler::{CrawlOutcome, Coordinator, ShutdownSignal};
pub use state::CrawlContext;
