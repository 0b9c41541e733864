//! Checkpoint sink trait and error types

use crate::catalog::Catalog;
use thiserror::Error;

/// Errors that can occur while persisting the catalog
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for catalog checkpoints
///
/// Every call receives the whole catalog, never a delta, and replaces
/// whatever an earlier call stored.
pub trait CatalogSink {
    /// Persists the full current catalog
    fn save(&mut self, catalog: &Catalog) -> OutputResult<()>;

    /// Human-readable description of where checkpoints go
    fn describe(&self) -> String;
}
