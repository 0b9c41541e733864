//! Output module for persisting the catalog and reporting on a run
//!
//! This module handles:
//! - Writing full-catalog JSON checkpoints
//! - Reading a checkpoint back
//! - Recording and printing run statistics

mod json;
pub mod stats;
mod traits;

pub use json::{load_catalog, JsonCatalogWriter};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{CatalogSink, OutputError, OutputResult};
