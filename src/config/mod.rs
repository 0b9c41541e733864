//! Configuration module for Dirlist-Catalog
//!
//! Every setting has a built-in default. A TOML file may override any
//! subset of them; the file is parsed and validated here.
//!
//! # Example
//!
//! ```no_run
//! use dirlist_catalog::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("catalog.toml")).unwrap();
//! println!("Checkpoint every {} entries", config.crawler.checkpoint_interval);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, MediaConfig, OutputConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, default_config, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate;
