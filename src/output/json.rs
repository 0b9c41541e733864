//! JSON checkpoint writer
//!
//! Writes `{"movies": [...]}` to a fixed path. The document is written to a
//! sibling temporary file first and renamed over the destination, so the
//! catalog file is always either the previous checkpoint or the new one.

use crate::catalog::Catalog;
use crate::output::traits::{CatalogSink, OutputResult};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Checkpoint writer backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonCatalogWriter {
    path: PathBuf,
}

impl JsonCatalogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CatalogSink for JsonCatalogWriter {
    fn save(&mut self, catalog: &Catalog) -> OutputResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, catalog)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        tracing::info!(
            "Saved {} entries to {}",
            catalog.len(),
            self.path.display()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Reads a catalog file written by `JsonCatalogWriter`
pub fn load_catalog(path: &Path) -> OutputResult<Catalog> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
