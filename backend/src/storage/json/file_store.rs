//! # JSON File Store
//!
//! Local whole-collection storage: one JSON array per collection kind, kept in
//! a single data directory.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── ruraltech_cattle.json
//! ├── ruraltech_buyers.json
//! ├── ruraltech_supplies.json
//! ├── ruraltech_employees.json
//! ├── ruraltech_sales.json
//! └── ruraltech_lots.json
//! ```
//!
//! Files are keyed only by kind, not by user. There is no partial update and no
//! conflict detection; every save rewrites the whole file.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use shared::CollectionKind;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::storage::traits::CollectionStorage;

#[derive(Clone, Debug)]
pub struct JsonFileStore {
    base_directory: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `base_directory`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("creating data directory {}", base_path.display()))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of the JSON file backing a collection
    pub fn collection_path(&self, kind: CollectionKind) -> PathBuf {
        self.base_directory.join(format!("{}.json", kind.storage_key()))
    }
}

#[async_trait]
impl CollectionStorage for JsonFileStore {
    async fn load_collection(&self, kind: CollectionKind) -> Result<Vec<Value>> {
        let path = self.collection_path(kind);

        if !path.exists() {
            debug!("No file for {}, returning empty collection", kind);
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<Value> = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        debug!("Loaded {} {} records from {}", records.len(), kind, path.display());
        Ok(records)
    }

    async fn save_collection(&self, kind: CollectionKind, records: Vec<Value>) -> Result<()> {
        let path = self.collection_path(kind);
        let content = serde_json::to_string_pretty(&records)?;

        // Write to a temp file, then rename over the target
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("writing {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("replacing {}", path.display()))?;

        debug!("Saved {} {} records to {}", records.len(), kind, path.display());
        Ok(())
    }
}
