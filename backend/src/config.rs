//! # Application Configuration
//!
//! Settings are read from an optional YAML file and then overridden by
//! environment variables.
//!
//! ## YAML Format
//!
//! ```yaml
//! storage: remote
//! data_directory: "./data"
//! database_url: "sqlite:ruraltech.db"
//! bind_address: "127.0.0.1:3000"
//! log_filter: "info,sqlx=warn"
//! ```
//!
//! ## Environment
//!
//! | Variable                 | Field            |
//! |--------------------------|------------------|
//! | `RURALTECH_CONFIG`       | YAML file path   |
//! | `RURALTECH_STORAGE`      | `storage`        |
//! | `RURALTECH_DATA_DIR`     | `data_directory` |
//! | `RURALTECH_DATABASE_URL` | `database_url`   |
//! | `RURALTECH_BIND`         | `bind_address`   |
//! | `RURALTECH_LOG`          | `log_filter`     |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_PATH_VAR: &str = "RURALTECH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "ruraltech.yaml";

/// Which persistent store backs the collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per collection in `data_directory`
    Local,
    /// Per-user rows in the SQLite database at `database_url`
    Remote,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "remote" => Ok(StorageBackend::Remote),
            other => anyhow::bail!("unknown storage backend '{}', expected local or remote", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub data_directory: PathBuf,
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Local,
            data_directory: PathBuf::from("./data"),
            database_url: "sqlite:ruraltech.db".to_string(),
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the file named by `RURALTECH_CONFIG` (or `ruraltech.yaml`)
    /// and apply environment overrides.
    ///
    /// A missing default file is fine; a missing file that was asked for
    /// explicitly is an error.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var(CONFIG_PATH_VAR).ok();
        let path = PathBuf::from(explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));

        let config = if path.exists() {
            Self::from_file(&path)?
        } else if explicit.is_some() {
            anyhow::bail!("config file {:?} does not exist", path);
        } else {
            debug!("No config file at {:?}, using defaults", path);
            Self::default()
        };

        config.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {:?}", path))?;
        let config = Self::from_yaml(&yaml_content)
            .with_context(|| format!("parsing config file {:?}", path))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml(yaml_content: &str) -> Result<Self> {
        if yaml_content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml_content)?)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(storage) = lookup("RURALTECH_STORAGE") {
            self.storage = storage.parse().context("RURALTECH_STORAGE")?;
        }
        if let Some(data_directory) = lookup("RURALTECH_DATA_DIR") {
            self.data_directory = PathBuf::from(data_directory);
        }
        if let Some(database_url) = lookup("RURALTECH_DATABASE_URL") {
            self.database_url = database_url;
        }
        if let Some(bind_address) = lookup("RURALTECH_BIND") {
            self.bind_address = bind_address
                .parse()
                .with_context(|| format!("RURALTECH_BIND is not a socket address: {}", bind_address))?;
        }
        if let Some(log_filter) = lookup("RURALTECH_LOG") {
            self.log_filter = log_filter;
        }
        Ok(self)
    }
}
