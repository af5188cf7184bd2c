use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::credentials::CredentialStore;

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 10;

/// The search endpoint refuses larger pages.
const MAX_SEARCH_LIMIT: u32 = 50;

/// Optional settings read from `~/.config/album-artwork/config.toml`.
/// Every field falls back to a built-in default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_limit: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_timeout_secs: Option<u64>,
}

impl Config {
    /// Create a new empty config
    pub fn new() -> Self {
        Config::default()
    }

    /// Get the config file path (~/.config/album-artwork/config.toml)
    pub fn get_config_path() -> Result<PathBuf, io::Error> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no configuration directory"))?;
        Ok(config_dir.join("album-artwork").join("config.toml"))
    }

    /// Load config from the default location
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load config from file; a missing file gives an empty config
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.exists() {
            return Ok(Config::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Where artwork is saved (default `~/Pictures/albumartworks`).
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Pictures")
                .join("albumartworks")
        })
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.credentials_file
            .clone()
            .unwrap_or_else(CredentialStore::default_path)
    }

    /// Number of candidates requested per search, clamped to 1..=50.
    pub fn search_limit(&self) -> u32 {
        self.search_limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(
            self.download_timeout_secs
                .unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT_SECS)
                .max(1),
        )
    }
}
