//! Layered configuration: defaults, then a JSON file, then the environment.

use deckgen_core::Palette;
use deckgen_images::ImageSettings;
use deckgen_source::SourceSettings;
use deckgen_store::StoreSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Error loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Where artifacts are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub directory: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceSettings,
    pub images: ImageSettings,
    pub store: StoreSettings,
    pub output: OutputSettings,
    /// Deck default palette.
    pub palette: Palette,
}

impl Config {
    /// `<config_dir>/deckgen/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("deckgen").join("config.json"))
    }

    /// Load from `path`, or from the default path when `None`, then apply
    /// environment overrides.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse a JSON config file.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "reading config");
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override settings from environment-style variables. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = var("GOOGLE_API_KEY") {
            self.source.api_key = Some(key);
        }
        if let Some(key) = var("PEXELS_API_KEY") {
            self.images.pexels_api_key = Some(key);
        }
        if let Some(key) = var("PIXABAY_API_KEY") {
            self.images.pixabay_api_key = Some(key);
        }
        if let Some(url) = var("DECKGEN_REDIS_URL") {
            self.store.remote_url = Some(url);
        }
        if let Some(token) = var("DECKGEN_REDIS_TOKEN") {
            self.store.remote_token = Some(token);
        }
        if let Some(dir) = var("DECKGEN_OUTPUT_DIR") {
            self.output.directory = Some(PathBuf::from(dir));
        }
    }

    /// Directory artifacts are delivered into; the working directory by default.
    pub fn output_directory(&self) -> PathBuf {
        self.output
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
