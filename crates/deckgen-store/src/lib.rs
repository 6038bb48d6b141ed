//! Session persistence for deckgen.
//!
//! Chat sessions and their latest deck live in a key-value store under
//! `chat:{id}` and `presentation:{id}`. [`HybridStore`] prefers a remote
//! Redis (REST) backend when one is configured and reachable, and otherwise
//! keeps a reduced projection of each session in a local directory.

mod backend;
mod hybrid;
mod record;
mod redis;

pub use backend::{KeyValueStore, LocalStore, MemoryStore};
pub use hybrid::HybridStore;
pub use record::*;
pub use redis::RedisRestStore;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("store is closed")]
    Closed,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Local session directory. Defaults to the platform data directory.
    pub directory: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub remote_token: Option<String>,
    pub max_messages: usize,
    pub timeout_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            directory: None,
            remote_url: None,
            remote_token: None,
            max_messages: MAX_LOCAL_MESSAGES,
            timeout_secs: 10,
        }
    }
}

impl StoreSettings {
    /// Directory used by the local tier.
    pub fn local_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("deckgen")
                .join("sessions")
        })
    }
}
