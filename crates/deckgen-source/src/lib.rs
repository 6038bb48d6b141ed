//! Content sources for deckgen.
//!
//! A content source turns a topic (or an edit instruction plus the current
//! deck) into raw text that should contain one JSON deck object. The text is
//! handed to the normalizer unchanged.

mod gemini;
pub mod prompt;

pub use gemini::GeminiSource;

use async_trait::async_trait;
use deckgen_core::{ContentSourceError, Deck, StyleOptions};
use serde::{Deserialize, Serialize};

/// A generative text provider.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Produce raw deck text for a new topic.
    async fn generate(&self, topic: &str, style: &StyleOptions)
    -> Result<String, ContentSourceError>;

    /// Produce raw deck text for an edited version of `current`.
    async fn edit(
        &self,
        instruction: &str,
        current: &Deck,
        style: &StyleOptions,
    ) -> Result<String, ContentSourceError>;
}

/// Content source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash-exp".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
        }
    }
}
