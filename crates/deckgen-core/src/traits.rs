//! Backend traits and the pipeline error taxonomy.

use crate::{Artifact, ArtifactFormat, ConversionResult, Deck};
use chrono::{DateTime, Utc};

/// Smallest package, in bytes, accepted as a complete presentation.
pub const DEFAULT_MIN_ARTIFACT_SIZE: usize = 2048;

/// Options for assembling.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Artifacts smaller than this are treated as truncated.
    pub min_artifact_size: usize,
    /// Creation timestamp written to document properties; `None` means now.
    pub created: Option<DateTime<Utc>>,
    /// Author written to document properties.
    pub author: String,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            min_artifact_size: DEFAULT_MIN_ARTIFACT_SIZE,
            created: None,
            author: "deckgen".to_string(),
        }
    }
}

/// The content source was unavailable or rejected the request.
#[derive(Debug, thiserror::Error)]
pub enum ContentSourceError {
    #[error("content source credential is not configured")]
    MissingCredential,
    #[error("content source rejected the credential")]
    InvalidCredential,
    #[error("content source rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("content source unavailable: {0}")]
    Unavailable(String),
    #[error("content source returned no text")]
    EmptyResponse,
}

/// Raw content could not be turned into a deck.
#[derive(Debug, thiserror::Error)]
pub enum NormalizationFailure {
    #[error("malformed content: {0}")]
    Malformed(String),
    #[error("content is not a JSON object")]
    NotAnObject,
    #[error("content has no slides array")]
    MissingSlides,
    #[error("content has no usable slides")]
    EmptyDeck,
}

/// Error during package assembly. Partial artifacts are never returned.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyFailure {
    #[error("deck has no slides")]
    EmptyDeck,
    #[error("manifest declares {declared} slide parts but {emitted} were emitted")]
    ManifestMismatch { declared: usize, emitted: usize },
    #[error("artifact is {size} bytes, below the {minimum} byte minimum")]
    ImplausibleSize { size: usize, minimum: usize },
    #[error("archive error: {0}")]
    Archive(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The save action failed; the artifact is untouched and can be re-delivered.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryFailure {
    #[error("delivery denied: {0}")]
    Denied(String),
    #[error("artifact is empty")]
    EmptyArtifact,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build an artifact from a deck.
pub trait Assembler: Send + Sync {
    /// Format this assembler produces.
    fn format(&self) -> ArtifactFormat;

    /// Assemble a complete artifact, or fail without producing one.
    fn assemble(
        &self,
        deck: &Deck,
        options: &AssembleOptions,
    ) -> Result<ConversionResult<Artifact>, AssemblyFailure>;
}

/// Build a degraded artifact from a deck. Never fails.
pub trait FallbackRenderer: Send + Sync {
    /// Format this renderer produces.
    fn format(&self) -> ArtifactFormat;

    /// Render any deck, including an empty one.
    fn render(&self, deck: &Deck) -> ConversionResult<Artifact>;
}
