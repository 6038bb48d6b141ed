//! End-to-end generation: content source, normalizer, images, assembly.

use crate::Config;
use deckgen_core::{
    AssembleOptions, Assembler, Artifact, ContentSourceError, ConversionResult, Deck,
    FallbackRenderer, FidelityWarning, Severity, StyleOptions, WarningKind,
};
use deckgen_images::{ImageResolutionError, ImageResolver};
use deckgen_read_json::{NormalizedDeck, normalize_or_placeholder};
use deckgen_source::{ContentSource, GeminiSource};
use deckgen_write_html::HtmlFallback;
use deckgen_write_pptx::PptxAssembler;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error building a pipeline from configuration.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Source(#[from] ContentSourceError),

    #[error("image resolver: {0}")]
    Images(#[from] ImageResolutionError),
}

/// Result of one generation or edit.
#[derive(Debug)]
pub struct Generation {
    /// The deck the artifact was built from, images resolved.
    pub deck: Deck,
    /// The content was unusable and placeholder slides were substituted.
    pub placeholder: bool,
    pub artifact: Artifact,
    /// The artifact came from the fallback renderer.
    pub degraded: bool,
    /// Everything repaired or lost along the way.
    pub warnings: Vec<FidelityWarning>,
}

impl Generation {
    /// File name to offer when delivering the artifact.
    pub fn suggested_file_name(&self) -> String {
        self.artifact.suggested_file_name(&self.deck.title)
    }
}

/// The generation pipeline. Every collaborator is injected.
pub struct Pipeline {
    source: Arc<dyn ContentSource>,
    resolver: ImageResolver,
    assembler: Box<dyn Assembler>,
    fallback: Box<dyn FallbackRenderer>,
    options: AssembleOptions,
}

impl Pipeline {
    /// A pipeline with the OOXML assembler and the HTML fallback.
    pub fn new(source: Arc<dyn ContentSource>, resolver: ImageResolver) -> Self {
        Self {
            source,
            resolver,
            assembler: Box::new(PptxAssembler),
            fallback: Box::new(HtmlFallback),
            options: AssembleOptions::default(),
        }
    }

    /// Gemini source and the configured image providers.
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let source = GeminiSource::new(&config.source)?;
        let resolver = ImageResolver::from_settings(&config.images)?;
        Ok(Self::new(Arc::new(source), resolver))
    }

    pub fn with_assembler(mut self, assembler: impl Assembler + 'static) -> Self {
        self.assembler = Box::new(assembler);
        self
    }

    pub fn with_fallback(mut self, fallback: impl FallbackRenderer + 'static) -> Self {
        self.fallback = Box::new(fallback);
        self
    }

    pub fn with_options(mut self, options: AssembleOptions) -> Self {
        self.options = options;
        self
    }

    /// Generate a deck for `topic` and build its artifact.
    ///
    /// Only a content source failure is an error; everything after that
    /// degrades instead of failing.
    pub async fn generate(
        &self,
        topic: &str,
        style: &StyleOptions,
    ) -> Result<Generation, ContentSourceError> {
        info!(topic, "generating deck");
        let text = self.source.generate(topic, style).await?;
        Ok(self.render_text(&text, style).await)
    }

    /// Produce a new deck from `current` and an edit instruction.
    pub async fn edit(
        &self,
        instruction: &str,
        current: &Deck,
        style: &StyleOptions,
    ) -> Result<Generation, ContentSourceError> {
        info!(instruction, slides = current.len(), "editing deck");
        let text = self.source.edit(instruction, current, style).await?;
        Ok(self.render_text(&text, style).await)
    }

    /// Normalize raw content-source text, resolve images and build the
    /// artifact. Never fails.
    pub async fn render_text(&self, text: &str, style: &StyleOptions) -> Generation {
        let normalized = normalize_or_placeholder(text, &style.palette);
        self.render_normalized(normalized, style.include_images).await
    }

    pub async fn render_normalized(
        &self,
        normalized: NormalizedDeck,
        include_images: bool,
    ) -> Generation {
        let placeholder = normalized.is_placeholder();
        let ConversionResult {
            value: mut deck,
            mut warnings,
        } = normalized.into_result();

        if include_images {
            let resolved = self.resolver.resolve_deck(deck).await;
            deck = resolved.value;
            warnings.extend(resolved.warnings);
        } else {
            for slide in &mut deck.slides {
                slide.image_query = None;
            }
        }

        let built = self.build_artifact(&deck);
        warnings.extend(built.warnings);
        Generation {
            degraded: built.value.format.is_degraded(),
            deck,
            placeholder,
            artifact: built.value,
            warnings,
        }
    }

    /// Assemble `deck`, diverting to the fallback renderer on any assembly
    /// failure, including output too small to be a complete package.
    pub fn build_artifact(&self, deck: &Deck) -> ConversionResult<Artifact> {
        let attempt = self
            .assembler
            .assemble(deck, &self.options)
            .and_then(|result| {
                result.value.ensure_plausible(self.options.min_artifact_size)?;
                Ok(result)
            });
        match attempt {
            Ok(result) => {
                debug!(bytes = result.value.len(), "assembled package");
                result
            }
            Err(failure) => {
                warn!(%failure, "assembly failed, rendering fallback document");
                self.fallback.render(deck).warn(FidelityWarning::new(
                    Severity::Error,
                    WarningKind::DegradedArtifact(failure.to_string()),
                    format!(
                        "could not build a {} package ({failure}); saved a styled {} document instead, \
                         open it in a browser and print or import it to convert",
                        self.assembler.format().extension(),
                        self.fallback.format().extension(),
                    ),
                ))
            }
        }
    }
}
