//! Deckgen - presentation generation with a guaranteed artifact
//!
//! Deckgen turns a topic into a downloadable presentation:
//! - A generative content source writes slide data as loosely-shaped JSON
//! - The normalizer repairs it into a canonical [`Deck`], or substitutes
//!   placeholder slides
//! - The image resolver attaches an image to every slide that asks for one
//! - The assembler packages the deck as an Office Open XML `.pptx`, and a
//!   styled HTML document is produced instead if that fails
//!
//! Every repair along the way is reported as a [`FidelityWarning`].
//!
//! # Quick Start
//!
//! ```rust
//! use deckgen::prelude::*;
//!
//! let raw = r#"{"title":"Q3 Review","slides":[{"title":"Intro","bulletPoints":["Revenue up"]}]}"#;
//! let deck = deckgen::json::normalize_or_placeholder(raw, &Palette::default()).into_deck();
//!
//! let pptx = deckgen::pptx::emit(&deck).unwrap();
//! assert_eq!(pptx.value.format, ArtifactFormat::Pptx);
//!
//! let html = deckgen::html::emit(&deck);
//! assert!(String::from_utf8(html.value.data).unwrap().contains("Slide 1: Intro"));
//! ```

mod config;
mod delivery;
mod pipeline;

pub use config::{Config, ConfigError, OutputSettings};
pub use delivery::{Delivery, FileDelivery, sanitize_file_name};
pub use pipeline::{Generation, Pipeline, SetupError};

// Re-export core types
pub use deckgen_core::*;

/// Commonly used items.
pub mod prelude {
    pub use crate::{Config, Delivery, FileDelivery, Generation, Pipeline};
    pub use deckgen_core::{
        Artifact, ArtifactFormat, ConversionResult, Deck, FidelityWarning, Palette, Severity,
        SlideBody, SlideKind, SlideRecord, StyleOptions,
    };
}

/// Content normalization.
pub mod json {
    pub use deckgen_read_json::{
        NormalizedDeck, extract_json, normalize, normalize_or_placeholder, parse,
        placeholder_deck, to_raw,
    };
}

/// Office Open XML presentation packages.
pub mod pptx {
    pub use deckgen_write_pptx::{PptxAssembler, emit, emit_with_options};
}

/// Degraded HTML documents.
pub mod html {
    pub use deckgen_write_html::{HtmlFallback, emit};
}

/// Image resolution.
pub mod images {
    pub use deckgen_images::*;
}

/// Content sources.
pub mod source {
    pub use deckgen_source::*;
}

/// Session persistence.
pub mod store {
    pub use deckgen_store::*;
}
