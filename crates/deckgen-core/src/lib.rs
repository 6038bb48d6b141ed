//! deckgen-core: the canonical presentation model.
//!
//! This crate holds the types every stage of the pipeline agrees on: the
//! normalized [`Deck`], its [`SlideRecord`]s and [`Palette`]s, the produced
//! [`Artifact`], fidelity warnings, and the error taxonomy shared by the
//! normalizer, assembler, fallback renderer and delivery.

mod artifact;
pub mod builder;
mod deck;
pub mod escape;
mod fidelity;
mod palette;
mod style;
mod traits;

pub use artifact::*;
pub use deck::*;
pub use fidelity::*;
pub use palette::*;
pub use style::*;
pub use traits::*;
