//! Image resolution for deckgen.
//!
//! Each slide may carry a free-text image description. The resolver compacts
//! it into a short search query, asks each configured provider in turn and
//! falls back to a neutral placeholder, so resolution always yields an image.
//!
//! ```no_run
//! # async fn demo() -> Result<(), deckgen_images::ImageResolutionError> {
//! use deckgen_images::{ImageResolver, ImageSettings};
//!
//! let resolver = ImageResolver::from_settings(&ImageSettings::default())?;
//! let resolution = resolver.resolve("team meeting in a modern office").await;
//! println!("{}", resolution.image.url);
//! # Ok(())
//! # }
//! ```

mod provider;
mod query;
mod resolver;

pub use provider::{
    ImageProvider, ImageResolutionError, PexelsProvider, PixabayProvider, UnsplashProvider,
};
pub use query::{FALLBACK_QUERY, compact_query, placeholder_url};
pub use resolver::{ImageResolver, Resolution};

use serde::{Deserialize, Serialize};

/// Default per-provider request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// Provider credentials and limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub pexels_api_key: Option<String>,
    pub pixabay_api_key: Option<String>,
    /// Probe the keyless Unsplash source as a last resort.
    pub unsplash: bool,
    pub timeout_secs: u64,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            pexels_api_key: None,
            pixabay_api_key: None,
            unsplash: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
