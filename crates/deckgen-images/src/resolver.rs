//! Total image resolution over an ordered provider chain.

use crate::provider::{
    ImageProvider, ImageResolutionError, PexelsProvider, PixabayProvider, UnsplashProvider,
};
use crate::query::{compact_query, placeholder_url};
use crate::ImageSettings;
use deckgen_core::{ConversionResult, Deck, FidelityWarning, ImageRef, Severity, WarningKind};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of resolving one description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub image: ImageRef,
    /// Provider that found the image; `None` for the placeholder.
    pub provider: Option<String>,
}

impl Resolution {
    pub fn is_placeholder(&self) -> bool {
        self.provider.is_none()
    }
}

/// Tries providers in order until one finds an image.
///
/// Cheap to clone; providers are shared.
#[derive(Clone)]
pub struct ImageResolver {
    providers: Vec<Arc<dyn ImageProvider>>,
    timeout: Duration,
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageResolver {
    /// A resolver with no providers; every slide gets a placeholder.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build the default chain, skipping providers without a credential.
    pub fn from_settings(settings: &ImageSettings) -> Result<Self, ImageResolutionError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(concat!("deckgen/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        let mut resolver = Self::new().with_timeout(timeout);
        match &settings.pexels_api_key {
            Some(key) if !key.is_empty() => {
                resolver = resolver.with_provider(PexelsProvider::new(client.clone(), key));
            }
            _ => debug!("pexels skipped: no credential"),
        }
        match &settings.pixabay_api_key {
            Some(key) if !key.is_empty() => {
                resolver = resolver.with_provider(PixabayProvider::new(client.clone(), key));
            }
            _ => debug!("pixabay skipped: no credential"),
        }
        if settings.unsplash {
            resolver = resolver.with_provider(UnsplashProvider::new(client));
        }
        Ok(resolver)
    }

    /// Append a provider to the end of the chain.
    pub fn with_provider(mut self, provider: impl ImageProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Per-provider time limit.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Names of the configured providers, in order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolve a description to an image. Never fails.
    pub async fn resolve(&self, description: &str) -> Resolution {
        let query = compact_query(description);
        for provider in &self.providers {
            match self.attempt(provider.as_ref(), &query).await {
                Ok(Some(url)) => {
                    debug!(provider = provider.name(), %query, %url, "image found");
                    return Resolution {
                        image: ImageRef::new(url, description),
                        provider: Some(provider.name().to_string()),
                    };
                }
                Ok(None) => debug!(provider = provider.name(), %query, "no image"),
                Err(e) => warn!(provider = provider.name(), %query, error = %e, "image provider failed"),
            }
        }

        info!(%query, "no provider found an image, using placeholder");
        Resolution {
            image: ImageRef::new(placeholder_url(&query), description),
            provider: None,
        }
    }

    async fn attempt(
        &self,
        provider: &dyn ImageProvider,
        query: &str,
    ) -> Result<Option<String>, ImageResolutionError> {
        tokio::time::timeout(self.timeout, provider.search(query))
            .await
            .map_err(|_| ImageResolutionError::Timeout)?
    }

    /// Resolve every requested image in a deck concurrently.
    ///
    /// Returns only after every slide has settled. Slides without a query
    /// are left untouched.
    pub async fn resolve_deck(&self, mut deck: Deck) -> ConversionResult<Deck> {
        let pending: Vec<_> = deck
            .slides
            .iter()
            .enumerate()
            .filter_map(|(pos, slide)| slide.image_query.as_deref().map(|q| (pos, q)))
            .map(|(pos, query)| async move { (pos, self.resolve(query).await) })
            .collect();
        let settled = join_all(pending).await;

        let mut warnings = Vec::new();
        for (pos, resolution) in settled {
            let slide = &mut deck.slides[pos];
            if resolution.is_placeholder() {
                warnings.push(
                    FidelityWarning::new(
                        Severity::Minor,
                        WarningKind::PlaceholderImage,
                        "no image found, using a placeholder",
                    )
                    .on_slide(slide.index),
                );
            }
            slide.image = Some(resolution.image);
        }
        ConversionResult::with_warnings(deck, warnings)
    }
}
