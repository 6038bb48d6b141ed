//! Image search providers.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

/// A single provider failed to answer. Never escapes the resolver.
#[derive(Debug, thiserror::Error)]
pub enum ImageResolutionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned status {0}")]
    Status(u16),
    #[error("provider timed out")]
    Timeout,
}

/// An image search service.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Search for one image matching a compacted query.
    ///
    /// `Ok(None)` means the provider answered but had no match.
    async fn search(&self, query: &str) -> Result<Option<String>, ImageResolutionError>;
}

/// Pexels photo search. Requires an API key.
pub struct PexelsProvider {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct PexelsResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Deserialize)]
struct PexelsPhoto {
    src: PexelsSource,
}

#[derive(Deserialize)]
struct PexelsSource {
    large: String,
}

impl PexelsProvider {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ImageProvider for PexelsProvider {
    fn name(&self) -> &str {
        "pexels"
    }

    async fn search(&self, query: &str) -> Result<Option<String>, ImageResolutionError> {
        let response = self
            .client
            .get("https://api.pexels.com/v1/search")
            .query(&[("query", query), ("per_page", "1")])
            .header(AUTHORIZATION, &self.api_key)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ImageResolutionError::Status(response.status().as_u16()));
        }
        let body: PexelsResponse = response.json().await?;
        Ok(body.photos.into_iter().next().map(|p| p.src.large))
    }
}

/// Pixabay image search. Requires an API key.
pub struct PixabayProvider {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct PixabayResponse {
    #[serde(default)]
    hits: Vec<PixabayHit>,
}

#[derive(Deserialize)]
struct PixabayHit {
    #[serde(rename = "webformatURL")]
    webformat_url: String,
}

impl PixabayProvider {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ImageProvider for PixabayProvider {
    fn name(&self) -> &str {
        "pixabay"
    }

    async fn search(&self, query: &str) -> Result<Option<String>, ImageResolutionError> {
        let response = self
            .client
            .get("https://pixabay.com/api/")
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("image_type", "photo"),
                ("per_page", "3"),
                ("safesearch", "true"),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ImageResolutionError::Status(response.status().as_u16()));
        }
        let body: PixabayResponse = response.json().await?;
        Ok(body.hits.into_iter().next().map(|h| h.webformat_url))
    }
}

/// Unsplash source redirect. Needs no key; probed with HEAD.
pub struct UnsplashProvider {
    client: reqwest::Client,
}

impl UnsplashProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn url(query: &str) -> String {
        format!(
            "https://source.unsplash.com/800x600/?{}",
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl ImageProvider for UnsplashProvider {
    fn name(&self) -> &str {
        "unsplash"
    }

    async fn search(&self, query: &str) -> Result<Option<String>, ImageResolutionError> {
        let url = Self::url(query);
        let response = self.client.head(&url).send().await?;
        if !response.status().is_success() {
            return Err(ImageResolutionError::Status(response.status().as_u16()));
        }
        Ok(Some(url))
    }
}
