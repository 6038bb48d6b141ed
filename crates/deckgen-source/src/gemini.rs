//! Google Generative Language (Gemini) content source.

use crate::{ContentSource, SourceSettings, prompt};
use async_trait::async_trait;
use deckgen_core::{ContentSourceError, Deck, StyleOptions};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Content source backed by the Gemini `generateContent` endpoint.
pub struct GeminiSource {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Standard Google API error envelope.
#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

impl GeminiSource {
    pub fn new(settings: &SourceSettings) -> Result<Self, ContentSourceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("deckgen/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ContentSourceError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
            model: settings.model.clone(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn complete(&self, prompt: &str) -> Result<String, ContentSourceError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ContentSourceError::MissingCredential)?;

        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };
        debug!(model = %self.model, prompt_len = prompt.len(), "requesting content");
        let response = self
            .client
            .post(self.url())
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ContentSourceError::Unavailable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ContentSourceError::Unavailable(e.to_string()))?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "content source rejected request");
            return Err(classify_error(status.as_u16(), &text));
        }

        extract_text(&text)
    }
}

/// Map a non-2xx response to the error taxonomy.
fn classify_error(status: u16, body: &str) -> ContentSourceError {
    if body.contains("API_KEY_INVALID") {
        return ContentSourceError::InvalidCredential;
    }
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(e) => e.error.message,
        Err(_) => body.chars().take(200).collect(),
    };
    ContentSourceError::Rejected { status, message }
}

fn extract_text(body: &str) -> Result<String, ContentSourceError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ContentSourceError::Unavailable(format!("unreadable response: {e}")))?;
    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ContentSourceError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl ContentSource for GeminiSource {
    async fn generate(
        &self,
        topic: &str,
        style: &StyleOptions,
    ) -> Result<String, ContentSourceError> {
        self.complete(&prompt::generation_prompt(topic, style)).await
    }

    async fn edit(
        &self,
        instruction: &str,
        current: &Deck,
        style: &StyleOptions,
    ) -> Result<String, ContentSourceError> {
        self.complete(&prompt::edit_prompt(instruction, current, style))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"title\":"},{"text":"\"x\"}"}]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), r#"{"title":"x"}"#);
    }

    #[test]
    fn test_extract_text_empty() {
        assert!(matches!(
            extract_text(r#"{"candidates":[]}"#),
            Err(ContentSourceError::EmptyResponse)
        ));
        assert!(matches!(
            extract_text("<html>"),
            Err(ContentSourceError::Unavailable(_))
        ));
    }

    #[test]
    fn test_classify_invalid_key() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#;
        assert!(matches!(
            classify_error(400, body),
            ContentSourceError::InvalidCredential
        ));
    }

    #[test]
    fn test_classify_other_rejection() {
        let body = r#"{"error":{"code":429,"message":"Resource exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        match classify_error(429, body) {
            ContentSourceError::Rejected { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Resource exhausted");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_key() {
        let source = GeminiSource::new(&SourceSettings::default()).unwrap();
        let err = source
            .generate("anything", &StyleOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ContentSourceError::MissingCredential));
    }

    #[test]
    fn test_url() {
        let source = GeminiSource::new(&SourceSettings::default()).unwrap();
        assert_eq!(
            source.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent"
        );
    }
}
