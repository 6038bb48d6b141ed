//! Persisted record shapes.

use chrono::{DateTime, Utc};
use deckgen_core::Deck;
use serde::{Deserialize, Serialize};

/// Most recent messages kept by the local projection.
pub const MAX_LOCAL_MESSAGES: usize = 1000;

const TITLE_PREVIEW_CHARS: usize = 50;

pub fn chat_key(session_id: &str) -> String {
    format!("chat:{session_id}")
}

pub fn presentation_key(session_id: &str) -> String {
    format!("presentation:{session_id}")
}

/// One chat turn, with the deck it produced if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub content: String,
    pub is_bot: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_data: Option<Deck>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_bot: false,
            timestamp: Utc::now(),
            slide_data: None,
        }
    }

    pub fn bot(content: impl Into<String>, deck: Option<Deck>) -> Self {
        Self {
            content: content.into(),
            is_bot: true,
            timestamp: Utc::now(),
            slide_data: deck,
        }
    }
}

/// Reduced message kept by the local store; drops the slide payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub content: String,
    pub is_bot: bool,
    pub timestamp: DateTime<Utc>,
    pub has_slide_data: bool,
    pub slide_title: Option<String>,
}

impl From<&ChatMessage> for StoredMessage {
    fn from(m: &ChatMessage) -> Self {
        Self {
            content: m.content.clone(),
            is_bot: m.is_bot,
            timestamp: m.timestamp,
            has_slide_data: m.slide_data.is_some(),
            slide_title: m.slide_data.as_ref().map(|d| d.title.clone()),
        }
    }
}

/// Project messages for local storage, keeping at most the latest `max`.
pub fn project(messages: &[ChatMessage], max: usize) -> Vec<StoredMessage> {
    let skip = messages.len().saturating_sub(max);
    messages[skip..].iter().map(StoredMessage::from).collect()
}

/// Common view over full and projected messages.
pub trait MessageView {
    fn content(&self) -> &str;
    fn is_bot(&self) -> bool;
    fn slide_title(&self) -> Option<&str>;
}

impl MessageView for ChatMessage {
    fn content(&self) -> &str {
        &self.content
    }
    fn is_bot(&self) -> bool {
        self.is_bot
    }
    fn slide_title(&self) -> Option<&str> {
        self.slide_data.as_ref().map(|d| d.title.as_str())
    }
}

impl MessageView for StoredMessage {
    fn content(&self) -> &str {
        &self.content
    }
    fn is_bot(&self) -> bool {
        self.is_bot
    }
    fn slide_title(&self) -> Option<&str> {
        self.slide_title.as_deref()
    }
}

/// Title shown for a session in listings.
pub fn session_title<M: MessageView>(messages: &[M]) -> String {
    if messages.is_empty() {
        return "New Chat".to_string();
    }
    if let Some(title) = messages
        .iter()
        .find_map(|m| m.slide_title())
        .filter(|t| !t.is_empty())
    {
        return title.to_string();
    }
    match messages.iter().find(|m| !m.is_bot()).map(|m| m.content()) {
        Some(content) if !content.is_empty() => {
            let mut preview: String = content.chars().take(TITLE_PREVIEW_CHARS).collect();
            if content.chars().count() > TITLE_PREVIEW_CHARS {
                preview.push_str("...");
            }
            preview
        }
        _ => "Untitled Chat".to_string(),
    }
}

/// Stored under `chat:{session_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord<M = ChatMessage> {
    pub session_id: String,
    pub title: String,
    pub last_modified: DateTime<Utc>,
    pub messages: Vec<M>,
}

impl<M: MessageView> SessionRecord<M> {
    pub fn new(session_id: impl Into<String>, messages: Vec<M>) -> Self {
        Self {
            session_id: session_id.into(),
            title: session_title(&messages),
            last_modified: Utc::now(),
            messages,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.session_id.clone(),
            title: self.title.clone(),
            last_modified: self.last_modified,
            message_count: self.messages.len(),
        }
    }
}

/// Stored under `presentation:{session_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRecord {
    pub session_id: String,
    pub last_modified: DateTime<Utc>,
    pub deck: Deck,
}

/// Listing entry for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub last_modified: DateTime<Utc>,
    pub message_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_core::builder::deck;

    #[test]
    fn test_title_rules() {
        let none: Vec<ChatMessage> = Vec::new();
        assert_eq!(session_title(&none), "New Chat");

        let long = "x".repeat(60);
        let msgs = vec![ChatMessage::bot("hi", None), ChatMessage::user(long.clone())];
        assert_eq!(session_title(&msgs), format!("{}...", &long[..50]));

        let short = vec![ChatMessage::user("Solar power")];
        assert_eq!(session_title(&short), "Solar power");

        let with_deck = vec![
            ChatMessage::user("make slides"),
            ChatMessage::bot("done", Some(deck("Solar 101", |d| d.slide("A", |s| s)))),
        ];
        assert_eq!(session_title(&with_deck), "Solar 101");

        let bots_only = vec![ChatMessage::bot("hello", None)];
        assert_eq!(session_title(&bots_only), "Untitled Chat");
    }

    #[test]
    fn test_projection_drops_payload_and_caps() {
        let d = deck("Deck", |d| d.slide("A", |s| s.bullet("b")));
        let mut msgs: Vec<ChatMessage> = (0..1005).map(|i| ChatMessage::user(format!("m{i}"))).collect();
        msgs.push(ChatMessage::bot("here", Some(d)));

        let projected = project(&msgs, MAX_LOCAL_MESSAGES);
        assert_eq!(projected.len(), MAX_LOCAL_MESSAGES);
        assert_eq!(projected[0].content, "m6");
        let last = projected.last().unwrap();
        assert!(last.has_slide_data);
        assert_eq!(last.slide_title.as_deref(), Some("Deck"));

        let json = serde_json::to_string(last).unwrap();
        assert!(json.contains("\"hasSlideData\":true"));
        assert!(!json.contains("slideData\":{"));
    }

    #[test]
    fn test_title_survives_projection() {
        let msgs = vec![
            ChatMessage::user("topic"),
            ChatMessage::bot("ok", Some(deck("Kept", |d| d.slide("A", |s| s)))),
        ];
        let projected = project(&msgs, MAX_LOCAL_MESSAGES);
        assert_eq!(session_title(&projected), session_title(&msgs));
    }
}
