//! Remote-first store with a local fallback tier.

use crate::backend::{KeyValueStore, LocalStore};
use crate::record::{
    ChatMessage, PresentationRecord, SessionRecord, SessionSummary, StoredMessage, chat_key,
    presentation_key, project, session_title,
};
use crate::redis::RedisRestStore;
use crate::{StoreError, StoreSettings};
use chrono::Utc;
use deckgen_core::Deck;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

const CHAT_PREFIX: &str = "chat:";

/// Session store that writes full records to a remote backend when it is
/// reachable and reduced records to a local backend otherwise.
///
/// Must be [`open`](HybridStore::open)ed before use.
pub struct HybridStore {
    remote: Option<Arc<dyn KeyValueStore>>,
    local: Arc<dyn KeyValueStore>,
    max_messages: usize,
    open: AtomicBool,
    remote_ready: AtomicBool,
}

impl HybridStore {
    /// A store with only a local tier.
    pub fn new(local: Arc<dyn KeyValueStore>) -> Self {
        Self {
            remote: None,
            local,
            max_messages: crate::MAX_LOCAL_MESSAGES,
            open: AtomicBool::new(false),
            remote_ready: AtomicBool::new(false),
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn KeyValueStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_max_messages(mut self, max: usize) -> Self {
        self.max_messages = max;
        self
    }

    /// Build from settings. The remote tier is configured only when both a
    /// URL and a token are present.
    pub fn from_settings(settings: &StoreSettings) -> Result<Self, StoreError> {
        let local = Arc::new(LocalStore::new(settings.local_directory()));
        let mut store = Self::new(local).with_max_messages(settings.max_messages);
        if let (Some(url), Some(token)) = (&settings.remote_url, &settings.remote_token)
            && !url.is_empty()
            && !token.is_empty()
        {
            let remote = RedisRestStore::new(
                url.as_str(),
                token.as_str(),
                Duration::from_secs(settings.timeout_secs),
            )?;
            store = store.with_remote(Arc::new(remote));
        }
        Ok(store)
    }

    /// Prepare the local tier and probe the remote one. An unreachable remote
    /// is disabled for the lifetime of this store.
    pub async fn open(&self) -> Result<(), StoreError> {
        self.local.ping().await?;
        if let Some(remote) = &self.remote {
            match remote.ping().await {
                Ok(()) => {
                    info!(backend = remote.name(), "remote session store connected");
                    self.remote_ready.store(true, Ordering::SeqCst);
                }
                Err(e) => {
                    warn!(backend = remote.name(), error = %e, "remote session store unavailable, using local storage");
                    self.remote_ready.store(false, Ordering::SeqCst);
                }
            }
        }
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        self.remote_ready.store(false, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn remote_ready(&self) -> bool {
        self.remote_ready.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }

    fn active_remote(&self) -> Option<&dyn KeyValueStore> {
        if self.remote_ready() {
            self.remote.as_deref()
        } else {
            None
        }
    }

    /// Replace the messages of a session.
    pub async fn save_messages(
        &self,
        session_id: &str,
        messages: &[ChatMessage],
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        let key = chat_key(session_id);
        if let Some(remote) = self.active_remote() {
            let record = SessionRecord::new(session_id, messages.to_vec());
            match write_record(remote, &key, &record).await {
                Ok(()) => return Ok(()),
                Err(e) => fell_back(remote, "save messages", &e),
            }
        }
        let mut record = SessionRecord::new(session_id, project(messages, self.max_messages));
        record.title = session_title(messages);
        write_record(self.local.as_ref(), &key, &record).await
    }

    /// Append messages to a session, creating it if needed.
    pub async fn append_messages(
        &self,
        session_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        let key = chat_key(session_id);
        if let Some(remote) = self.active_remote() {
            match append_full(remote, session_id, &key, &messages).await {
                Ok(()) => return Ok(()),
                Err(e) => fell_back(remote, "append messages", &e),
            }
        }
        let mut stored = read_record::<SessionRecord<StoredMessage>>(self.local.as_ref(), &key)
            .await?
            .map(|r| r.messages)
            .unwrap_or_default();
        stored.extend(messages.iter().map(StoredMessage::from));
        let skip = stored.len().saturating_sub(self.max_messages);
        stored.drain(..skip);
        write_record(
            self.local.as_ref(),
            &key,
            &SessionRecord::new(session_id, stored),
        )
        .await
    }

    /// Messages of a session in their local projection. Unknown sessions and
    /// backend failures yield an empty list.
    pub async fn load_messages(&self, session_id: &str) -> Vec<StoredMessage> {
        if self.ensure_open().is_err() {
            return Vec::new();
        }
        let key = chat_key(session_id);
        if let Some(remote) = self.active_remote() {
            match read_record::<SessionRecord<ChatMessage>>(remote, &key).await {
                Ok(Some(record)) => return project(&record.messages, usize::MAX),
                Ok(None) => {}
                Err(e) => fell_back(remote, "load messages", &e),
            }
        }
        match read_record::<SessionRecord<StoredMessage>>(self.local.as_ref(), &key).await {
            Ok(record) => record.map(|r| r.messages).unwrap_or_default(),
            Err(e) => {
                warn!(session = session_id, error = %e, "unreadable local session");
                Vec::new()
            }
        }
    }

    /// Persist the latest deck of a session.
    pub async fn save_presentation(&self, session_id: &str, deck: &Deck) -> Result<(), StoreError> {
        self.ensure_open()?;
        let key = presentation_key(session_id);
        let record = PresentationRecord {
            session_id: session_id.to_string(),
            last_modified: Utc::now(),
            deck: deck.clone(),
        };
        if let Some(remote) = self.active_remote() {
            match write_record(remote, &key, &record).await {
                Ok(()) => return Ok(()),
                Err(e) => fell_back(remote, "save presentation", &e),
            }
        }
        write_record(self.local.as_ref(), &key, &record).await
    }

    /// The latest deck of a session, if any tier has one.
    pub async fn load_presentation(&self, session_id: &str) -> Option<Deck> {
        self.ensure_open().ok()?;
        let key = presentation_key(session_id);
        if let Some(remote) = self.active_remote() {
            match read_record::<PresentationRecord>(remote, &key).await {
                Ok(Some(record)) => return Some(record.deck),
                Ok(None) => {}
                Err(e) => fell_back(remote, "load presentation", &e),
            }
        }
        match read_record::<PresentationRecord>(self.local.as_ref(), &key).await {
            Ok(record) => record.map(|r| r.deck),
            Err(e) => {
                warn!(session = session_id, error = %e, "unreadable local presentation");
                None
            }
        }
    }

    /// Remove a session from every tier.
    pub async fn delete_session(&self, session_id: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        let keys = [chat_key(session_id), presentation_key(session_id)];
        if let Some(remote) = self.active_remote() {
            for key in &keys {
                if let Err(e) = remote.delete(key).await {
                    fell_back(remote, "delete session", &e);
                }
            }
        }
        for key in &keys {
            self.local.delete(key).await?;
        }
        debug!(session = session_id, "session deleted");
        Ok(())
    }

    /// All sessions, most recently modified first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, StoreError> {
        self.ensure_open()?;
        if let Some(remote) = self.active_remote() {
            match summaries::<ChatMessage>(remote).await {
                Ok(list) => return Ok(list),
                Err(e) => fell_back(remote, "list sessions", &e),
            }
        }
        summaries::<StoredMessage>(self.local.as_ref()).await
    }
}

fn fell_back(remote: &dyn KeyValueStore, operation: &str, error: &StoreError) {
    warn!(backend = remote.name(), operation, error = %error, "remote store failed, using local storage");
}

async fn read_record<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

async fn write_record<T: Serialize + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    record: &T,
) -> Result<(), StoreError> {
    let text = serde_json::to_string(record)?;
    store.set(key, &text).await
}

async fn append_full(
    store: &dyn KeyValueStore,
    session_id: &str,
    key: &str,
    messages: &[ChatMessage],
) -> Result<(), StoreError> {
    let mut all = read_record::<SessionRecord<ChatMessage>>(store, key)
        .await?
        .map(|r| r.messages)
        .unwrap_or_default();
    all.extend_from_slice(messages);
    write_record(store, key, &SessionRecord::new(session_id, all)).await
}

async fn summaries<M>(store: &dyn KeyValueStore) -> Result<Vec<SessionSummary>, StoreError>
where
    M: DeserializeOwned + crate::record::MessageView,
{
    let mut list = Vec::new();
    for key in store.keys(CHAT_PREFIX).await? {
        match read_record::<SessionRecord<M>>(store, &key).await {
            Ok(Some(record)) => list.push(record.summary()),
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "skipping unreadable session"),
        }
    }
    list.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use async_trait::async_trait;
    use deckgen_core::builder::deck;

    /// Remote that fails every call.
    struct Down;

    #[async_trait]
    impl KeyValueStore for Down {
        fn name(&self) -> &str {
            "down"
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Remote {
                status: 503,
                message: "unavailable".into(),
            })
        }
        async fn set(&self, _: &str, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Closed)
        }
        async fn get(&self, _: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Closed)
        }
        async fn delete(&self, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Closed)
        }
        async fn keys(&self, _: &str) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Closed)
        }
    }

    /// Remote that answers pings and then fails writes.
    struct Flaky;

    #[async_trait]
    impl KeyValueStore for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }
        async fn set(&self, _: &str, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Remote {
                status: 500,
                message: "boom".into(),
            })
        }
        async fn get(&self, _: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
        async fn delete(&self, _: &str) -> Result<(), StoreError> {
            Ok(())
        }
        async fn keys(&self, _: &str) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn sample_deck() -> Deck {
        deck("Solar Energy", |d| d.slide("Intro", |s| s.bullet("Sun")))
    }

    #[tokio::test]
    async fn test_closed_store_rejects_writes() {
        let store = HybridStore::new(Arc::new(MemoryStore::new()));
        let err = store
            .save_messages("s1", &[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Closed));
        assert!(store.load_messages("s1").await.is_empty());

        store.open().await.unwrap();
        store.close();
        assert!(!store.is_open());
        assert!(matches!(
            store.list_sessions().await.unwrap_err(),
            StoreError::Closed
        ));
    }

    #[tokio::test]
    async fn test_local_tier_keeps_projection() {
        let local = Arc::new(MemoryStore::new());
        let store = HybridStore::new(local.clone());
        store.open().await.unwrap();

        let messages = vec![
            ChatMessage::user("Solar energy for kids"),
            ChatMessage::bot("Here you go", Some(sample_deck())),
        ];
        store.save_messages("s1", &messages).await.unwrap();

        let raw = local.get("chat:s1").await.unwrap().unwrap();
        assert!(raw.contains("\"hasSlideData\":true"));
        assert!(!raw.contains("\"slideData\""));

        let loaded = store.load_messages("s1").await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].slide_title.as_deref(), Some("Solar Energy"));
    }

    #[tokio::test]
    async fn test_unreachable_remote_is_disabled() {
        let local = Arc::new(MemoryStore::new());
        let store = HybridStore::new(local.clone()).with_remote(Arc::new(Down));
        store.open().await.unwrap();
        assert!(!store.remote_ready());

        store
            .append_messages("s1", vec![ChatMessage::user("a")])
            .await
            .unwrap();
        assert!(local.get("chat:s1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remote_write_failure_falls_back() {
        let local = Arc::new(MemoryStore::new());
        let store = HybridStore::new(local.clone()).with_remote(Arc::new(Flaky));
        store.open().await.unwrap();
        assert!(store.remote_ready());

        store.save_presentation("s1", &sample_deck()).await.unwrap();
        assert!(local.get("presentation:s1").await.unwrap().is_some());
        assert_eq!(
            store.load_presentation("s1").await.map(|d| d.title),
            Some("Solar Energy".to_string())
        );
    }

    #[tokio::test]
    async fn test_remote_keeps_full_messages() {
        let local = Arc::new(MemoryStore::new());
        let remote = Arc::new(MemoryStore::new());
        let store = HybridStore::new(local.clone()).with_remote(remote.clone());
        store.open().await.unwrap();

        store
            .append_messages("s1", vec![ChatMessage::user("topic")])
            .await
            .unwrap();
        store
            .append_messages(
                "s1",
                vec![ChatMessage::bot("done", Some(sample_deck()))],
            )
            .await
            .unwrap();

        let raw = remote.get("chat:s1").await.unwrap().unwrap();
        assert!(raw.contains("\"slideData\""));
        assert!(local.get("chat:s1").await.unwrap().is_none());
        assert_eq!(store.load_messages("s1").await.len(), 2);
    }

    #[tokio::test]
    async fn test_append_caps_local_history() {
        let store = HybridStore::new(Arc::new(MemoryStore::new())).with_max_messages(3);
        store.open().await.unwrap();
        for i in 0..5 {
            store
                .append_messages("s1", vec![ChatMessage::user(format!("m{i}"))])
                .await
                .unwrap();
        }
        let loaded = store.load_messages("s1").await;
        let contents: Vec<_> = loaded.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["m2", "m3", "m4"]);
    }

    #[tokio::test]
    async fn test_list_sorted_and_delete() {
        let store = HybridStore::new(Arc::new(MemoryStore::new()));
        store.open().await.unwrap();
        store
            .save_messages("old", &[ChatMessage::user("first")])
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        store
            .save_messages("new", &[ChatMessage::user("second")])
            .await
            .unwrap();

        let list = store.list_sessions().await.unwrap();
        let ids: Vec<_> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["new", "old"]);
        assert_eq!(list[1].title, "first");

        store.delete_session("old").await.unwrap();
        let list = store.list_sessions().await.unwrap();
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn test_file_backed_session() {
        let dir = tempfile::tempdir().unwrap();
        let settings = StoreSettings {
            directory: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let store = HybridStore::from_settings(&settings).unwrap();
        store.open().await.unwrap();
        store.save_presentation("s1", &sample_deck()).await.unwrap();
        store.close();

        let reopened = HybridStore::from_settings(&settings).unwrap();
        reopened.open().await.unwrap();
        assert!(reopened.load_presentation("s1").await.is_some());
        assert!(reopened.load_presentation("missing").await.is_none());
    }
}
