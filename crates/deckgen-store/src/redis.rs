//! Redis over the Upstash REST protocol.

use crate::StoreError;
use crate::backend::KeyValueStore;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Remote store speaking Upstash's REST API with a bearer token.
pub struct RedisRestStore {
    client: reqwest::Client,
    url: String,
    token: String,
}

#[derive(Deserialize)]
struct Reply<T> {
    result: Option<T>,
    error: Option<String>,
}

impl RedisRestStore {
    pub fn new(
        url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn command_url(&self, command: &str, arg: &str) -> String {
        format!("{}/{command}/{}", self.url, urlencoding::encode(arg))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>, StoreError> {
        let response = request
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        let reply: Reply<T> = match serde_json::from_str(&text) {
            Ok(reply) => reply,
            Err(_) if !status.is_success() => {
                return Err(StoreError::Remote {
                    status: status.as_u16(),
                    message: text.chars().take(200).collect(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        if let Some(message) = reply.error {
            return Err(StoreError::Remote {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(StoreError::Remote {
                status: status.as_u16(),
                message: status.to_string(),
            });
        }
        Ok(reply.result)
    }
}

#[async_trait]
impl KeyValueStore for RedisRestStore {
    fn name(&self) -> &str {
        "redis"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}/ping", self.url);
        self.send::<String>(self.client.get(url)).await?;
        Ok(())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        debug!(key, bytes = value.len(), "redis set");
        let request = self
            .client
            .post(self.command_url("set", key))
            .body(value.to_string());
        self.send::<String>(request).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.send(self.client.get(self.command_url("get", key)))
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.send::<i64>(self.client.get(self.command_url("del", key)))
            .await?;
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let pattern = format!("{prefix}*");
        let keys: Option<Vec<String>> = self
            .send(self.client.get(self.command_url("keys", &pattern)))
            .await?;
        Ok(keys.unwrap_or_default())
    }
}
