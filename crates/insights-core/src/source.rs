//! Load sources for the conversation store.
//!
//! A source yields the complete record set in one call; there is no paging
//! and no incremental fetch.

use crate::config::SourceConfig;
use crate::error::{InsightsError, Result};
use crate::types::Conversation;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Anything that can produce the full conversation set.
#[async_trait]
pub trait ConversationSource: Send + Sync {
    /// Short description used in log lines.
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<Vec<Conversation>>;
}

/// Fetches conversations with a single GET against a fixed endpoint.
pub struct HttpSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        match endpoint.scheme() {
            "http" | "https" => {}
            other => {
                return Err(InsightsError::Config(format!(
                    "Scheme '{}' is not allowed for the conversations endpoint (only http/https)",
                    other
                )));
            }
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ConversationSource for HttpSource {
    fn describe(&self) -> String {
        self.endpoint.to_string()
    }

    async fn fetch(&self) -> Result<Vec<Conversation>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await?
            .error_for_status()?;

        // Decode via serde_json so shape mismatches surface as Serialization errors.
        let body = response.bytes().await?;
        let conversations: Vec<Conversation> = serde_json::from_slice(&body)?;
        Ok(conversations)
    }
}

/// Reads conversations from a JSON array on disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConversationSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<Conversation>> {
        let contents = tokio::fs::read(&self.path).await?;
        let conversations: Vec<Conversation> = serde_json::from_slice(&contents)?;
        Ok(conversations)
    }
}
