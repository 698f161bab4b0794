// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One raw social post as handed to the analysis pipeline.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct SocialPost {
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub author_username: Option<String>,
}

#[async_trait::async_trait]
pub trait PostProvider: Send + Sync {
    /// Fetch recent posts mentioning `handle` (without the leading `@`).
    async fn fetch_mentions(&self, handle: &str, max_posts: usize) -> Result<Vec<SocialPost>>;
    fn name(&self) -> &'static str;
}
