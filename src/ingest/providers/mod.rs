// src/ingest/providers/mod.rs
pub mod twitter;

use anyhow::Result;

use crate::ingest::types::{PostProvider, SocialPost};

/// Provider serving a fixed set of posts. Used in tests and as a fallback
/// when no real provider is configured.
pub struct StaticPostProvider {
    posts: Vec<SocialPost>,
}

impl StaticPostProvider {
    pub fn new(posts: Vec<SocialPost>) -> Self {
        Self { posts }
    }

    pub fn empty() -> Self {
        Self { posts: Vec::new() }
    }
}

#[async_trait::async_trait]
impl PostProvider for StaticPostProvider {
    async fn fetch_mentions(&self, _handle: &str, max_posts: usize) -> Result<Vec<SocialPost>> {
        Ok(self.posts.iter().take(max_posts).cloned().collect())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
