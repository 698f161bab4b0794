// src/ingest/providers/twitter.rs
//! Twitter recent-search provider with a small in-memory TTL cache.
//!
//! Rate limiting is the dominant failure mode on the free tier, so a 429
//! answer falls back to stale cached data when any exists for the query.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::ingest::types::{PostProvider, SocialPost};

const SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";
/// The API rejects `max_results` outside 10..=100.
const MIN_RESULTS: usize = 10;
const MAX_RESULTS: usize = 100;

pub const ENV_BEARER_TOKEN: &str = "TWITTER_BEARER_TOKEN";

struct CacheSlot {
    fetched_at: Instant,
    posts: Vec<SocialPost>,
}

pub struct TwitterProvider {
    http: reqwest::Client,
    bearer: String,
    ttl: Duration,
    cache: Mutex<HashMap<String, CacheSlot>>,
}

impl TwitterProvider {
    pub fn new(bearer: String, ttl: Duration) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("sentify/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            bearer,
            ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Build from `TWITTER_BEARER_TOKEN`; fails when the token is absent.
    pub fn from_env(ttl: Duration) -> Result<Self> {
        let bearer = std::env::var(ENV_BEARER_TOKEN)
            .map_err(|_| anyhow!("{ENV_BEARER_TOKEN} is not set"))?;
        Ok(Self::new(bearer, ttl))
    }

    fn cache_get(&self, key: &str, allow_stale: bool) -> Option<Vec<SocialPost>> {
        let cache = self.cache.lock().expect("twitter cache mutex poisoned");
        cache.get(key).and_then(|slot| {
            if allow_stale || slot.fetched_at.elapsed() < self.ttl {
                Some(slot.posts.clone())
            } else {
                None
            }
        })
    }

    fn cache_put(&self, key: String, posts: Vec<SocialPost>) {
        let mut cache = self.cache.lock().expect("twitter cache mutex poisoned");
        cache.insert(
            key,
            CacheSlot {
                fetched_at: Instant::now(),
                posts,
            },
        );
    }
}

// --- wire shapes -----------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
    #[serde(default)]
    includes: Option<Includes>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    created_at: Option<DateTime<Utc>>,
    author_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    username: String,
}

fn to_posts(resp: SearchResponse) -> Vec<SocialPost> {
    let users = resp.includes.map(|i| i.users).unwrap_or_default();
    let username_of = |author_id: &Option<String>| {
        author_id.as_ref().and_then(|id| {
            users
                .iter()
                .find(|u| &u.id == id)
                .map(|u| u.username.clone())
        })
    };
    resp.data
        .into_iter()
        .map(|t| SocialPost {
            author_username: username_of(&t.author_id),
            id: t.id,
            text: t.text,
            created_at: t.created_at,
        })
        .collect()
}

#[async_trait::async_trait]
impl PostProvider for TwitterProvider {
    async fn fetch_mentions(&self, handle: &str, max_posts: usize) -> Result<Vec<SocialPost>> {
        let handle = handle.trim_start_matches('@');
        let cache_key = format!("{handle}-{max_posts}");

        if let Some(hit) = self.cache_get(&cache_key, false) {
            debug!(%handle, "twitter cache hit");
            return Ok(hit);
        }

        let query = format!("@{handle} -is:retweet -is:reply");
        let max_results = max_posts.clamp(MIN_RESULTS, MAX_RESULTS).to_string();
        let resp = self
            .http
            .get(SEARCH_URL)
            .bearer_auth(&self.bearer)
            .query(&[
                ("query", query.as_str()),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "created_at,author_id"),
                ("expansions", "author_id"),
                ("user.fields", "username"),
            ])
            .send()
            .await
            .context("twitter search request")?;

        match resp.status().as_u16() {
            200 => {
                let body: SearchResponse =
                    resp.json().await.context("parsing twitter search response")?;
                let posts: Vec<SocialPost> =
                    to_posts(body).into_iter().take(max_posts).collect();
                self.cache_put(cache_key, posts.clone());
                Ok(posts)
            }
            429 => {
                counter!("ingest_provider_errors_total").increment(1);
                if let Some(stale) = self.cache_get(&cache_key, true) {
                    warn!(%handle, "twitter rate limited; serving stale cache");
                    return Ok(stale);
                }
                let reset = resp
                    .headers()
                    .get("x-rate-limit-reset")
                    .and_then(|h| h.to_str().ok())
                    .unwrap_or("soon");
                Err(anyhow!(
                    "Twitter API rate limit exceeded; try again after {reset} \
                     (15-minute search window)"
                ))
            }
            401 => {
                counter!("ingest_provider_errors_total").increment(1);
                Err(anyhow!(
                    "Invalid Twitter API credentials; check {ENV_BEARER_TOKEN}"
                ))
            }
            status => {
                counter!("ingest_provider_errors_total").increment(1);
                Err(anyhow!("Twitter API error (status {status})"))
            }
        }
    }

    fn name(&self) -> &'static str {
        "twitter"
    }
}
