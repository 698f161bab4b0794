//! Remote AI classifier adapter: provider abstraction + file cache + daily limit.
//!
//! The remote classifier returns the same {sentiment, confidence, explanation}
//! shape as the local engine so both can be compared side by side. Every
//! failure mode (network, quota, malformed response) collapses to `None` and
//! callers fall back to the local result; the adapter never fails a request.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analyze::classify::Sentiment;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Result returned by AI providers. Structurally identical to the local
/// engine's result minus the normalized score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiAnalysis {
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub explanation: String,
}

/// Trait object used by handlers/tests.
pub trait AiClient: Send + Sync {
    /// Classify `text`, or `None` when the adapter is disabled, limited, or
    /// the provider response was unusable.
    fn analyze<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiAnalysis>> + Send + 'a>>;
    /// Provider name for diagnostics/headers.
    fn provider_name(&self) -> &'static str;
}

/// Config loaded from `config/ai.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    /// Currently only "gemini" is implemented.
    pub provider: Option<String>,
    /// Optional per-day limit on real API calls; defaults to 50 if absent.
    pub daily_limit: Option<u32>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: None,
            daily_limit: Some(50),
        }
    }
}

/// Load config from `config/ai.json`. If reading/parsing fails, returns
/// `AiConfig::default()` (adapter disabled).
pub fn load_ai_config() -> AiConfig {
    let path = Path::new("config/ai.json");
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
        Err(_) => AiConfig::default(),
    }
}

/// Convenient alias used by callers.
pub type DynAiClient = Arc<dyn AiClient>;

/// Reads config from disk and builds a client.
pub fn build_ai_client() -> DynAiClient {
    let cfg = load_ai_config();
    build_client_from_config(&cfg)
}

/// Factory: build a client according to config and environment variables.
///
/// * If `AI_TEST_MODE=mock`, returns a deterministic mock client.
/// * Else if `config.enabled == false`, returns a disabled client.
/// * Else builds the real provider (Gemini) wrapped with caching + daily limit.
pub fn build_client_from_config(config: &AiConfig) -> DynAiClient {
    if std::env::var("AI_TEST_MODE").map(|v| v == "mock").unwrap_or(false) {
        let mock = MockProvider {
            fixed: AiAnalysis {
                sentiment: Sentiment::Neutral,
                confidence: 0.5,
                explanation: "Neutral hint (mock)".to_string(),
            },
        };
        let client =
            CachingClient::new(mock, default_cache_dir(), config.daily_limit.unwrap_or(50));
        return Arc::new(client);
    }

    if !config.enabled {
        return Arc::new(DisabledClient);
    }

    match config.provider.as_deref() {
        Some("gemini") => {
            let provider = GeminiProvider::new(None);
            let client = CachingClient::new(
                provider,
                default_cache_dir(),
                config.daily_limit.unwrap_or(50),
            );
            Arc::new(client)
        }
        other => {
            warn!(provider = ?other, "unknown AI provider in config; adapter disabled");
            Arc::new(DisabledClient)
        }
    }
}

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider: does a *real* remote call. Separated so the same
/// caching wrapper serves production and tests.
pub trait Provider: Send + Sync + 'static {
    fn fetch<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiAnalysis>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

/// Gemini provider (generateContent API). Requires `GEMINI_API_KEY`.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    /// `model_override`: pass Some("gemini-2.0-flash") to override; that is
    /// also the default.
    pub fn new(model_override: Option<&str>) -> Self {
        let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        let http = reqwest::Client::builder()
            .user_agent("sentify/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        let model = model_override.unwrap_or("gemini-2.0-flash").to_string();
        Self {
            http,
            api_key,
            model,
        }
    }

    fn prompt(text: &str) -> String {
        format!(
            "You are a social media sentiment analysis expert. Analyze the following \
             social media post about a brand and respond with ONLY a JSON object in this \
             exact format:\n\n\
             {{\n\
             \x20   \"sentiment\": \"positive\" | \"negative\" | \"neutral\",\n\
             \x20   \"confidence\": <a number between 0 and 1>,\n\
             \x20   \"explanation\": \"<brief explanation focusing on brand perception and customer sentiment>\"\n\
             }}\n\n\
             Consider these aspects in your analysis:\n\
             - Customer satisfaction/dissatisfaction\n\
             - Service quality mentions\n\
             - Product feedback\n\
             - Brand reputation impact\n\
             - Emotional tone\n\n\
             Social media post to analyze: \"{text}\""
        )
    }
}

impl Provider for GeminiProvider {
    fn fetch<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiAnalysis>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Part<'a> {
                text: &'a str,
            }
            #[derive(Serialize)]
            struct Content<'a> {
                parts: Vec<Part<'a>>,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                contents: Vec<Content<'a>>,
            }
            #[derive(Deserialize)]
            struct Resp {
                candidates: Vec<Candidate>,
            }
            #[derive(Deserialize)]
            struct Candidate {
                content: CandidateContent,
            }
            #[derive(Deserialize)]
            struct CandidateContent {
                parts: Vec<CandidatePart>,
            }
            #[derive(Deserialize)]
            struct CandidatePart {
                text: String,
            }

            let prompt = Self::prompt(text);
            let req = Req {
                contents: vec![Content {
                    parts: vec![Part { text: &prompt }],
                }],
            };

            let url = format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                self.model
            );
            let resp = self
                .http
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&req)
                .send()
                .await
                .ok()?;

            if !resp.status().is_success() {
                warn!(status = %resp.status(), "gemini request failed");
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            let raw = body
                .candidates
                .first()
                .and_then(|c| c.content.parts.first())
                .map(|p| p.text.as_str())
                .unwrap_or("");
            parse_ai_response(raw)
        })
    }
    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Returns `None` always; used when AI is disabled.
pub struct DisabledClient;

impl AiClient for DisabledClient {
    fn analyze<'a>(
        &'a self,
        _text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiAnalysis>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Simple mock provider for tests/local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: AiAnalysis,
}

impl Provider for MockProvider {
    fn fetch<'a>(
        &'a self,
        _text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiAnalysis>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Response parsing / validation
// ------------------------------------------------------------

// Models wrap the JSON in prose or code fences more often than not; take the
// outermost brace-to-brace slice before parsing.
static JSON_BLOB_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("json blob regex"));

/// Extract and validate the `{sentiment, confidence, explanation}` object
/// from a raw model reply. Anything malformed yields `None`.
pub fn parse_ai_response(raw: &str) -> Option<AiAnalysis> {
    let blob = JSON_BLOB_RE.find(raw).map(|m| m.as_str()).unwrap_or(raw);
    let parsed: AiAnalysis = match serde_json::from_str(blob) {
        Ok(v) => v,
        Err(err) => {
            debug!(%err, "discarding unparseable AI reply");
            return None;
        }
    };
    if !(0.0..=1.0).contains(&parsed.confidence) {
        debug!(confidence = parsed.confidence, "discarding AI reply with out-of-range confidence");
        return None;
    }
    if parsed.explanation.trim().is_empty() {
        return None;
    }
    Some(parsed)
}

// ------------------------------------------------------------
// Caching client wrapper (file cache + daily limit)
// ------------------------------------------------------------

/// File names and counter state are guarded by a `Mutex` to keep it simple.
pub struct CachingClient<P: Provider> {
    inner: P,
    cache_dir: PathBuf,
    daily_limit_max: u32,
    counter: Arc<Mutex<DailyCounter>>,
}

impl<P: Provider> CachingClient<P> {
    pub fn new(inner: P, cache_dir: PathBuf, daily_limit_max: u32) -> Self {
        let _ = fs::create_dir_all(&cache_dir); // best-effort
        let counter = Arc::new(Mutex::new(
            load_daily_counter(&cache_dir).unwrap_or_default(),
        ));
        Self {
            inner,
            cache_dir,
            daily_limit_max,
            counter,
        }
    }

    async fn analyze_impl(&self, text: &str) -> Option<AiAnalysis> {
        // 1) Check daily limit (real API calls only increment; cache hits do not).
        {
            let mut g = self.counter.lock().expect("poisoned counter");
            if g.is_expired() {
                g.reset_to_today();
                let _ = save_daily_counter(&self.cache_dir, &g);
            }
            if g.count >= self.daily_limit_max {
                return None;
            }
        }

        // 2) Cache lookup.
        let key = cache_key(text);
        if let Some(hit) = read_cache_file(&self.cache_dir, &key) {
            return Some(hit);
        }

        // 3) Real call.
        if let Some(fresh) = self.inner.fetch(text).await {
            let _ = write_cache_file(&self.cache_dir, &key, &fresh);
            let mut g = self.counter.lock().expect("poisoned counter");
            g.count = g.count.saturating_add(1);
            let _ = save_daily_counter(&self.cache_dir, &g);
            return Some(fresh);
        }
        None
    }
}

impl<P: Provider> AiClient for CachingClient<P> {
    fn analyze<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiAnalysis>> + Send + 'a>> {
        Box::pin(self.analyze_impl(text))
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

// ------------------------------------------------------------
// File cache helpers
// ------------------------------------------------------------

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache/ai")
}

fn cache_key(text: &str) -> String {
    // DefaultHasher is sufficient for cache keys; no crypto needed here.
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn cache_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

fn read_cache_file(dir: &Path, key: &str) -> Option<AiAnalysis> {
    let path = cache_path(dir, key);
    let mut file = fs::File::open(path).ok()?;
    let mut buf = String::new();
    file.read_to_string(&mut buf).ok()?;
    serde_json::from_str(&buf).ok()
}

fn write_cache_file(dir: &Path, key: &str, value: &AiAnalysis) -> io::Result<()> {
    let path = cache_path(dir, key);
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
    let mut f = fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    fs::rename(tmp, path)?;
    Ok(())
}

// ------------------------------------------------------------
// Daily counter helpers
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DailyCounter {
    date: String,
    count: u32,
}
impl Default for DailyCounter {
    fn default() -> Self {
        Self {
            date: today(),
            count: 0,
        }
    }
}
impl DailyCounter {
    fn is_expired(&self) -> bool {
        self.date != today()
    }
    fn reset_to_today(&mut self) {
        self.date = today();
        self.count = 0;
    }
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn counter_path(dir: &Path) -> PathBuf {
    dir.join("daily_count.json")
}

fn load_daily_counter(dir: &Path) -> io::Result<DailyCounter> {
    let p = counter_path(dir);
    let s = fs::read_to_string(p)?;
    let dc: DailyCounter =
        serde_json::from_str(&s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(dc)
}

fn save_daily_counter(dir: &Path, dc: &DailyCounter) -> io::Result<()> {
    let p = counter_path(dir);
    let tmp = p.with_extension("json.tmp");
    let s = serde_json::to_string(dc).unwrap_or_else(|_| "{}".to_string());
    let mut f = fs::File::create(&tmp)?;
    f.write_all(s.as_bytes())?;
    fs::rename(tmp, p)?;
    Ok(())
}
