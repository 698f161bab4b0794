use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::AppendHeaders,
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::analyze::ai_adapter::{build_ai_client, AiAnalysis, DynAiClient};
use crate::analyze::classify::{AnalysisResult, Sentiment};
use crate::config::ServiceConfig;
use crate::engine::SentimentEngine;
use crate::ingest::providers::twitter::TwitterProvider;
use crate::ingest::providers::StaticPostProvider;
use crate::ingest::types::{PostProvider, SocialPost};
use crate::ingest::normalize_posts;
use crate::storage::SentimentStore;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SentimentEngine>,
    pub ai: DynAiClient,
    pub posts: Arc<dyn PostProvider>,
    pub store: Arc<SentimentStore>,
    pub default_max_posts: usize,
}

impl AppState {
    pub fn new(
        engine: Arc<SentimentEngine>,
        ai: DynAiClient,
        posts: Arc<dyn PostProvider>,
        store: Arc<SentimentStore>,
        default_max_posts: usize,
    ) -> Self {
        Self {
            engine,
            ai,
            posts,
            store,
            default_max_posts,
        }
    }

    /// Production wiring: builtin lexicon, AI client from `config/ai.json`,
    /// Twitter provider when a bearer token is configured.
    pub fn from_config(cfg: &ServiceConfig) -> Self {
        let ttl = Duration::from_secs(cfg.ingest_cache_ttl_secs);
        let posts: Arc<dyn PostProvider> = match TwitterProvider::from_env(ttl) {
            Ok(p) => Arc::new(p),
            Err(err) => {
                warn!(%err, "post retrieval disabled");
                Arc::new(StaticPostProvider::empty())
            }
        };
        Self::new(
            Arc::new(SentimentEngine::with_builtin_lexicon()),
            build_ai_client(),
            posts,
            Arc::new(SentimentStore::with_capacity(cfg.history_capacity)),
            cfg.default_max_posts,
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/analyze-posts", post(analyze_posts))
        .route("/history", get(history))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

fn bad_request(msg: &str) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: msg.to_string(),
        }),
    )
}

// --- POST /analyze ---------------------------------------------------------

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    // Absent/null text is legal and maps to the engine's fixed default.
    #[serde(default)]
    text: Option<String>,
}

/// The engine result stays top-level; the AI answer, when present, rides
/// alongside so the two can be compared in the UI.
#[derive(serde::Serialize)]
struct AnalyzeResp {
    #[serde(flatten)]
    local: AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    ai: Option<AiAnalysis>,
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> (AppendHeaders<[(&'static str, &'static str); 1]>, Json<AnalyzeResp>) {
    let text = body.text.as_deref().unwrap_or_default();
    let local = state.engine.analyze(text);
    counter!("sentify_analyses_total").increment(1);

    let ai = if text.is_empty() {
        None
    } else {
        state.store.record(text, &local);
        state.ai.analyze(text).await
    };
    if ai.is_some() {
        counter!("sentify_ai_hits_total").increment(1);
    }

    let used = if ai.is_some() { "1" } else { "0" };
    (
        AppendHeaders([("x-ai-used", used)]),
        Json(AnalyzeResp { local, ai }),
    )
}

// --- POST /analyze-posts ---------------------------------------------------

#[derive(serde::Deserialize)]
struct AnalyzePostsReq {
    handle: String,
    #[serde(default)]
    max_posts: Option<usize>,
}

#[derive(serde::Serialize)]
struct AnalyzedPost {
    #[serde(flatten)]
    post: SocialPost,
    analysis: AnalysisResult,
}

#[derive(serde::Serialize)]
struct Distribution {
    positive: f64,
    negative: f64,
    neutral: f64,
}

#[derive(serde::Serialize)]
struct AnalyzePostsResp {
    total_posts: usize,
    analyzed_posts: usize,
    sentiment_distribution: Distribution,
    posts: Vec<AnalyzedPost>,
}

async fn analyze_posts(
    State(state): State<AppState>,
    Json(body): Json<AnalyzePostsReq>,
) -> Result<Json<AnalyzePostsResp>, (StatusCode, Json<ErrorBody>)> {
    let handle = body.handle.trim().trim_start_matches('@');
    if handle.is_empty() {
        return Err(bad_request("Brand handle is required"));
    }
    let max_posts = body.max_posts.unwrap_or(state.default_max_posts);

    let raw = state
        .posts
        .fetch_mentions(handle, max_posts)
        .await
        .map_err(|err| {
            warn!(%err, provider = state.posts.name(), "post retrieval failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: err.to_string(),
                }),
            )
        })?;

    let total_posts = raw.len();
    let posts: Vec<AnalyzedPost> = normalize_posts(raw)
        .into_iter()
        .map(|post| {
            // Each post is analyzed independently; order carries no meaning.
            let analysis = state.engine.analyze(&post.text);
            counter!("sentify_analyses_total").increment(1);
            AnalyzedPost { post, analysis }
        })
        .collect();

    let analyzed_posts = posts.len();
    let share = |label: Sentiment| {
        if analyzed_posts == 0 {
            0.0
        } else {
            posts
                .iter()
                .filter(|p| p.analysis.sentiment == label)
                .count() as f64
                / analyzed_posts as f64
        }
    };

    Ok(Json(AnalyzePostsResp {
        total_posts,
        analyzed_posts,
        sentiment_distribution: Distribution {
            positive: share(Sentiment::Positive),
            negative: share(Sentiment::Negative),
            neutral: share(Sentiment::Neutral),
        },
        posts,
    }))
}

// --- GET /history ----------------------------------------------------------

#[derive(serde::Deserialize)]
struct HistoryParams {
    #[serde(default)]
    n: Option<usize>,
}

async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<Vec<crate::storage::SentimentEntry>> {
    Json(state.store.snapshot_last_n(params.n.unwrap_or(20)))
}
