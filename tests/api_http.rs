// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /analyze (result shape + X-AI-Used header + missing-text default)
// - POST /analyze-posts (per-post results + distribution + validation)
// - GET /history

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use sentify::analyze::ai_adapter::DisabledClient;
use sentify::api::{self, AppState};
use sentify::engine::SentimentEngine;
use sentify::ingest::providers::StaticPostProvider;
use sentify::ingest::types::SocialPost;
use sentify::storage::SentimentStore;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn post(id: &str, text: &str) -> SocialPost {
    SocialPost {
        id: id.to_string(),
        text: text.to_string(),
        created_at: None,
        author_username: Some("tester".to_string()),
    }
}

/// Build the same Router the binary uses, with a fixture post provider and
/// the AI adapter disabled.
fn test_router(posts: Vec<SocialPost>) -> Router {
    let state = AppState::new(
        Arc::new(SentimentEngine::with_builtin_lexicon()),
        Arc::new(DisabledClient),
        Arc::new(StaticPostProvider::new(posts)),
        Arc::new(SentimentStore::with_capacity(100)),
        10,
    );
    api::router(state)
}

async fn json_body(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json body")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router(vec![]);

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn api_analyze_returns_contract_fields_and_ai_header() {
    let app = test_router(vec![]);

    let payload = json!({ "text": "The support team was really helpful!" });
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /analyze");

    let resp = app.oneshot(req).await.expect("oneshot /analyze");
    assert!(resp.status().is_success(), "got {}", resp.status());

    // The AI adapter is disabled here, so the header must say "0".
    let used = resp
        .headers()
        .get("x-ai-used")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    assert_eq!(used, "0");

    let v = json_body(resp).await;
    // Contract checks for UI consumers
    assert!(v.get("score").is_some(), "missing 'score'");
    assert!(v.get("sentiment").is_some(), "missing 'sentiment'");
    assert!(v.get("confidence").is_some(), "missing 'confidence'");
    assert!(v.get("explanation").is_some(), "missing 'explanation'");
    assert_eq!(v["sentiment"], json!("positive"));
    assert!(v.get("ai").is_none(), "'ai' must be absent when unused");
}

#[tokio::test]
async fn api_analyze_without_text_returns_the_default_result() {
    let app = test_router(vec![]);

    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .expect("build POST /analyze");

    let resp = app.oneshot(req).await.expect("oneshot /analyze");
    assert!(resp.status().is_success());

    let v = json_body(resp).await;
    assert_eq!(v["sentiment"], json!("neutral"));
    assert_eq!(v["confidence"], json!(0.5));
    assert_eq!(v["explanation"], json!("No text provided for analysis."));
}

#[tokio::test]
async fn api_analyze_posts_reports_distribution() {
    let app = test_router(vec![
        post("1", "Absolutely love the new update! :)"),
        post("2", "The outage today was frustrating and unacceptable."),
        post("3", "Current weather conditions over the data center: cloudy."),
    ]);

    let payload = json!({ "handle": "@acme" });
    let req = Request::builder()
        .method("POST")
        .uri("/analyze-posts")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /analyze-posts");

    let resp = app.oneshot(req).await.expect("oneshot /analyze-posts");
    assert!(resp.status().is_success(), "got {}", resp.status());

    let v = json_body(resp).await;
    assert_eq!(v["total_posts"], json!(3));
    assert_eq!(v["analyzed_posts"], json!(3));

    let dist = &v["sentiment_distribution"];
    let sum = dist["positive"].as_f64().unwrap()
        + dist["negative"].as_f64().unwrap()
        + dist["neutral"].as_f64().unwrap();
    assert!((sum - 1.0).abs() < 1e-9, "distribution should sum to 1, got {sum}");
    assert!(dist["positive"].as_f64().unwrap() > 0.0);
    assert!(dist["negative"].as_f64().unwrap() > 0.0);

    let posts = v["posts"].as_array().expect("posts array");
    assert_eq!(posts.len(), 3);
    assert!(posts[0].get("id").is_some());
    assert!(posts[0]["analysis"].get("sentiment").is_some());
}

#[tokio::test]
async fn api_analyze_posts_requires_a_handle() {
    let app = test_router(vec![]);

    let payload = json!({ "handle": "  " });
    let req = Request::builder()
        .method("POST")
        .uri("/analyze-posts")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /analyze-posts");

    let resp = app.oneshot(req).await.expect("oneshot /analyze-posts");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let v = json_body(resp).await;
    assert_eq!(v["error"], json!("Brand handle is required"));
}

#[tokio::test]
async fn api_history_reflects_recorded_analyses() {
    let app = test_router(vec![]);

    let payload = json!({ "text": "great service" });
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /analyze");
    let resp = app.clone().oneshot(req).await.expect("oneshot /analyze");
    assert!(resp.status().is_success());

    let req = Request::builder()
        .method("GET")
        .uri("/history?n=5")
        .body(Body::empty())
        .expect("build GET /history");
    let resp = app.oneshot(req).await.expect("oneshot /history");
    assert!(resp.status().is_success());

    let v = json_body(resp).await;
    let rows = v.as_array().expect("history array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["text"], json!("great service"));
    assert_eq!(rows[0]["sentiment"], json!("positive"));
    assert!(rows[0].get("timestamp").is_some());
}
