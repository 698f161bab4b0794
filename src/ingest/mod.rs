// src/ingest/mod.rs
pub mod providers;
pub mod types;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::ingest::types::SocialPost;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_posts_total", "Posts fetched from providers.");
        describe_counter!("ingest_dropped_total", "Posts dropped as empty after normalization.");
        describe_counter!("ingest_provider_errors_total", "Provider fetch errors.");
    });
}

/// Normalize post text: decode HTML entities, strip tags, collapse
/// whitespace, cap the length.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode (tweets ship with &amp; and friends)
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 4) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Normalize a batch, dropping posts whose text collapses to nothing.
pub fn normalize_posts(raw: Vec<SocialPost>) -> Vec<SocialPost> {
    ensure_metrics_described();
    counter!("ingest_posts_total").increment(raw.len() as u64);

    let mut kept = Vec::with_capacity(raw.len());
    let mut dropped = 0usize;
    for mut post in raw {
        post.text = normalize_text(&post.text);
        if post.text.is_empty() {
            dropped += 1;
            continue;
        }
        kept.push(post);
    }
    counter!("ingest_dropped_total").increment(dropped as u64);
    kept
}
