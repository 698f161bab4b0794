//! storage.rs — bounded in-memory log of analysis results.
//!
//! This is the persistence collaborator boundary: the engine itself never
//! writes here, the HTTP layer does. Entries carry the exact shape the
//! original backing store used: text, sentiment, confidence, timestamp.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::analyze::classify::{AnalysisResult, Sentiment};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SentimentEntry {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SentimentStore {
    inner: Mutex<Vec<SentimentEntry>>,
    cap: usize,
}

impl SentimentStore {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::with_capacity(cap.min(10_000))),
            cap: cap.min(10_000),
        }
    }

    pub fn record(&self, text: &str, result: &AnalysisResult) {
        let entry = SentimentEntry {
            text: text.to_string(),
            sentiment: result.sentiment,
            confidence: result.confidence,
            timestamp: Utc::now(),
        };

        let mut v = self.inner.lock().expect("store mutex poisoned");
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<SentimentEntry> {
        let v = self.inner.lock().expect("store mutex poisoned");
        let len = v.len();
        let start = len.saturating_sub(n);
        v[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
