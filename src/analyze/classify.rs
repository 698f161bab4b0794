//! Label assignment, confidence model and explanation rendering.

use serde::{Deserialize, Serialize};

use crate::analyze::scoring::ScoringTally;

/// Confidence never exceeds this, whatever the boosts add up to.
pub const CONFIDENCE_CAP: f64 = 0.9;
/// The scored-token ratio alone can contribute at most this much.
const SCORED_RATIO_CAP: f64 = 0.8;
/// Divisor floor for score normalization. Raw totals below this magnitude
/// are scaled against the floor rather than shrunk proportionally, so a raw
/// total of 2 normalizes to 0.667, not to some tiny value. Empirical; keep.
const NORMALIZATION_FLOOR: f64 = 3.0;
const POSITIVE_CUTOFF: f64 = 0.15;
const NEGATIVE_CUTOFF: f64 = -0.15;

/// Three-way sentiment label. Serialized to the exact lowercase strings the
/// downstream comparison and charting code keys off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final result of one analysis. Immutable once returned; the field names
/// and label strings are a stable contract with downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: f64,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub explanation: String,
}

impl AnalysisResult {
    /// Fixed default for empty or missing input.
    pub fn no_text() -> Self {
        Self {
            score: 0.0,
            sentiment: Sentiment::Neutral,
            confidence: 0.5,
            explanation: "No text provided for analysis.".to_string(),
        }
    }
}

/// Turn a scoring tally into the final result. `total_token_count` is the
/// number of word tokens in the analyzed text (scored or not).
pub fn classify(tally: &ScoringTally, total_token_count: usize) -> AnalysisResult {
    let ratio = |count: usize| {
        if total_token_count == 0 {
            0.0
        } else {
            count as f64 / total_token_count as f64
        }
    };

    let mut confidence = ratio(tally.scored_word_count).min(SCORED_RATIO_CAP);
    if tally.strong_indicator_count > 0 {
        confidence = (confidence + 0.2).min(CONFIDENCE_CAP);
    }
    if tally.scored_word_count >= 2 {
        confidence = (confidence + 0.1).min(CONFIDENCE_CAP);
    }
    if tally.intensifier_count > 0 {
        confidence = (confidence + 0.1).min(CONFIDENCE_CAP);
    }
    if tally.neutral_word_count > 0 && tally.total_score == 0.0 {
        confidence = (confidence + ratio(tally.neutral_word_count) * 0.3).min(CONFIDENCE_CAP);
    }

    let score = tally.total_score / tally.total_score.abs().max(NORMALIZATION_FLOOR);

    let sentiment = if score > POSITIVE_CUTOFF {
        Sentiment::Positive
    } else if score < NEGATIVE_CUTOFF {
        Sentiment::Negative
    } else {
        if tally.neutral_word_count > 0 && tally.total_score.abs() < 0.5 {
            confidence = (confidence + 0.2).min(CONFIDENCE_CAP);
        }
        Sentiment::Neutral
    };

    AnalysisResult {
        score,
        sentiment,
        confidence: round2(confidence),
        explanation: render_explanation(tally, sentiment),
    }
}

fn render_explanation(tally: &ScoringTally, sentiment: Sentiment) -> String {
    let matched = tally.matched_terms.len();
    if matched == 0 {
        return "No clear sentiment indicators were found in the text.".to_string();
    }

    if sentiment == Sentiment::Neutral {
        return format!(
            "Found {} neutral descriptors and {} sentiment indicators, \
             resulting in a balanced or neutral sentiment.",
            tally.neutral_word_count,
            matched - tally.neutral_word_count
        );
    }

    let mut out = format!("Found {matched} sentiment indicators");
    if tally.strong_indicator_count > 0 {
        out.push_str(&format!(
            " including {} strong indicators",
            tally.strong_indicator_count
        ));
    }
    out.push('.');
    if tally.intensifier_count > 0 {
        out.push_str(&format!(
            " Detected {} intensity modifiers.",
            tally.intensifier_count
        ));
    }
    out.push_str(&format!(" The text expresses a {sentiment} sentiment."));
    out
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
