// tests/thresholds.rs
//
// Bounds and boundary behavior: confidence stays in [0, 0.9], scores stay
// finite, labels use strict cutoffs, and repeated analysis never drifts.

use sentify::analyze::classify::classify;
use sentify::analyze::scoring::ScoringTally;
use sentify::{Sentiment, SentimentEngine};

const SAMPLES: &[&str] = &[
    "",
    "   ",
    "!!! ??? ...",
    "no response",
    "not good",
    "never bad",
    "very very very good",
    "so so",
    "best service ever",
    "worst service ever",
    "quite",
    "somewhat",
    "great product :)",
    ":):):)",
    "😭😭😭😭",
    "🤬",
    "The new product exceeded all my expectations!",
    "Current weather conditions: Partly cloudy with light winds.",
    "Tesla introducing next generation superchargers with faster charging",
    "climate change is a significant threat to coral reef ecosystems worldwide",
    "absolutely nothing to report today",
    "couldn't be happier",
    "n't",
];

#[test]
fn confidence_is_bounded_and_score_is_finite_for_all_samples() {
    let engine = SentimentEngine::with_builtin_lexicon();
    for text in SAMPLES {
        let result = engine.analyze(text);
        assert!(
            (0.0..=0.9).contains(&result.confidence),
            "confidence {} out of bounds for {text:?}",
            result.confidence
        );
        assert!(result.score.is_finite(), "score not finite for {text:?}");
        assert!(!result.explanation.is_empty());
    }
}

#[test]
fn analysis_is_idempotent_for_all_samples() {
    let engine = SentimentEngine::with_builtin_lexicon();
    for text in SAMPLES {
        assert_eq!(engine.analyze(text), engine.analyze(text), "drift for {text:?}");
    }
}

fn label_for_total(total: f64) -> Sentiment {
    let tally = ScoringTally {
        total_score: total,
        scored_word_count: 1,
        matched_terms: vec!["x".into()],
        ..ScoringTally::default()
    };
    classify(&tally, 8).sentiment
}

#[test]
fn label_cutoffs_are_strict_at_plus_minus_point_fifteen() {
    // total 0.45 normalizes to exactly 0.15: inside the neutral band.
    assert_eq!(label_for_total(0.45), Sentiment::Neutral);
    assert_eq!(label_for_total(-0.45), Sentiment::Neutral);
    // One hundredth past the boundary tips the label.
    assert_eq!(label_for_total(0.46), Sentiment::Positive);
    assert_eq!(label_for_total(-0.46), Sentiment::Negative);
    // Large totals saturate at ±1.
    assert_eq!(label_for_total(42.0), Sentiment::Positive);
    assert_eq!(label_for_total(-42.0), Sentiment::Negative);
}

#[test]
fn normalization_does_not_shrink_small_totals_to_nothing() {
    let engine = SentimentEngine::with_builtin_lexicon();
    // "helpful" alone carries weight 2: normalized against the floor of 3,
    // not against its own magnitude.
    let result = engine.analyze("helpful");
    assert!((result.score - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(result.sentiment, Sentiment::Positive);
}
