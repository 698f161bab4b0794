//! Lexicon store: immutable term and emoticon weight tables.
//!
//! The shipped tables live in `lexicon/*.json` and are embedded at compile
//! time. Both files are ordered lists of `[key, weight]` pairs that preserve
//! the source lexicon ordering, including its duplicate keys; the builder
//! folds duplicates with a last-declaration-wins policy so the merged result
//! is deterministic. A `Lexicon` is built once and shared read-only (e.g.
//! behind an `Arc`) across any number of concurrent analyses.

use std::collections::HashMap;

use tracing::{debug, warn};

static TERMS_JSON: &str = include_str!("../lexicon/terms.json");
static EMOTICONS_JSON: &str = include_str!("../lexicon/emoticons.json");

/// Word matches at or above this absolute weight count as strong indicators.
pub const STRONG_WORD_WEIGHT: f64 = 3.0;
/// Emoticon matches at or above this absolute weight count as strong indicators.
pub const STRONG_EMOTICON_WEIGHT: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct Lexicon {
    word_weights: HashMap<String, f64>,
    phrase_weights: HashMap<String, f64>,
    // Ordered so the emoticon scan (and therefore matched-term order) is
    // deterministic across runs.
    emoticon_weights: Vec<(String, f64)>,
}

impl Lexicon {
    /// Build the lexicon shipped with the crate.
    pub fn builtin() -> Self {
        let terms: Vec<(String, f64)> =
            serde_json::from_str(TERMS_JSON).expect("valid embedded term lexicon");
        let emoticons: Vec<(String, f64)> =
            serde_json::from_str(EMOTICONS_JSON).expect("valid embedded emoticon lexicon");
        Self::from_tables(terms, emoticons)
    }

    /// Build a lexicon from explicit tables (e.g. a per-locale variant).
    ///
    /// Duplicate keys are folded last-wins. Term keys are lower-cased and
    /// split by token count: one token goes to the word map, two tokens to
    /// the phrase map. Longer keys are unreachable under bigram-priority
    /// lookup and are dropped with a warning.
    pub fn from_tables(terms: Vec<(String, f64)>, emoticons: Vec<(String, f64)>) -> Self {
        let mut word_weights = HashMap::new();
        let mut phrase_weights = HashMap::new();
        let mut overrides = 0usize;

        for (key, weight) in terms {
            let key = key.to_lowercase();
            let map = match key.split_whitespace().count() {
                1 => &mut word_weights,
                2 => &mut phrase_weights,
                n => {
                    warn!(%key, tokens = n, "dropping lexicon key longer than two tokens");
                    continue;
                }
            };
            if map.insert(key, weight).is_some() {
                overrides += 1;
            }
        }

        // Emoticons keep first-seen scan order; a re-declared glyph only
        // updates the weight. Scanning a glyph twice would double-count it.
        let mut emoticon_weights: Vec<(String, f64)> = Vec::with_capacity(emoticons.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (glyph, weight) in emoticons {
            match seen.get(&glyph) {
                Some(&i) => {
                    emoticon_weights[i].1 = weight;
                    overrides += 1;
                }
                None => {
                    seen.insert(glyph.clone(), emoticon_weights.len());
                    emoticon_weights.push((glyph, weight));
                }
            }
        }

        if overrides > 0 {
            debug!(overrides, "lexicon duplicate keys folded (last declaration wins)");
        }

        Self {
            word_weights,
            phrase_weights,
            emoticon_weights,
        }
    }

    /// Weight for a single-word key, if present.
    pub fn word(&self, token: &str) -> Option<f64> {
        self.word_weights.get(token).copied()
    }

    /// Weight for a two-word key (`"prev cur"`), if present.
    pub fn phrase(&self, bigram: &str) -> Option<f64> {
        self.phrase_weights.get(bigram).copied()
    }

    /// The emoticon table in deterministic scan order.
    pub fn emoticons(&self) -> &[(String, f64)] {
        &self.emoticon_weights
    }

    pub fn word_count(&self) -> usize {
        self.word_weights.len()
    }

    pub fn phrase_count(&self) -> usize {
        self.phrase_weights.len()
    }

    pub fn emoticon_count(&self) -> usize {
        self.emoticon_weights.len()
    }
}
