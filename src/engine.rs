//! # Sentiment Engine
//! Pure, testable facade over tokenizer, lexicon and classifier.
//! No I/O; given the same text and lexicon it returns bit-identical results,
//! so it can be shared freely across concurrent requests.

use std::sync::Arc;

use crate::analyze::classify::{classify, AnalysisResult};
use crate::analyze::scoring::score;
use crate::lexicon::Lexicon;
use crate::tokenize::tokenize;

#[derive(Debug, Clone)]
pub struct SentimentEngine {
    lexicon: Arc<Lexicon>,
}

impl SentimentEngine {
    /// Engine over an explicitly constructed lexicon. Multiple engines with
    /// different lexicons (e.g. per locale) can coexist in one process.
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Engine over the lexicon shipped with the crate.
    pub fn with_builtin_lexicon() -> Self {
        Self::new(Arc::new(Lexicon::builtin()))
    }

    /// Analyze one text. Total for all inputs: empty input short-circuits to
    /// the fixed neutral default, everything else runs the full pipeline.
    pub fn analyze(&self, text: &str) -> AnalysisResult {
        if text.is_empty() {
            return AnalysisResult::no_text();
        }
        let tokens = tokenize(text);
        let tally = score(&self.lexicon, &tokens, text);
        classify(&tally, tokens.len())
    }

    /// Missing input maps to the same default as empty text.
    pub fn analyze_opt(&self, text: Option<&str>) -> AnalysisResult {
        match text {
            Some(t) => self.analyze(t),
            None => AnalysisResult::no_text(),
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }
}
