//! Token walk and emoticon scan producing the per-call scoring tally.
//!
//! Phrase lookups take priority: a bigram hit ending at the current token is
//! recorded as one matched term and suppresses the unigram probe for that
//! token. Unigram hits are adjusted by the fixed intensifier and negation
//! sets keyed off the previous token. Emoticons are scanned over the raw,
//! untokenized text so punctuation-only glyphs still score.

use crate::lexicon::{Lexicon, STRONG_EMOTICON_WEIGHT, STRONG_WORD_WEIGHT};

const INTENSIFIERS: &[&str] = &[
    "very",
    "really",
    "extremely",
    "absolutely",
    "completely",
    "totally",
    "so",
];

const NEGATIONS: &[&str] = &["not", "never", "no", "n't", "cannot"];

/// Multiplier applied to a unigram weight when the previous token is an
/// intensifier. Empirically tuned alongside the lexicon; kept as-is.
const INTENSIFIER_FACTOR: f64 = 1.25;

/// Intermediate result of one scoring pass. Owned by a single analysis call
/// and discarded after classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringTally {
    pub total_score: f64,
    /// Lexicon and emoticon hits, zero-weight ones included.
    pub scored_word_count: usize,
    /// Hits whose (adjusted) weight was exactly zero.
    pub neutral_word_count: usize,
    /// Word hits with |weight| >= 3 and emoticon keys with |weight| >= 4.
    pub strong_indicator_count: usize,
    pub intensifier_count: usize,
    /// Matched words, phrases and emoticon keys in match order.
    pub matched_terms: Vec<String>,
}

/// Score a tokenized text against the lexicon. `raw_text` is the original
/// input, used only for the emoticon scan.
///
/// Never fails; adversarial input (e.g. all punctuation) degrades to an
/// all-zero tally.
pub fn score(lexicon: &Lexicon, tokens: &[String], raw_text: &str) -> ScoringTally {
    let mut tally = ScoringTally::default();
    let mut prev = "";

    for token in tokens {
        let bigram = if prev.is_empty() {
            None
        } else {
            let candidate = format!("{prev} {token}");
            lexicon.phrase(&candidate).map(|weight| (candidate, weight))
        };

        if let Some((phrase, weight)) = bigram {
            record(&mut tally, weight, STRONG_WORD_WEIGHT);
            tally.matched_terms.push(phrase);
        } else if let Some(base) = lexicon.word(token) {
            let mut weight = base;
            if INTENSIFIERS.contains(&prev) {
                weight *= INTENSIFIER_FACTOR;
                tally.intensifier_count += 1;
            }
            if NEGATIONS.contains(&prev) {
                weight = -weight;
            }
            record(&mut tally, weight, STRONG_WORD_WEIGHT);
            tally.matched_terms.push(token.clone());
        }

        prev = token;
    }

    for (glyph, weight) in lexicon.emoticons() {
        let occurrences = raw_text.matches(glyph.as_str()).count();
        if occurrences > 0 {
            tally.total_score += weight * occurrences as f64;
            tally.scored_word_count += occurrences;
            tally.matched_terms.push(glyph.clone());
            // Once per key, not per occurrence.
            if weight.abs() >= STRONG_EMOTICON_WEIGHT {
                tally.strong_indicator_count += 1;
            }
        }
    }

    tally
}

fn record(tally: &mut ScoringTally, weight: f64, strong_at: f64) {
    if weight == 0.0 {
        tally.neutral_word_count += 1;
    } else {
        tally.total_score += weight;
        if weight.abs() >= strong_at {
            tally.strong_indicator_count += 1;
        }
    }
    tally.scored_word_count += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize;

    fn run(text: &str) -> ScoringTally {
        let lexicon = Lexicon::builtin();
        let tokens = tokenize(text);
        score(&lexicon, &tokens, text)
    }

    #[test]
    fn phrase_wins_over_unigram_for_its_second_token() {
        let tally = run("no response");
        // "no" matches as a unigram first, then the bigram lands as a single
        // matched term; "response" never matches on its own.
        assert_eq!(tally.matched_terms, vec!["no", "no response"]);
        assert_eq!(tally.total_score, -4.0);
        assert_eq!(tally.strong_indicator_count, 1);
    }

    #[test]
    fn intensifier_scales_by_a_quarter() {
        let plain = run("good");
        let boosted = run("very good");
        assert_eq!(plain.total_score, 3.0);
        // "very" itself carries weight 1 in the lexicon.
        assert_eq!(boosted.total_score, 1.0 + 3.0 * 1.25);
        assert_eq!(boosted.intensifier_count, 1);
        assert_eq!(boosted.strong_indicator_count, 1);
    }

    #[test]
    fn negation_flips_the_adjusted_weight() {
        let tally = run("not happy");
        // "not" scores -2 as a unigram, "happy" (3) is negated to -3.
        assert_eq!(tally.total_score, -5.0);
        assert_eq!(tally.matched_terms, vec!["not", "happy"]);
        assert_eq!(tally.strong_indicator_count, 1);
    }

    #[test]
    fn zero_weight_hits_count_as_neutral_not_score() {
        let tally = run("weather conditions");
        assert_eq!(tally.total_score, 0.0);
        assert_eq!(tally.neutral_word_count, 2);
        assert_eq!(tally.scored_word_count, 2);
        assert_eq!(tally.matched_terms, vec!["weather", "conditions"]);
    }

    #[test]
    fn emoticons_score_from_raw_text() {
        let tally = run("great product :)");
        assert_eq!(tally.matched_terms, vec!["great", "product", ":)"]);
        assert_eq!(tally.total_score, 3.0 + 1.0 + 2.0);
        assert_eq!(tally.scored_word_count, 3);
    }

    #[test]
    fn emoticon_occurrences_accumulate_but_key_is_recorded_once() {
        let tally = run("😊 and again 😊");
        assert_eq!(tally.total_score, 6.0);
        assert_eq!(tally.scored_word_count, 2);
        assert_eq!(tally.matched_terms, vec!["😊"]);
    }

    #[test]
    fn strong_emoticon_threshold_is_four() {
        let angry = run("🤬");
        assert_eq!(angry.strong_indicator_count, 1);
        let smile = run(":)");
        assert_eq!(smile.strong_indicator_count, 0);
    }

    #[test]
    fn unknown_tokens_contribute_nothing() {
        let tally = run("zzyzx qwfp");
        assert_eq!(tally, ScoringTally::default());
    }
}
