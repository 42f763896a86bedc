//! Fuzzy matching against the entity vocabulary.
//!
//! Scores are token-order-insensitive: both sides are processed, split into
//! words, sorted and rejoined, then scored as `2 * matches / (len_a + len_b)`
//! over a character diff. Scores range from 0 to 100.

use crate::normalize::fuzzy_process;
use indexmap::IndexMap;
use similar::TextDiff;
use tracing::trace;

/// Default acceptance threshold.
pub const DEFAULT_THRESHOLD: u8 = 70;

/// Token-sorted similarity between two strings, 0-100.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let a = sorted_tokens(a);
    let b = sorted_tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let ratio = TextDiff::from_chars(a.as_str(), b.as_str()).ratio();
    (f64::from(ratio) * 100.0).round() as u8
}

fn sorted_tokens(text: &str) -> String {
    let processed = fuzzy_process(text);
    let mut tokens: Vec<&str> = processed.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    threshold: u8,
}

impl FuzzyMatcher {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Returns the canonical value of the best-scoring key, if its score
    /// reaches the threshold. Ties go to the earliest key.
    pub fn best_match<'a>(
        &self,
        text: &str,
        candidates: &'a IndexMap<String, String>,
    ) -> Option<&'a str> {
        if text.trim().is_empty() {
            return None;
        }

        let mut best: Option<(&'a str, u8)> = None;
        for (key, canonical) in candidates {
            let score = token_sort_ratio(text, key);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((canonical.as_str(), score));
            }
        }

        let (canonical, score) = best?;
        trace!(text, canonical, score, "Best fuzzy candidate");
        (score >= self.threshold).then_some(canonical)
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
