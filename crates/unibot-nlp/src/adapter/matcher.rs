//! Token-sequence matchers: the entity ruler and the keyword phrase matcher.

use super::{EntityLabel, EntitySpan, KeywordCategory, KeywordMatch, ParsedDoc, Token};

#[derive(Debug, Clone)]
struct RulerPattern {
    label: EntityLabel,
    tokens: Vec<String>,
}

/// Recognises known course and teacher names as entity spans.
///
/// Token texts are compared exactly. At each position the longest pattern
/// wins; ties go to the pattern added first. Spans never overlap.
#[derive(Debug, Clone, Default)]
pub struct EntityRuler {
    patterns: Vec<RulerPattern>,
}

impl EntityRuler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pattern(&mut self, label: EntityLabel, tokens: &[Token]) {
        if tokens.is_empty() {
            return;
        }
        self.patterns.push(RulerPattern {
            label,
            tokens: tokens.iter().map(|t| t.text.clone()).collect(),
        });
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn find(&self, text: &str, tokens: &[Token]) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let best = self
                .patterns
                .iter()
                .filter(|p| matches_at(tokens, i, &p.tokens, |t| t.text.as_str()))
                .fold(None::<&RulerPattern>, |best, p| match best {
                    Some(b) if b.tokens.len() >= p.tokens.len() => Some(b),
                    _ => Some(p),
                });

            match best {
                Some(pattern) => {
                    let end = i + pattern.tokens.len();
                    spans.push(EntitySpan::from_tokens(text, tokens, i, end, pattern.label.clone()));
                    i = end;
                }
                None => i += 1,
            }
        }

        spans
    }
}

/// Finds trigger keywords by category, compared on normalized token text.
#[derive(Debug, Clone, Default)]
pub struct PhraseMatcher {
    phrases: Vec<(KeywordCategory, Vec<String>)>,
}

impl PhraseMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, category: KeywordCategory, tokens: &[Token]) {
        if tokens.is_empty() {
            return;
        }
        self.phrases
            .push((category, tokens.iter().map(|t| t.lower.clone()).collect()));
    }

    /// Every match, possibly overlapping, ordered by start then end.
    pub fn find(&self, doc: &ParsedDoc) -> Vec<KeywordMatch> {
        let mut matches = Vec::new();
        for start in 0..doc.tokens.len() {
            for (category, phrase) in &self.phrases {
                if matches_at(&doc.tokens, start, phrase, |t| t.lower.as_str()) {
                    let end = start + phrase.len();
                    matches.push(KeywordMatch {
                        category: *category,
                        text: doc.span_text(start, end).to_string(),
                        start,
                        end,
                    });
                }
            }
        }
        matches.sort_by_key(|m| (m.start, m.end));
        matches
    }
}

fn matches_at<F>(tokens: &[Token], start: usize, pattern: &[String], key: F) -> bool
where
    F: Fn(&Token) -> &str,
{
    start + pattern.len() <= tokens.len()
        && tokens[start..start + pattern.len()]
            .iter()
            .zip(pattern)
            .all(|(token, expected)| key(token) == expected)
}
