//! Built-in rule-based NER backends.
//!
//! These stand in for a statistical model: they tokenize, lemmatize with a
//! small suffix list and label DATE, TIME and PERSON spans from surface cues.

use super::tokenizer::tokenize;
use super::{EntityLabel, EntitySpan, NerBackend, Token};
use crate::normalize::normalize_text;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CLOCK_TIME: Regex = Regex::new(r"^\d{1,2}[:.]\d{2}(?:[:.]\d{2})?$").unwrap();
    static ref HOUR_MERIDIEM: Regex = Regex::new(r"(?i)^\d{1,2}(?:am|pm)$").unwrap();
    static ref BARE_HOUR: Regex = Regex::new(r"^\d{1,2}$").unwrap();
    static ref NUMERIC_DATE: Regex = Regex::new(r"^\d{1,2}[./]\d{1,2}[./]\d{2,4}$").unwrap();
}

const EN_DATE_WORDS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "today",
    "tomorrow", "yesterday", "tonight",
];

const EN_STOP_WORDS: &[&str] = &[
    "what", "when", "where", "who", "which", "how", "is", "are", "does", "do", "did", "the",
    "and", "can", "could", "tell", "show", "hi", "hello", "hey", "thanks", "i", "my", "please",
];

const TR_DATE_WORDS: &[&str] = &["bugün", "yarın", "dün"];

const TR_STOP_WORDS: &[&str] = &[
    "ne", "hangi", "nerede", "kim", "merhaba", "selam", "teşekkürler", "bu", "şu", "ve",
];

const EN_PLURAL_EXCEPTIONS: &[&str] = &["class", "gas", "bus", "this", "is", "was", "has"];

/// Suffixes stripped by the Turkish lemmatizer, longest first.
const TR_SUFFIXES: &[&str] = &[
    "lerinin", "larının", "lerin", "ların", "leri", "ları", "ler", "lar", "nin", "nın", "nun",
    "nün", "si", "sı", "su", "sü", "i", "ı", "u", "ü",
];

pub fn english_lemma(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.chars().count() > 3
        && lower.ends_with('s')
        && !lower.ends_with("ss")
        && !EN_PLURAL_EXCEPTIONS.contains(&lower.as_str())
    {
        lower[..lower.len() - 1].to_string()
    } else {
        lower
    }
}

pub fn turkish_lemma(word: &str) -> String {
    let lower: String = word
        .chars()
        .flat_map(|c| match c {
            'I' => vec!['ı'],
            'İ' => vec!['i'],
            other => other.to_lowercase().collect(),
        })
        .collect();
    for suffix in TR_SUFFIXES {
        if let Some(stem) = lower.strip_suffix(suffix) {
            if stem.chars().count() >= 3 {
                return stem.to_string();
            }
        }
    }
    lower
}

/// Rule-based backend for one language.
#[derive(Debug, Clone)]
pub struct RuleBasedBackend {
    id: String,
    lemmatize: fn(&str) -> String,
    date_words: &'static [&'static str],
    stop_words: &'static [&'static str],
}

impl RuleBasedBackend {
    pub fn english() -> Self {
        Self {
            id: "builtin-en".to_string(),
            lemmatize: english_lemma,
            date_words: EN_DATE_WORDS,
            stop_words: EN_STOP_WORDS,
        }
    }

    pub fn turkish() -> Self {
        Self {
            id: "builtin-tr".to_string(),
            lemmatize: turkish_lemma,
            date_words: TR_DATE_WORDS,
            stop_words: TR_STOP_WORDS,
        }
    }

    fn time_span_at(&self, tokens: &[Token], i: usize) -> Option<usize> {
        let token = &tokens[i];
        if CLOCK_TIME.is_match(&token.text) || HOUR_MERIDIEM.is_match(&token.text) {
            return Some(i + 1);
        }
        if BARE_HOUR.is_match(&token.text) {
            let next = tokens.get(i + 1)?;
            if matches!(next.lower.as_str(), "am" | "pm") {
                return Some(i + 2);
            }
        }
        None
    }

    fn is_date(&self, token: &Token) -> bool {
        NUMERIC_DATE.is_match(&token.text) || self.is_date_word(&token.lower)
    }

    fn is_date_word(&self, lower: &str) -> bool {
        self.date_words.iter().any(|w| normalize_text(w) == lower)
    }

    fn is_name_like(&self, token: &Token) -> bool {
        let starts_upper = token.text.chars().next().map_or(false, char::is_uppercase);
        let body = token.text.trim_end_matches('.');
        starts_upper
            && body.chars().all(char::is_alphabetic)
            && !self.stop_words.iter().any(|w| normalize_text(w) == token.lower)
            && !self.is_date_word(&token.lower)
    }
}

impl NerBackend for RuleBasedBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn tokenize(&self, text: &str) -> Vec<Token> {
        tokenize(text, self.lemmatize)
    }

    fn recognize(&self, text: &str, tokens: &[Token]) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            if self.is_date(&tokens[i]) {
                spans.push(EntitySpan::from_tokens(text, tokens, i, i + 1, EntityLabel::Date));
                i += 1;
                continue;
            }

            if let Some(end) = self.time_span_at(tokens, i) {
                spans.push(EntitySpan::from_tokens(text, tokens, i, end, EntityLabel::Time));
                i = end;
                continue;
            }

            let run = tokens[i..]
                .iter()
                .take_while(|t| self.is_name_like(t))
                .count();
            if run >= 2 {
                spans.push(EntitySpan::from_tokens(text, tokens, i, i + run, EntityLabel::Person));
                i += run;
                continue;
            }

            i += 1;
        }

        spans
    }
}
