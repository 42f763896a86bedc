//! Language capability adapter.
//!
//! One adapter per supported language bundles a tokenizer/NER backend with an
//! entity ruler seeded from the vocabulary and a keyword phrase matcher. The
//! ruler runs ahead of the backend, so a known course or teacher name always
//! wins over a generic PERSON or DATE span covering the same tokens.

mod matcher;
mod rules;
mod tokenizer;

pub use matcher::{EntityRuler, PhraseMatcher};
pub use rules::{english_lemma, turkish_lemma, RuleBasedBackend};
pub use tokenizer::tokenize;

use crate::error::{NlpError, Result};
use crate::vocabulary::EntityVocabulary;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use unibot_core::{KeywordConfig, LanguageConfig};

/// A token with byte offsets into the parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Normalized form used for case-insensitive comparisons
    pub lower: String,
    pub lemma: String,
    pub start: usize,
    pub end: usize,
}

/// Entity labels produced by the ruler and the backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    Course,
    Teacher,
    Date,
    Time,
    Person,
    Other(String),
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Course => f.write_str("COURSE"),
            Self::Teacher => f.write_str("TEACHER"),
            Self::Date => f.write_str("DATE"),
            Self::Time => f.write_str("TIME"),
            Self::Person => f.write_str("PERSON"),
            Self::Other(label) => f.write_str(label),
        }
    }
}

/// A labelled span covering tokens `start..end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpan {
    pub label: EntityLabel,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl EntitySpan {
    /// Builds a span over `tokens[start..end]`, copying the covered text.
    pub fn from_tokens(
        text: &str,
        tokens: &[Token],
        start: usize,
        end: usize,
        label: EntityLabel,
    ) -> Self {
        let from = tokens[start].start;
        let to = tokens[end - 1].end;
        Self {
            label,
            text: text[from..to].to_string(),
            start,
            end,
        }
    }

    fn overlaps(&self, other: &EntitySpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Tokenized text with its recognised entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDoc {
    pub text: String,
    pub tokens: Vec<Token>,
    pub entities: Vec<EntitySpan>,
}

impl ParsedDoc {
    /// Original text covered by tokens `start..end`.
    pub fn span_text(&self, start: usize, end: usize) -> &str {
        if start >= end || end > self.tokens.len() {
            return "";
        }
        &self.text[self.tokens[start].start..self.tokens[end - 1].end]
    }
}

/// Trigger-word category of a keyword match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeywordCategory {
    Course,
    Exam,
    Teacher,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub category: KeywordCategory,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Tokenizer plus general-purpose named-entity recognition for one language.
pub trait NerBackend: Send + Sync {
    fn id(&self) -> &str;

    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn recognize(&self, text: &str, tokens: &[Token]) -> Vec<EntitySpan>;
}

/// Named NER backends available to adapters.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn NerBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in English and Turkish rule-based backends.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RuleBasedBackend::english()));
        registry.register(Arc::new(RuleBasedBackend::turkish()));
        registry
    }

    pub fn register(&mut self, backend: Arc<dyn NerBackend>) {
        self.backends.insert(backend.id().to_string(), backend);
    }

    pub fn load(&self, id: &str) -> Result<Arc<dyn NerBackend>> {
        self.backends
            .get(id)
            .cloned()
            .ok_or_else(|| NlpError::backend_unavailable(format!("no backend registered as '{}'", id)))
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.backends.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.ids())
            .finish()
    }
}

/// Per-language parsing capability.
#[derive(Clone)]
pub struct LanguageAdapter {
    language: String,
    backend: Arc<dyn NerBackend>,
    ruler: EntityRuler,
    keywords: PhraseMatcher,
}

impl LanguageAdapter {
    /// Loads the configured backend and seeds the ruler and keyword matcher.
    pub fn setup(
        language: &str,
        config: &LanguageConfig,
        vocabulary: &EntityVocabulary,
        registry: &BackendRegistry,
    ) -> Result<Self> {
        let backend = registry.load(&config.backend)?;

        let mut ruler = EntityRuler::new();
        for course in vocabulary.course_names() {
            ruler.add_pattern(EntityLabel::Course, &backend.tokenize(course));
        }
        for teacher in vocabulary.teacher_names() {
            ruler.add_pattern(EntityLabel::Teacher, &backend.tokenize(teacher));
        }

        let keywords = compile_keywords(backend.as_ref(), &config.keywords);

        info!(
            language,
            backend = backend.id(),
            patterns = ruler.len(),
            "Language adapter ready"
        );

        Ok(Self {
            language: language.to_string(),
            backend,
            ruler,
            keywords,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    /// Tokenizes `text` and labels entity spans, ruler spans first.
    pub fn parse(&self, text: &str) -> ParsedDoc {
        let tokens = self.backend.tokenize(text);
        let mut entities = self.ruler.find(text, &tokens);

        let generic: Vec<_> = self
            .backend
            .recognize(text, &tokens)
            .into_iter()
            .filter(|span| !entities.iter().any(|known| known.overlaps(span)))
            .collect();
        entities.extend(generic);
        entities.sort_by_key(|span| span.start);

        debug!(
            language = %self.language,
            tokens = tokens.len(),
            entities = entities.len(),
            "Parsed text"
        );

        ParsedDoc {
            text: text.to_string(),
            tokens,
            entities,
        }
    }

    pub fn match_keywords(&self, doc: &ParsedDoc) -> Vec<KeywordMatch> {
        self.keywords.find(doc)
    }
}

impl fmt::Debug for LanguageAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageAdapter")
            .field("language", &self.language)
            .field("backend", &self.backend.id())
            .field("patterns", &self.ruler.len())
            .finish()
    }
}

fn compile_keywords(backend: &dyn NerBackend, config: &KeywordConfig) -> PhraseMatcher {
    let mut matcher = PhraseMatcher::new();
    let lists = [
        (KeywordCategory::Course, &config.course),
        (KeywordCategory::Exam, &config.exam),
        (KeywordCategory::Teacher, &config.teacher),
    ];
    for (category, words) in lists {
        for word in words {
            matcher.add(category, &backend.tokenize(word));
        }
    }
    matcher
}
