//! Entity extraction pipeline.

pub mod stages;

use crate::adapter::{BackendRegistry, KeywordMatch, LanguageAdapter, ParsedDoc};
use crate::entity::{Entities, TurnHistory};
use crate::error::{NlpError, Result};
use crate::fuzzy::FuzzyMatcher;
use crate::language::LanguageDetector;
use crate::normalize::normalize_text;
use crate::vocabulary::EntityVocabulary;
use stages::{StageInput, PIPELINE};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};
use unibot_core::{AppConfig, LanguageConfig, LexiconConfig};

/// Longest accepted input, in characters.
pub const MAX_INPUT_CHARS: usize = 1000;

/// A user utterance after language detection, parsing and keyword matching.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub text: String,
    pub normalized: String,
    pub language: String,
    pub doc: ParsedDoc,
    pub keywords: Vec<KeywordMatch>,
}

/// Resolves course, teacher, day, time, exam type and building from text.
///
/// Built once at startup and shared read-only between sessions; each call
/// receives the calling session's history for follow-up resolution.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    vocabulary: Arc<EntityVocabulary>,
    adapters: HashMap<String, LanguageAdapter>,
    languages: BTreeMap<String, LanguageConfig>,
    detector: LanguageDetector,
    fuzzy: FuzzyMatcher,
    lexicon: LexiconConfig,
}

impl EntityExtractor {
    /// Sets up one language adapter per configured language.
    ///
    /// Fails if any configured backend cannot be loaded or the default
    /// language has no configuration.
    pub fn new(
        config: &AppConfig,
        vocabulary: Arc<EntityVocabulary>,
        registry: &BackendRegistry,
    ) -> Result<Self> {
        if config.language(&config.default_language).is_none() {
            return Err(NlpError::unsupported_language(format!(
                "default language '{}' is not configured",
                config.default_language
            )));
        }

        let mut adapters = HashMap::new();
        for (code, language) in &config.languages {
            let adapter = LanguageAdapter::setup(code, language, &vocabulary, registry)?;
            adapters.insert(code.clone(), adapter);
        }

        info!(languages = adapters.len(), "Entity extractor ready");

        Ok(Self {
            vocabulary,
            adapters,
            languages: config.languages.clone(),
            detector: LanguageDetector::from_config(&config.default_language, &config.languages),
            fuzzy: FuzzyMatcher::new(config.matching.fuzzy_threshold),
            lexicon: config.lexicon.clone(),
        })
    }

    pub fn vocabulary(&self) -> &EntityVocabulary {
        &self.vocabulary
    }

    pub fn detect_language(&self, text: &str) -> &str {
        self.detector.detect(text)
    }

    pub fn adapter(&self, language: &str) -> Option<&LanguageAdapter> {
        self.adapters.get(language)
    }

    /// Validates, detects the language, parses and keyword-matches `text`.
    pub fn analyze(&self, text: &str) -> Result<Utterance> {
        validate_input(text)?;

        let language = self.detect_language(text).to_string();
        let adapter = self
            .adapters
            .get(&language)
            .ok_or_else(|| NlpError::unsupported_language(language.clone()))?;

        let doc = adapter.parse(text);
        let keywords = adapter.match_keywords(&doc);
        trace!(?keywords, "Keyword matches");

        Ok(Utterance {
            text: text.to_string(),
            normalized: normalize_text(text),
            language,
            doc,
            keywords,
        })
    }

    /// Runs the full pipeline over `text`.
    #[instrument(skip(self, history), fields(language = tracing::field::Empty))]
    pub fn extract(&self, text: &str, history: &dyn TurnHistory) -> Result<Entities> {
        let utterance = self.analyze(text)?;
        tracing::Span::current().record("language", utterance.language.as_str());

        let language = self
            .languages
            .get(&utterance.language)
            .ok_or_else(|| NlpError::unsupported_language(utterance.language.clone()))?;

        let input = StageInput {
            utterance: &utterance,
            vocabulary: &self.vocabulary,
            fuzzy: self.fuzzy,
            lexicon: &self.lexicon,
            language,
            history,
        };

        let entities = PIPELINE
            .iter()
            .fold(Entities::new(), |entities, (name, stage)| {
                let next = stage(&input, entities);
                trace!(stage = *name, entities = ?next, "Stage complete");
                next
            });

        debug!(?entities, "Extracted entities");
        Ok(entities)
    }
}

fn validate_input(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(NlpError::validation("Query cannot be empty"));
    }

    if text.chars().count() > MAX_INPUT_CHARS {
        return Err(NlpError::validation(format!(
            "Query is too long (max {} characters)",
            MAX_INPUT_CHARS
        )));
    }

    Ok(())
}
