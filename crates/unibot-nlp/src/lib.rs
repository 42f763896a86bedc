//! # Unibot NLP
//!
//! Natural language processing for the Unibot schedule assistant.
//!
//! ## Features
//!
//! - **Entity Vocabulary**: normalized course and teacher lookup tables built
//!   from the schedule store
//! - **Language Adapters**: per-language tokenizer/NER backends with an entity
//!   ruler and keyword phrase matcher
//! - **Entity Extraction**: exact, fuzzy, NER, keyword and lexical stages run
//!   in a fixed precedence order, with follow-up resolution from history
//! - **Intent Classification**: the [`IntentPredictor`] seam and a
//!   pattern-based default implementation
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use unibot_core::{load_schedule, AppConfig};
//! use unibot_nlp::{BackendRegistry, Entities, EntityExtractor, EntityVocabulary};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let store = load_schedule(&config.data.schedule_path)?;
//!     let vocabulary = Arc::new(EntityVocabulary::build(&store, &config.matching.title_prefixes));
//!     let extractor = EntityExtractor::new(&config, vocabulary, &BackendRegistry::with_builtins())?;
//!
//!     let history: Vec<Entities> = Vec::new();
//!     let entities = extractor.extract("When is CS101?", &history)?;
//!     println!("{:?}", entities.course);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod entity;
pub mod error;
pub mod extraction;
pub mod fuzzy;
pub mod intent;
pub mod language;
pub mod normalize;
pub mod vocabulary;

pub use adapter::{
    BackendRegistry, EntityLabel, EntitySpan, KeywordCategory, KeywordMatch, LanguageAdapter,
    NerBackend, ParsedDoc, RuleBasedBackend, Token,
};
pub use entity::{Entities, TurnHistory};
pub use error::{NlpError, Result};
pub use extraction::{EntityExtractor, Utterance, MAX_INPUT_CHARS};
pub use fuzzy::{token_sort_ratio, FuzzyMatcher};
pub use intent::{Classification, Intent, IntentPredictor, PatternIntentClassifier};
pub use language::LanguageDetector;
pub use normalize::{fuzzy_process, normalize_text};
pub use vocabulary::{strip_title, EntityVocabulary};
