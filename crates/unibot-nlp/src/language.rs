//! Lexical language detection.

use crate::normalize::normalize_text;
use std::collections::BTreeMap;
use tracing::trace;
use unibot_core::LanguageConfig;

/// Picks a language from marker words.
///
/// A language is selected when any of its markers occurs in the normalized
/// text; otherwise the default language is used. This is a heuristic, not a
/// statistical classifier.
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    default_language: String,
    markers: Vec<(String, Vec<String>)>,
}

impl LanguageDetector {
    pub fn new(default_language: impl Into<String>) -> Self {
        Self {
            default_language: default_language.into(),
            markers: Vec::new(),
        }
    }

    pub fn from_config(default_language: &str, languages: &BTreeMap<String, LanguageConfig>) -> Self {
        let mut detector = Self::new(default_language);
        for (code, config) in languages {
            if code != default_language {
                detector.add_markers(code, &config.markers);
            }
        }
        detector
    }

    pub fn add_markers(&mut self, language: &str, markers: &[String]) {
        let markers: Vec<_> = markers
            .iter()
            .map(|m| normalize_text(m))
            .filter(|m| !m.is_empty())
            .collect();
        if !markers.is_empty() {
            self.markers.push((language.to_string(), markers));
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn detect(&self, text: &str) -> &str {
        let normalized = normalize_text(text);
        let detected = self
            .markers
            .iter()
            .find(|(_, markers)| markers.iter().any(|m| normalized.contains(m.as_str())))
            .map(|(language, _)| language.as_str())
            .unwrap_or(&self.default_language);
        trace!(language = detected, "Detected language");
        detected
    }
}
