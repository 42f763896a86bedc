use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "UNIBOT";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    #[serde(default = "default_language")]
    pub default_language: String,
    pub languages: BTreeMap<String, LanguageConfig>,
    pub lexicon: LexiconConfig,
    pub matching: MatchingConfig,
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl AppConfig {
    /// Load configuration from built-in defaults plus environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(None)
    }

    /// Load configuration from file with environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::build(Some(path.as_ref()))
    }

    fn build(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        config.try_deserialize()
    }

    /// Returns the settings for a language code, if configured.
    pub fn language(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.get(code)
    }

    pub fn with_schedule_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data.schedule_path = path.into();
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut languages = BTreeMap::new();
        languages.insert("en".to_string(), LanguageConfig::english());
        languages.insert("tr".to_string(), LanguageConfig::turkish());

        Self {
            data: DataConfig::default(),
            default_language: default_language(),
            languages,
            lexicon: LexiconConfig::default(),
            matching: MatchingConfig::default(),
            conversation: ConversationConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

/// Schedule data source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub schedule_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            schedule_path: PathBuf::from("data/schedule.json"),
        }
    }
}

/// Keyword lists that trigger the phrase matcher, one list per category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default)]
    pub course: Vec<String>,
    #[serde(default)]
    pub exam: Vec<String>,
    #[serde(default)]
    pub teacher: Vec<String>,
}

/// Per-language NLP settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Identifier of the NER backend to load for this language
    pub backend: String,
    /// Words whose presence selects this language during detection
    #[serde(default)]
    pub markers: Vec<String>,
    #[serde(default)]
    pub keywords: KeywordConfig,
    /// Pronouns and phrases that mark a follow-up question
    #[serde(default)]
    pub followup_markers: Vec<String>,
    /// Lemmas recognised as exam types
    #[serde(default)]
    pub exam_keywords: Vec<String>,
}

impl LanguageConfig {
    pub fn english() -> Self {
        Self {
            backend: "builtin-en".to_string(),
            markers: Vec::new(),
            keywords: KeywordConfig {
                course: strings(&["course", "class", "lecture"]),
                exam: strings(&["exam", "test", "midterm", "final"]),
                teacher: strings(&["teacher", "professor", "instructor"]),
            },
            followup_markers: strings(&["he", "she", "her", "him", "it", "about"]),
            exam_keywords: strings(&["midterm", "final", "makeup"]),
        }
    }

    pub fn turkish() -> Self {
        Self {
            backend: "builtin-tr".to_string(),
            markers: strings(&["ders", "hoca", "vize", "final"]),
            keywords: KeywordConfig {
                course: strings(&["ders", "kurs"]),
                exam: strings(&["sınav", "vize", "final", "bütünleme"]),
                teacher: strings(&["hoca", "öğretmen", "profesör"]),
            },
            followup_markers: strings(&["o", "onun", "ona", "hakkında"]),
            exam_keywords: strings(&["vize", "final", "bütünleme"]),
        }
    }
}

/// Closed-vocabulary lexical rules applied after NER
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Canonical weekday names; matched case-insensitively against tokens
    pub weekdays: Vec<String>,
    /// Known building and room identifiers; matched exactly against tokens
    pub buildings: Vec<String>,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            weekdays: strings(&[
                "Pazartesi",
                "Salı",
                "Çarşamba",
                "Perşembe",
                "Cuma",
                "Cumartesi",
                "Pazar",
            ]),
            buildings: strings(&["201", "202", "203", "204", "206", "UZEM", "Seminer Odası"]),
        }
    }
}

/// Fuzzy matching and vocabulary settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum similarity score (0-100) for a fuzzy candidate to be accepted
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: u8,
    /// Honorific prefixes stripped from teacher names, in priority order
    pub title_prefixes: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            title_prefixes: strings(&["Doç. Dr.", "Öğr. Gör. Dr.", "Öğr. Gör.", "Prof. Dr.", "Dr."]),
        }
    }
}

fn default_fuzzy_threshold() -> u8 {
    70
}

/// Conversation context settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationConfig {
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

fn default_history_limit() -> usize {
    5
}

/// Intent classifier settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Optional JSON file with additional intent patterns
    #[serde(default)]
    pub patterns_path: Option<PathBuf>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.default_language, "en");
        assert_eq!(config.matching.fuzzy_threshold, 70);
        assert_eq!(config.conversation.history_limit, 5);
        assert_eq!(config.matching.title_prefixes[0], "Doç. Dr.");
        assert_eq!(config.lexicon.weekdays.len(), 7);
        assert!(config.lexicon.buildings.contains(&"UZEM".to_string()));
    }

    #[test]
    fn test_language_defaults() {
        let config = AppConfig::default();

        let tr = config.language("tr").unwrap();
        assert_eq!(tr.backend, "builtin-tr");
        assert!(tr.markers.contains(&"hoca".to_string()));
        assert!(tr.keywords.exam.contains(&"bütünleme".to_string()));

        let en = config.language("en").unwrap();
        assert!(en.keywords.teacher.contains(&"professor".to_string()));
        assert!(config.language("de").is_none());
    }

    #[test]
    fn test_load_without_file() {
        let config = AppConfig::load().unwrap();
        assert_eq!(config.languages.len(), 2);
    }

    #[test]
    fn test_load_from_file_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[data]
schedule_path = "custom/schedule.json"

[matching]
fuzzy_threshold = 85
title_prefixes = ["Prof. Dr."]

[languages.de]
backend = "builtin-en"
markers = ["vorlesung"]
"#
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.data.schedule_path, PathBuf::from("custom/schedule.json"));
        assert_eq!(config.matching.fuzzy_threshold, 85);
        assert_eq!(config.matching.title_prefixes, vec!["Prof. Dr.".to_string()]);
        assert!(config.language("de").is_some());
        assert!(config.language("en").is_some());
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        assert!(AppConfig::load_from_file("/nonexistent/unibot.toml").is_err());
    }

    #[test]
    fn test_with_schedule_path() {
        let config = AppConfig::default().with_schedule_path("other.json");
        assert_eq!(config.data.schedule_path, PathBuf::from("other.json"));
    }
}
