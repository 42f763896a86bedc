//! Intent classification.
//!
//! The dispatch engine consumes intents through the [`IntentPredictor`] seam.
//! [`PatternIntentClassifier`] is the default predictor: pre-compiled English
//! and Turkish regular expressions with weighted scoring, extensible with
//! custom patterns loaded from a JSON file.

use crate::error::{NlpError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, trace};
use unibot_core::ClassifierConfig;

/// Closed set of user goals the assistant can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Goodbye,
    Thanks,
    /// Weekly lecture slots of a course
    ClassSchedule,
    /// Exam dates of a course
    ExamInfo,
    /// Courses taught by a teacher
    TeacherInfo,
    /// Rooms used by a course
    RoomInfo,
    /// All lectures on one day
    DailySchedule,
    /// Lecture slots shared by several courses
    ScheduleConflict,
    /// Weekly slots of a teacher
    TeacherSchedule,
    CourseAvailability,
    SectionInfo,
    AcademicCalendar,
    SmalltalkWeather,
    SmalltalkName,
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 16] = [
        Self::Greeting,
        Self::Goodbye,
        Self::Thanks,
        Self::ClassSchedule,
        Self::ExamInfo,
        Self::TeacherInfo,
        Self::RoomInfo,
        Self::DailySchedule,
        Self::ScheduleConflict,
        Self::TeacherSchedule,
        Self::CourseAvailability,
        Self::SectionInfo,
        Self::AcademicCalendar,
        Self::SmalltalkWeather,
        Self::SmalltalkName,
        Self::Unknown,
    ];

    /// External label of the intent, e.g. `class_schedule`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Goodbye => "goodbye",
            Self::Thanks => "thanks",
            Self::ClassSchedule => "class_schedule",
            Self::ExamInfo => "exam_info",
            Self::TeacherInfo => "teacher_info",
            Self::RoomInfo => "room_info",
            Self::DailySchedule => "daily_schedule",
            Self::ScheduleConflict => "schedule_conflict",
            Self::TeacherSchedule => "teacher_schedule",
            Self::CourseAvailability => "course_availability",
            Self::SectionInfo => "section_info",
            Self::AcademicCalendar => "academic_calendar",
            Self::SmalltalkWeather => "smalltalk_weather",
            Self::SmalltalkName => "smalltalk_name",
            Self::Unknown => "unknown",
        }
    }

    /// Maps an external label to an intent; unrecognised labels are `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|intent| intent.label() == label)
            .unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Predicts the intent of a user utterance.
#[cfg_attr(test, mockall::automock)]
pub trait IntentPredictor: Send + Sync {
    fn predict(&self, text: &str) -> Result<Intent>;
}

/// A classification with its confidence and the runners-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f64,
    pub matched_patterns: Vec<String>,
    pub alternatives: Vec<(Intent, f64)>,
}

impl Classification {
    fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            confidence: 0.0,
            matched_patterns: Vec::new(),
            alternatives: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct IntentPattern {
    regex: Regex,
    weight: f64,
    intent: Intent,
}

impl IntentPattern {
    fn new(pattern: &str, weight: f64, intent: Intent) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            weight,
            intent,
        }
    }
}

/// Entry of a custom pattern file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSpec {
    pub pattern: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub intent: Intent,
}

fn default_weight() -> f64 {
    0.8
}

lazy_static! {
    static ref INTENT_PATTERNS: Vec<IntentPattern> = vec![
        // Greeting
        IntentPattern::new(r"(?i)^\s*(hi|hello|hey|good\s+(morning|afternoon|evening)|merhaba|selam|günaydın)\b", 1.0, Intent::Greeting),

        // Goodbye
        IntentPattern::new(r"(?i)\b(bye|goodbye|see\s+you|görüşürüz|hoşça\s+kal)\b", 1.0, Intent::Goodbye),

        // Thanks
        IntentPattern::new(r"(?i)\b(thanks|thank\s+you|teşekkür|sağ\s*ol)", 1.0, Intent::Thanks),

        // ClassSchedule
        IntentPattern::new(r"(?i)\b(when|what\s+time)\b.*\b(is|are|does)\b", 0.6, Intent::ClassSchedule),
        IntentPattern::new(r"(?i)\bschedule\s+(for|of)\b", 0.7, Intent::ClassSchedule),
        IntentPattern::new(r"(?i)\b(what|how)\s+about\b", 0.5, Intent::ClassSchedule),
        IntentPattern::new(r"(?i)\b(ne\s+zaman|saat\s+kaçta|hangi\s+gün)\b", 0.8, Intent::ClassSchedule),

        // ExamInfo
        IntentPattern::new(r"(?i)\b(exams?|midterms?|finals?|makeup|sınav\w*|vize\w*|bütünleme\w*)\b", 0.9, Intent::ExamInfo),

        // TeacherInfo
        IntentPattern::new(r"(?i)\b(what|which)\b.*\bteach(es)?\b", 0.8, Intent::TeacherInfo),
        IntentPattern::new(r"(?i)\b(courses|classes)\s+(of|by)\b", 0.7, Intent::TeacherInfo),
        IntentPattern::new(r"(?i)\b(hangi|ne)\s+dersler?i?\s+veriyor\b", 0.9, Intent::TeacherInfo),

        // RoomInfo
        IntentPattern::new(r"(?i)\b(where|which\s+room|classroom|nerede|hangi\s+(sınıf|salon)|derslik)\b", 0.9, Intent::RoomInfo),
        IntentPattern::new(r"(?i)\brooms?\b", 0.5, Intent::RoomInfo),

        // DailySchedule
        IntentPattern::new(r"(?i)\b(what|which)\s+(classes|courses|lectures)\b.*\b(on|today|tomorrow)\b", 0.9, Intent::DailySchedule),
        IntentPattern::new(r"(?i)\b(classes|courses|lectures)\s+on\b", 0.7, Intent::DailySchedule),
        IntentPattern::new(r"(?i)\b(pazartesi|salı|çarşamba|perşembe|cuma|cumartesi|pazar)\b.*\b(hangi|ne)\s+dersler", 0.9, Intent::DailySchedule),

        // ScheduleConflict
        IntentPattern::new(r"(?i)\b(conflicts?|clash\w*|overlap\w*|çakış\w*)\b", 1.2, Intent::ScheduleConflict),

        // TeacherSchedule
        IntentPattern::new(r"(?i)\bwhen\s+does\b.*\bteach\b", 0.9, Intent::TeacherSchedule),
        IntentPattern::new(r"(?i)\b(teaching\s+schedule|\w+'s\s+schedule)\b", 0.9, Intent::TeacherSchedule),
        IntentPattern::new(r"(?i)\bhoca\w*\s+(ders\s+)?program\w*", 0.9, Intent::TeacherSchedule),

        // CourseAvailability
        IntentPattern::new(r"(?i)\b(is|are)\b.*\b(available|offered|open)\b", 0.9, Intent::CourseAvailability),
        IntentPattern::new(r"(?i)\b(açılıyor|açık\s+mı|veriliyor\s+mu)\b", 0.9, Intent::CourseAvailability),

        // SectionInfo
        IntentPattern::new(r"(?i)\b(sections?|şube\w*)\b", 1.2, Intent::SectionInfo),

        // AcademicCalendar
        IntentPattern::new(r"(?i)\b(academic\s+calendar|semester\s+(start|end)s?|registration|akademik\s+takvim|dönem\s+(başı|sonu))\b", 1.2, Intent::AcademicCalendar),

        // SmalltalkWeather
        IntentPattern::new(r"(?i)\b(weather|rain\w*|sunny|hava\s+durumu|yağmur)\b", 1.2, Intent::SmalltalkWeather),

        // SmalltalkName
        IntentPattern::new(r"(?i)\b(your\s+name|who\s+are\s+you|adın\s+ne|sen\s+kimsin)\b", 1.2, Intent::SmalltalkName),
    ];
}

/// Intent classifier that uses pattern matching for fast classification.
#[derive(Debug, Clone, Default)]
pub struct PatternIntentClassifier {
    custom_patterns: Vec<IntentPattern>,
}

impl PatternIntentClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a classifier with the custom patterns named by the config.
    ///
    /// A configured pattern file that is missing or malformed is an error.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let mut classifier = Self::new();
        if let Some(path) = &config.patterns_path {
            let added = classifier.load_patterns(path)?;
            info!(path = %path.display(), patterns = added, "Loaded custom intent patterns");
        }
        Ok(classifier)
    }

    /// Adds every pattern listed in a JSON file; returns how many were added.
    pub fn load_patterns(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            NlpError::classifier_artifact(format!("cannot read {}: {}", path.display(), e))
        })?;
        let specs: Vec<PatternSpec> = serde_json::from_str(&raw).map_err(|e| {
            NlpError::classifier_artifact(format!("invalid pattern file {}: {}", path.display(), e))
        })?;

        for entry in &specs {
            self.add_custom_pattern(&entry.pattern, entry.weight, entry.intent)?;
        }
        Ok(specs.len())
    }

    /// Adds a custom pattern for intent classification.
    pub fn add_custom_pattern(&mut self, pattern: &str, weight: f64, intent: Intent) -> Result<()> {
        let regex = Regex::new(pattern)?;
        self.custom_patterns.push(IntentPattern {
            regex,
            weight,
            intent,
        });
        Ok(())
    }

    /// Scores every pattern against `text` and returns the best intent.
    pub fn classify(&self, text: &str) -> Classification {
        trace!("Classifying intent for query: {}", text);

        let mut scores: HashMap<Intent, f64> = HashMap::new();
        let mut matched_patterns: HashMap<Intent, Vec<String>> = HashMap::new();

        for pattern in INTENT_PATTERNS.iter().chain(self.custom_patterns.iter()) {
            if pattern.regex.is_match(text) {
                trace!("Pattern matched: {:?}", pattern.regex.as_str());
                *scores.entry(pattern.intent).or_insert(0.0) += pattern.weight;
                matched_patterns
                    .entry(pattern.intent)
                    .or_default()
                    .push(pattern.regex.as_str().to_string());
            }
        }

        let max_score = scores.values().fold(0.0_f64, |a, &b| a.max(b));
        if max_score == 0.0 {
            debug!("No patterns matched, returning Unknown intent");
            return Classification::unknown();
        }

        let mut ranked: Vec<(Intent, f64)> = scores
            .iter()
            .map(|(&intent, &score)| (intent, score / max_score))
            .collect();
        // ties resolve to the intent declared first
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| rank(a.0).cmp(&rank(b.0)))
        });

        let (intent, confidence) = ranked[0];
        let alternatives = ranked[1..]
            .iter()
            .filter(|(_, score)| *score > 0.3)
            .copied()
            .collect();

        debug!(intent = %intent, confidence, "Classified intent");

        Classification {
            intent,
            confidence,
            matched_patterns: matched_patterns.remove(&intent).unwrap_or_default(),
            alternatives,
        }
    }
}

fn rank(intent: Intent) -> usize {
    Intent::ALL
        .iter()
        .position(|i| *i == intent)
        .unwrap_or(Intent::ALL.len())
}

impl IntentPredictor for PatternIntentClassifier {
    fn predict(&self, text: &str) -> Result<Intent> {
        Ok(self.classify(text).intent)
    }
}
