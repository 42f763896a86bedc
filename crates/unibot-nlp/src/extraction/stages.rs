//! Extraction stages.
//!
//! Each stage is a pure function taking the analysed utterance plus the
//! entities produced so far and returning the updated entities. The pipeline
//! runs them in a fixed order; later stages may override earlier ones only
//! where documented.

use super::Utterance;
use crate::adapter::{EntityLabel, KeywordCategory};
use crate::entity::{Entities, TurnHistory};
use crate::fuzzy::FuzzyMatcher;
use crate::normalize::normalize_text;
use crate::vocabulary::EntityVocabulary;
use indexmap::IndexMap;
use tracing::debug;
use unibot_core::{LanguageConfig, LexiconConfig};

/// Everything a stage may read besides the entities themselves.
pub struct StageInput<'a> {
    pub utterance: &'a Utterance,
    pub vocabulary: &'a EntityVocabulary,
    pub fuzzy: FuzzyMatcher,
    pub lexicon: &'a LexiconConfig,
    pub language: &'a LanguageConfig,
    pub history: &'a dyn TurnHistory,
}

pub type Stage = fn(&StageInput<'_>, Entities) -> Entities;

/// Stages in precedence order.
pub const PIPELINE: &[(&str, Stage)] = &[
    ("exact_match", exact_match),
    ("fuzzy_match", fuzzy_match),
    ("ner", ner_pass),
    ("followup", resolve_followup),
    ("day_lexicon", day_lexicon),
    ("keywords", keyword_pass),
    ("building", building_pass),
    ("exam_type", exam_type_pass),
];

/// Substring lookup of vocabulary keys in the normalized text.
///
/// Keys are tried in vocabulary order and the first hit wins, so when one
/// key is a substring of another the earlier entry is chosen.
pub fn exact_match(input: &StageInput<'_>, mut entities: Entities) -> Entities {
    let text = input.utterance.normalized.as_str();
    if let Some(course) = first_contained(text, &input.vocabulary.courses) {
        entities.course = Some(course.to_string());
    }
    if let Some(teacher) = first_contained(text, &input.vocabulary.teachers) {
        entities.teacher = Some(teacher.to_string());
    }
    entities
}

fn first_contained<'a>(text: &str, map: &'a IndexMap<String, String>) -> Option<&'a str> {
    map.iter()
        .find(|(key, _)| !key.is_empty() && text.contains(key.as_str()))
        .map(|(_, canonical)| canonical.as_str())
}

/// Fuzzy fallback for course and teacher over the whole utterance.
pub fn fuzzy_match(input: &StageInput<'_>, mut entities: Entities) -> Entities {
    let text = input.utterance.normalized.as_str();
    let vocab = input.vocabulary;

    if entities.course.is_none() {
        entities.course = input.fuzzy.best_match(text, &vocab.courses).map(String::from);
    }
    if entities.teacher.is_none() {
        entities.teacher = input
            .fuzzy
            .best_match(text, &vocab.teachers)
            .or_else(|| input.fuzzy.best_match(text, &vocab.teachers_no_title))
            .map(String::from);
    }
    entities
}

/// Applies the adapter's entity spans in text order.
pub fn ner_pass(input: &StageInput<'_>, mut entities: Entities) -> Entities {
    let no_title = &input.vocabulary.teachers_no_title;

    for span in &input.utterance.doc.entities {
        match span.label {
            EntityLabel::Course => match input.fuzzy.best_match(&span.text, no_title) {
                Some(teacher) => {
                    debug!(span = %span.text, teacher, "Course span is a teacher name");
                    entities.teacher = Some(teacher.to_string());
                    entities.course = None;
                }
                None => entities.course = Some(span.text.clone()),
            },
            EntityLabel::Teacher => entities.teacher = Some(span.text.clone()),
            EntityLabel::Date => entities.day = Some(span.text.clone()),
            EntityLabel::Time => entities.time = Some(span.text.clone()),
            EntityLabel::Person if entities.teacher.is_none() => {
                entities.teacher = input.fuzzy.best_match(&span.text, no_title).map(String::from);
            }
            _ => {}
        }
    }
    entities
}

/// True when the utterance refers back to an earlier turn.
///
/// Single-word markers must match a whole token; multi-word markers are
/// matched as substrings of the normalized text.
pub fn is_followup(utterance: &Utterance, language: &LanguageConfig) -> bool {
    language.followup_markers.iter().any(|marker| {
        let marker = normalize_text(marker);
        if marker.contains(' ') {
            utterance.normalized.contains(&marker)
        } else {
            utterance.doc.tokens.iter().any(|t| t.lower == marker)
        }
    })
}

/// Backfills teacher and course from history, newest turn first.
///
/// Runs for follow-up questions and for turns with neither course nor
/// teacher. Each field takes the newest value found and is never overwritten
/// once set.
pub fn resolve_followup(input: &StageInput<'_>, mut entities: Entities) -> Entities {
    if !is_followup(input.utterance, input.language) && !entities.lacks_subject() {
        return entities;
    }

    for previous in input.history.recent_entities() {
        if entities.teacher.is_none() {
            entities.teacher = previous.teacher.clone();
        }
        if entities.course.is_none() {
            entities.course = previous.course.clone();
        }
        if entities.teacher.is_some() && entities.course.is_some() {
            break;
        }
    }

    debug!(
        course = ?entities.course,
        teacher = ?entities.teacher,
        "Resolved follow-up from history"
    );
    entities
}

/// Weekday names from the lexicon override any NER day.
pub fn day_lexicon(input: &StageInput<'_>, mut entities: Entities) -> Entities {
    for token in &input.utterance.doc.tokens {
        if let Some(day) = input
            .lexicon
            .weekdays
            .iter()
            .find(|day| normalize_text(day) == token.lower)
        {
            entities.day = Some(day.clone());
        }
    }
    entities
}

/// Trigger keywords set their field to the matched text. A course keyword
/// never replaces a resolved teacher.
pub fn keyword_pass(input: &StageInput<'_>, mut entities: Entities) -> Entities {
    for hit in &input.utterance.keywords {
        match hit.category {
            KeywordCategory::Course if entities.teacher.is_some() => continue,
            KeywordCategory::Course => entities.course = Some(hit.text.clone()),
            KeywordCategory::Exam => entities.exam_type = Some(hit.text.clone()),
            KeywordCategory::Teacher => entities.teacher = Some(hit.text.clone()),
        }
    }
    entities
}

/// Known building identifiers, matched exactly against token text.
pub fn building_pass(input: &StageInput<'_>, mut entities: Entities) -> Entities {
    let tokens = &input.utterance.doc.tokens;

    for start in 0..tokens.len() {
        for building in &input.lexicon.buildings {
            let parts: Vec<&str> = building.split_whitespace().collect();
            let end = start + parts.len();
            if parts.is_empty() || end > tokens.len() {
                continue;
            }
            let hit = tokens[start..end]
                .iter()
                .zip(&parts)
                .all(|(token, part)| token.text == *part);
            if hit {
                entities.building = Some(building.clone());
            }
        }
    }
    entities
}

/// Sets the exam type from any token whose lemma is an exam keyword.
pub fn exam_type_pass(input: &StageInput<'_>, mut entities: Entities) -> Entities {
    for token in &input.utterance.doc.tokens {
        let lemma = normalize_text(&token.lemma);
        if let Some(keyword) = input
            .language
            .exam_keywords
            .iter()
            .find(|k| normalize_text(k) == lemma)
        {
            entities.exam_type = Some(keyword.to_lowercase());
        }
    }
    entities
}
