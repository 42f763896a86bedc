//! Entity vocabulary index.
//!
//! Maps normalized course and teacher names to their canonical spelling.
//! Built once from the schedule store and read-only afterwards. Map order is
//! the order in which names first appear in the dataset.

use crate::normalize::normalize_text;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};
use unibot_core::ScheduleStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityVocabulary {
    /// normalized course name -> canonical course name
    pub courses: IndexMap<String, String>,
    /// normalized teacher name (with titles) -> canonical teacher name
    pub teachers: IndexMap<String, String>,
    /// normalized teacher name (title stripped) -> canonical teacher name
    pub teachers_no_title: IndexMap<String, String>,
}

impl EntityVocabulary {
    /// Builds the three lookup tables from the store.
    pub fn build(store: &ScheduleStore, title_prefixes: &[String]) -> Self {
        let courses = index(
            "course",
            store
                .courses()
                .into_iter()
                .filter(|c| !c.is_empty())
                .map(|c| (normalize_text(c), c.to_string())),
        );

        let teacher_names = store.teachers();

        let teachers = index(
            "teacher",
            teacher_names
                .iter()
                .map(|t| (normalize_text(t), t.to_string())),
        );

        let teachers_no_title = index(
            "teacher",
            teacher_names
                .iter()
                .map(|t| (normalize_text(strip_title(t, title_prefixes)), t.to_string())),
        );

        info!(
            courses = courses.len(),
            teachers = teachers.len(),
            "Built entity vocabulary"
        );

        Self {
            courses,
            teachers,
            teachers_no_title,
        }
    }

    /// Canonical course names in vocabulary order.
    pub fn course_names(&self) -> impl Iterator<Item = &str> {
        self.courses.values().map(String::as_str)
    }

    /// Canonical teacher names in vocabulary order.
    pub fn teacher_names(&self) -> impl Iterator<Item = &str> {
        self.teachers.values().map(String::as_str)
    }

    pub fn has_course(&self, canonical: &str) -> bool {
        self.course_names().any(|c| c == canonical)
    }

    /// Canonical course names that contain `fragment` verbatim.
    pub fn courses_containing(&self, fragment: &str) -> Vec<&str> {
        self.course_names().filter(|c| c.contains(fragment)).collect()
    }
}

/// Removes the first matching honorific prefix, if any, and trims the rest.
///
/// Prefixes are tried in the given priority order and only ever removed from
/// the start of the name; at most one prefix is stripped.
pub fn strip_title<'a>(name: &'a str, title_prefixes: &[String]) -> &'a str {
    title_prefixes
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix.as_str()))
        .map(str::trim)
        .unwrap_or(name)
}

/// Collects `(key, canonical)` pairs; a repeated key keeps the later name.
fn index(
    kind: &str,
    pairs: impl Iterator<Item = (String, String)>,
) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for (key, canonical) in pairs {
        if let Some(previous) = map.insert(key.clone(), canonical.clone()) {
            if previous != canonical {
                warn!(kind, key = %key, %previous, %canonical, "Names share a lookup key");
            }
        }
    }
    map
}
