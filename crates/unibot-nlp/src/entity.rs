//! Extracted entity record.

use serde::{Deserialize, Serialize};

/// Entities resolved for a single user turn.
///
/// Every field is independent and may stay unset; the dispatch engine decides
/// what an absent value means for each intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    pub course: Option<String>,
    pub teacher: Option<String>,
    pub exam_type: Option<String>,
    pub day: Option<String>,
    pub time: Option<String>,
    pub building: Option<String>,
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }

    pub fn with_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.teacher = Some(teacher.into());
        self
    }

    pub fn with_day(mut self, day: impl Into<String>) -> Self {
        self.day = Some(day.into());
        self
    }

    pub fn with_exam_type(mut self, exam_type: impl Into<String>) -> Self {
        self.exam_type = Some(exam_type.into());
        self
    }

    /// True when neither a course nor a teacher was resolved.
    pub fn lacks_subject(&self) -> bool {
        self.course.is_none() && self.teacher.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Read access to previous turns' entities, newest first.
///
/// Implemented by the conversation context so the extraction pipeline can
/// resolve follow-up questions without depending on the conversation crate.
pub trait TurnHistory {
    fn recent_entities(&self) -> Vec<&Entities>;
}

/// A plain slice is treated as oldest-first history.
impl TurnHistory for [Entities] {
    fn recent_entities(&self) -> Vec<&Entities> {
        self.iter().rev().collect()
    }
}

impl TurnHistory for Vec<Entities> {
    fn recent_entities(&self) -> Vec<&Entities> {
        self.as_slice().recent_entities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_entities() {
        let entities = Entities::new();
        assert!(entities.is_empty());
        assert!(entities.lacks_subject());
    }

    #[test]
    fn test_builders() {
        let entities = Entities::new().with_course("CS101").with_day("Cuma");
        assert!(!entities.lacks_subject());
        assert_eq!(entities.day.as_deref(), Some("Cuma"));
    }

    #[test]
    fn test_slice_history_is_newest_first() {
        let history = vec![
            Entities::new().with_course("OLD"),
            Entities::new().with_course("NEW"),
        ];
        let recent = history.recent_entities();
        assert_eq!(recent[0].course.as_deref(), Some("NEW"));
    }
}
