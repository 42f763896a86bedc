use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Teacher cell value meaning "no instructor assigned".
pub const UNASSIGNED_TEACHER: &str = "-";

// Newtype wrappers for type safety

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Schedule types

/// Kind of schedule row.
///
/// `Lecture` rows are recurring weekly slots; the exam kinds are one-off dated
/// events. Anything the loader does not recognise is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamType {
    Lecture,
    Midterm,
    Final,
    Makeup,
    Other(String),
}

/// Coarse grouping used by the dispatch engine when filtering rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamCategory {
    /// Weekly lecture slots
    Lecture,
    /// Midterm, final and makeup exams
    Exam,
}

impl ExamType {
    /// Maps a raw "Exam Type" cell to its variant. Matching is exact.
    pub fn from_column(value: &str) -> Self {
        match value.trim() {
            "Lecture" => Self::Lecture,
            "Midterm" => Self::Midterm,
            "Final" => Self::Final,
            "Makeup" => Self::Makeup,
            other => Self::Other(other.to_string()),
        }
    }

    /// Resolves a user-facing exam keyword (English or Turkish lemma).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_lowercase().as_str() {
            "lecture" | "ders" => Some(Self::Lecture),
            "midterm" | "vize" => Some(Self::Midterm),
            "final" => Some(Self::Final),
            "makeup" | "bütünleme" | "butunleme" => Some(Self::Makeup),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Lecture => "Lecture",
            Self::Midterm => "Midterm",
            Self::Final => "Final",
            Self::Makeup => "Makeup",
            Self::Other(raw) => raw,
        }
    }

    pub fn category(&self) -> Option<ExamCategory> {
        match self {
            Self::Lecture => Some(ExamCategory::Lecture),
            Self::Midterm | Self::Final | Self::Makeup => Some(ExamCategory::Exam),
            Self::Other(_) => None,
        }
    }

    pub fn is_exam(&self) -> bool {
        self.category() == Some(ExamCategory::Exam)
    }
}

impl std::fmt::Display for ExamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cleaned row of the course schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    #[serde(rename = "Course")]
    pub course: String,
    #[serde(rename = "Teacher")]
    pub teacher: String,
    #[serde(rename = "Day")]
    pub day: String,
    #[serde(rename = "Time")]
    pub time: Option<NaiveTime>,
    #[serde(rename = "Room")]
    pub room: String,
    #[serde(rename = "Exam Type")]
    pub exam_type: ExamType,
    #[serde(rename = "Exam Date")]
    pub exam_date: Option<NaiveDate>,
    #[serde(rename = "Exam Time")]
    pub exam_time: Option<NaiveTime>,
}

impl ScheduleRecord {
    /// Creates a lecture row with no exam fields.
    pub fn lecture(
        course: impl Into<String>,
        teacher: impl Into<String>,
        day: impl Into<String>,
        time: Option<NaiveTime>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            course: course.into(),
            teacher: teacher.into(),
            day: day.into(),
            time,
            room: room.into(),
            exam_type: ExamType::Lecture,
            exam_date: None,
            exam_time: None,
        }
    }

    /// Creates an exam row for the given course.
    pub fn exam(
        course: impl Into<String>,
        teacher: impl Into<String>,
        exam_type: ExamType,
        exam_date: Option<NaiveDate>,
        exam_time: Option<NaiveTime>,
    ) -> Self {
        Self {
            course: course.into(),
            teacher: teacher.into(),
            day: String::new(),
            time: None,
            room: String::new(),
            exam_type,
            exam_date,
            exam_time,
        }
    }

    pub fn has_teacher(&self) -> bool {
        !self.teacher.is_empty() && self.teacher != UNASSIGNED_TEACHER
    }
}

/// Renders a wall-clock value as `HH:MM`, or "time not set".
pub fn format_clock(time: Option<NaiveTime>) -> String {
    match time {
        Some(t) => t.format("%H:%M").to_string(),
        None => "time not set".to_string(),
    }
}
