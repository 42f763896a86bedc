//! Schedule loader.
//!
//! Reads a JSON array of row objects keyed by column name, validates that all
//! required columns exist and normalises time and date cells. Cells that cannot
//! be parsed become absent values; they never fail the load. An empty array
//! loads as an empty schedule.

use crate::error::{CoreError, Result};
use crate::store::ScheduleStore;
use crate::types::{ExamType, ScheduleRecord};
use chrono::{NaiveDate, NaiveTime};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns every schedule source must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "Course",
    "Teacher",
    "Day",
    "Time",
    "Room",
    "Exam Type",
    "Exam Date",
    "Exam Time",
];

const EXAM_DATE_FORMAT: &str = "%d.%m.%Y";

/// Loads and cleans the schedule file at `path`.
pub fn load_schedule(path: impl AsRef<Path>) -> Result<ScheduleStore> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CoreError::NotFound(path.to_path_buf()));
    }

    info!("Loading schedule from {}", path.display());
    let raw = std::fs::read_to_string(path)?;
    let store = load_schedule_from_str(&raw)?;
    info!("Loaded {} schedule rows", store.len());
    Ok(store)
}

/// Parses and cleans schedule rows from a JSON document.
pub fn load_schedule_from_str(raw: &str) -> Result<ScheduleStore> {
    let rows: Vec<Map<String, Value>> = serde_json::from_str(raw)?;
    if rows.is_empty() {
        warn!("Schedule source has no rows");
        return Ok(ScheduleStore::default());
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !rows.iter().any(|row| row.contains_key(**col)))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::MissingColumns(missing));
    }

    let records = rows.iter().map(clean_row).collect();
    Ok(ScheduleStore::new(records))
}

fn clean_row(row: &Map<String, Value>) -> ScheduleRecord {
    let cell = |name: &str| row.get(name).map(cell_text).unwrap_or_default();

    ScheduleRecord {
        course: cell("Course"),
        teacher: cell("Teacher"),
        day: cell("Day"),
        time: parse_time(&cell("Time")),
        room: cell("Room"),
        exam_type: ExamType::from_column(&cell("Exam Type")),
        exam_date: parse_exam_date(&cell("Exam Date")),
        exam_time: parse_time(&cell("Exam Time")),
    }
}

/// Renders a cell as text; null becomes the empty string.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Cleans a time cell: `.` separators become `:`, ranges keep their start,
/// then `HH:MM:SS` and `HH:MM` are tried in turn.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let cleaned = raw.replace('.', ":");
    let start = cleaned.split('-').next().unwrap_or_default().trim();

    let parsed = NaiveTime::parse_from_str(start, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(start, "%H:%M"))
        .ok();

    match parsed {
        Some(time) => debug!("Parsed time '{}' as {}", raw, time),
        None => warn!("Failed to parse time: '{}'", raw),
    }
    parsed
}

/// Parses a `DD.MM.YYYY` exam date.
pub fn parse_exam_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = NaiveDate::parse_from_str(raw, EXAM_DATE_FORMAT).ok();
    if parsed.is_none() {
        warn!("Failed to parse exam date: '{}'", raw);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {"Course": "CS101", "Teacher": "Dr. Ada Lovelace", "Day": "Pazartesi",
         "Time": "08.30-10.20", "Room": 201, "Exam Type": "Lecture",
         "Exam Date": null, "Exam Time": null},
        {"Course": "CS101", "Teacher": "Dr. Ada Lovelace", "Day": "",
         "Time": "", "Room": "", "Exam Type": "Midterm",
         "Exam Date": "12.11.2024", "Exam Time": "13:30:00"},
        {"Course": "MATH201", "Teacher": "-", "Day": "Salı",
         "Time": "sometime", "Room": "UZEM", "Exam Type": "Seminar",
         "Exam Date": "not a date", "Exam Time": ""}
    ]"#;

    #[test]
    fn test_load_and_clean() {
        let store = load_schedule_from_str(SAMPLE).unwrap();
        assert_eq!(store.len(), 3);

        let lecture = &store.records()[0];
        assert_eq!(lecture.room, "201");
        assert_eq!(lecture.time, NaiveTime::from_hms_opt(8, 30, 0));
        assert_eq!(lecture.exam_type, ExamType::Lecture);
        assert_eq!(lecture.exam_date, None);

        let exam = &store.records()[1];
        assert_eq!(exam.exam_type, ExamType::Midterm);
        assert_eq!(exam.exam_date, NaiveDate::from_ymd_opt(2024, 11, 12));
        assert_eq!(exam.exam_time, NaiveTime::from_hms_opt(13, 30, 0));

        let other = &store.records()[2];
        assert_eq!(other.time, None);
        assert_eq!(other.exam_date, None);
        assert_eq!(other.exam_type, ExamType::Other("Seminar".to_string()));
        assert_eq!(other.teacher, "-");
    }

    #[test]
    fn test_missing_columns_are_reported() {
        let raw = r#"[{"Course": "CS101", "Teacher": "X", "Day": "Monday", "Time": "09:00"}]"#;
        match load_schedule_from_str(raw) {
            Err(CoreError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["Room", "Exam Type", "Exam Date", "Exam Time"]);
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_source_is_an_empty_store() {
        let store = load_schedule_from_str("[]").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            load_schedule_from_str("{not json"),
            Err(CoreError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_schedule("/nonexistent/schedule.json").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let store = load_schedule(file.path()).unwrap();
        assert_eq!(store.courses(), vec!["CS101", "MATH201"]);
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("09:00"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parse_time("09:00:30"), NaiveTime::from_hms_opt(9, 0, 30));
        assert_eq!(parse_time("08:00-10:00"), NaiveTime::from_hms_opt(8, 0, 0));
        assert_eq!(parse_time("14.15"), NaiveTime::from_hms_opt(14, 15, 0));
        assert_eq!(parse_time("25:99"), None);
        assert_eq!(parse_time(""), None);
    }

    #[test]
    fn test_parse_exam_date() {
        assert_eq!(parse_exam_date("01.06.2025"), NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(parse_exam_date("2025-06-01"), None);
    }
}
