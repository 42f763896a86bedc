//! Read-only schedule store.
//!
//! The store is built once from the loader's output and shared by every
//! session. All queries are exact-equality filters over the in-memory rows.

use crate::types::{ExamCategory, ExamType, ScheduleRecord, UNASSIGNED_TEACHER};
use chrono::NaiveTime;
use serde::Serialize;
use tracing::debug;

/// Filter over schedule rows. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleQuery {
    pub course: Option<String>,
    pub teacher: Option<String>,
    pub day: Option<String>,
    pub category: Option<ExamCategory>,
    pub exam_type: Option<ExamType>,
}

impl ScheduleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }

    pub fn teacher(mut self, teacher: impl Into<String>) -> Self {
        self.teacher = Some(teacher.into());
        self
    }

    pub fn day(mut self, day: impl Into<String>) -> Self {
        self.day = Some(day.into());
        self
    }

    pub fn maybe_day(mut self, day: Option<impl Into<String>>) -> Self {
        self.day = day.map(Into::into);
        self
    }

    pub fn category(mut self, category: ExamCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn exam_type(mut self, exam_type: ExamType) -> Self {
        self.exam_type = Some(exam_type);
        self
    }

    fn matches(&self, record: &ScheduleRecord) -> bool {
        self.course.as_ref().map_or(true, |c| &record.course == c)
            && self.teacher.as_ref().map_or(true, |t| &record.teacher == t)
            && self.day.as_ref().map_or(true, |d| &record.day == d)
            && self
                .category
                .map_or(true, |cat| record.exam_type.category() == Some(cat))
            && self
                .exam_type
                .as_ref()
                .map_or(true, |et| &record.exam_type == et)
    }
}

/// Lecture slot shared by more than one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotConflict {
    pub day: String,
    pub time: NaiveTime,
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleStore {
    records: Vec<ScheduleRecord>,
}

impl ScheduleStore {
    pub fn new(records: Vec<ScheduleRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ScheduleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns every row matching the query, in dataset order.
    pub fn filter(&self, query: &ScheduleQuery) -> Vec<&ScheduleRecord> {
        let rows: Vec<_> = self.records.iter().filter(|r| query.matches(r)).collect();
        debug!(?query, matched = rows.len(), "Filtered schedule");
        rows
    }

    /// Returns the rows whose exam type is exactly `exam_type`.
    pub fn by_exam_type(&self, exam_type: &ExamType) -> Vec<&ScheduleRecord> {
        self.records
            .iter()
            .filter(|r| &r.exam_type == exam_type)
            .collect()
    }

    /// Unique course names in first-appearance order.
    pub fn courses(&self) -> Vec<&str> {
        unique(self.records.iter().map(|r| r.course.as_str()))
    }

    /// Unique teacher names in first-appearance order, excluding the
    /// unassigned sentinel and empty cells.
    pub fn teachers(&self) -> Vec<&str> {
        unique(
            self.records
                .iter()
                .map(|r| r.teacher.as_str())
                .filter(|t| !t.is_empty() && *t != UNASSIGNED_TEACHER),
        )
    }

    /// Finds lecture slots (day + start time) used by more than one course.
    ///
    /// Days and times are reported in the order they first appear in the
    /// dataset. Rows without a time never conflict.
    pub fn find_conflicts(&self) -> Vec<SlotConflict> {
        let lectures: Vec<_> = self
            .records
            .iter()
            .filter(|r| r.exam_type == ExamType::Lecture)
            .collect();

        let mut conflicts = Vec::new();
        for day in unique(lectures.iter().map(|r| r.day.as_str())) {
            let day_rows: Vec<_> = lectures.iter().filter(|r| r.day == day).collect();
            for time in unique(day_rows.iter().filter_map(|r| r.time)) {
                let courses = unique(
                    day_rows
                        .iter()
                        .filter(|r| r.time == Some(time))
                        .map(|r| r.course.as_str()),
                );
                if courses.len() > 1 {
                    conflicts.push(SlotConflict {
                        day: day.to_string(),
                        time,
                        courses: courses.into_iter().map(String::from).collect(),
                    });
                }
            }
        }

        debug!(conflicts = conflicts.len(), "Scanned lecture slots");
        conflicts
    }
}

fn unique<T: PartialEq>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
