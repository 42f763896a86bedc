//! Conversation context with bounded history and export capabilities

use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::str::FromStr;
use tracing::{debug, info};
use unibot_nlp::{Entities, Intent, TurnHistory};

/// Default number of turns kept in the history.
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// One completed turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub query: String,
    pub intent: Intent,
    pub entities: Entities,
    pub timestamp: DateTime<Utc>,
}

/// Export format for conversation history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    /// JSON format
    Json,
    /// Markdown format
    Markdown,
    /// Plain text format
    Text,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "md" | "markdown" => Ok(Self::Markdown),
            "txt" | "text" => Ok(Self::Text),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

/// Short-term memory of a single session.
///
/// Keeps the most recent interactions (oldest evicted first) and the last
/// course, teacher and day seen. The `last_*` values are sticky: a turn
/// without a value leaves the previous one in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationContext {
    history: VecDeque<Interaction>,
    limit: usize,
    last_course: Option<String>,
    last_teacher: Option<String>,
    last_day: Option<String>,
}

impl ConversationContext {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            history: VecDeque::with_capacity(limit + 1),
            limit,
            last_course: None,
            last_teacher: None,
            last_day: None,
        }
    }

    /// Appends a turn and refreshes the sticky values.
    pub fn record(&mut self, query: &str, intent: Intent, entities: &Entities) {
        self.history.push_back(Interaction {
            query: query.to_string(),
            intent,
            entities: entities.clone(),
            timestamp: Utc::now(),
        });
        while self.history.len() > self.limit {
            self.history.pop_front();
            debug!("Evicted oldest interaction");
        }

        if let Some(course) = &entities.course {
            self.last_course = Some(course.clone());
        }
        if let Some(teacher) = &entities.teacher {
            self.last_teacher = Some(teacher.clone());
        }
        if let Some(day) = &entities.day {
            self.last_day = Some(day.clone());
        }
    }

    /// Interactions, oldest first.
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &Interaction> {
        self.history.iter()
    }

    pub fn last_interaction(&self) -> Option<&Interaction> {
        self.history.back()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn last_course(&self) -> Option<&str> {
        self.last_course.as_deref()
    }

    pub fn last_teacher(&self) -> Option<&str> {
        self.last_teacher.as_deref()
    }

    pub fn last_day(&self) -> Option<&str> {
        self.last_day.as_deref()
    }

    /// Forgets every interaction and sticky value.
    pub fn clear(&mut self) {
        let count = self.history.len();
        *self = Self::new(self.limit);
        info!("Cleared {} interactions", count);
    }

    /// Renders the history in the requested format.
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        debug!(?format, interactions = self.history.len(), "Exporting history");
        match format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(&self.history)?),
            ExportFormat::Markdown => Ok(self.export_as_markdown()),
            ExportFormat::Text => Ok(self.export_as_text()),
        }
    }

    fn export_as_markdown(&self) -> String {
        let mut output = String::from("# Conversation History\n\n");

        for turn in &self.history {
            output.push_str(&format!(
                "## {} - {}\n\n{}\n\n{}\n\n---\n\n",
                turn.intent,
                turn.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                turn.query,
                describe_entities(&turn.entities)
                    .iter()
                    .map(|(name, value)| format!("- **{}**: {}", name, value))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ));
        }

        output
    }

    fn export_as_text(&self) -> String {
        let mut output = String::from("Conversation History\n");
        output.push_str(&"=".repeat(50));
        output.push_str("\n\n");

        for turn in &self.history {
            let entities = describe_entities(&turn.entities)
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!(
                "[{}] {}\n{}\n{}\n\n",
                turn.timestamp.format("%Y-%m-%d %H:%M:%S"),
                turn.intent.label().to_uppercase(),
                turn.query,
                entities
            ));
        }

        output
    }
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl TurnHistory for ConversationContext {
    fn recent_entities(&self) -> Vec<&Entities> {
        self.history.iter().rev().map(|turn| &turn.entities).collect()
    }
}

fn describe_entities(entities: &Entities) -> Vec<(&'static str, &str)> {
    [
        ("course", &entities.course),
        ("teacher", &entities.teacher),
        ("exam_type", &entities.exam_type),
        ("day", &entities.day),
        ("time", &entities.time),
        ("building", &entities.building),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
    .collect()
}
