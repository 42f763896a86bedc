//! # Unibot Core
//!
//! Core types shared by the Unibot workspace: the schedule data model, the
//! read-only schedule store, the schedule loader and application configuration.

pub mod config;
pub mod error;
pub mod loader;
pub mod store;
pub mod types;

pub use config::{
    AppConfig, ClassifierConfig, ConversationConfig, DataConfig, KeywordConfig, LanguageConfig,
    LexiconConfig, MatchingConfig,
};
pub use error::{CoreError, Result};
pub use loader::{load_schedule, load_schedule_from_str, REQUIRED_COLUMNS};
pub use store::{ScheduleQuery, ScheduleStore, SlotConflict};
pub use types::{format_clock, ExamCategory, ExamType, ScheduleRecord, SessionId, UNASSIGNED_TEACHER};
