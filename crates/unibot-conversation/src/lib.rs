//! # Unibot Conversation
//!
//! Conversation handling for the Unibot schedule assistant.
//!
//! ## Features
//!
//! - **Conversation Context**: bounded history of recent turns with sticky
//!   last course, teacher and day, exportable as JSON, Markdown or text
//! - **Intent Dispatch**: one handler per intent, selected through a lookup
//!   table, with fixed clarification and not-found replies
//! - **Sessions**: sequential turn processing with an error boundary that
//!   keeps the session alive after a failed turn
//!
//! ## Example
//!
//! ```rust,no_run
//! use unibot_conversation::Assistant;
//! use unibot_core::AppConfig;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let assistant = Assistant::bootstrap(&AppConfig::load()?)?;
//!     let mut session = assistant.new_session();
//!
//!     println!("{}", session.handle_turn("When is CS101?"));
//!     println!("{}", session.handle_turn("What about on Friday?"));
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod session;

pub use assistant::Assistant;
pub use context::{ConversationContext, ExportFormat, Interaction, DEFAULT_HISTORY_LIMIT};
pub use dispatch::{handler_table, DispatchInput, Handler, ResponseEngine};
pub use error::{ConversationError, Result};
pub use session::{Reply, Session};
