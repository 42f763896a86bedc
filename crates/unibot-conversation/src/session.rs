//! Per-user conversation session.

use crate::context::{ConversationContext, ExportFormat};
use crate::dispatch::ResponseEngine;
use crate::Result;
use rand::RngCore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use unibot_core::SessionId;
use unibot_nlp::{Entities, EntityExtractor, Intent};

/// Outcome of one successfully processed turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub intent: Intent,
    pub entities: Entities,
    pub response: String,
}

/// A single conversation.
///
/// Turns are processed strictly one after another; the session exclusively
/// owns its context, so no locking is involved.
pub struct Session {
    id: SessionId,
    extractor: Arc<EntityExtractor>,
    engine: Arc<ResponseEngine>,
    context: ConversationContext,
    rng: Box<dyn RngCore + Send>,
}

impl Session {
    pub fn new(
        extractor: Arc<EntityExtractor>,
        engine: Arc<ResponseEngine>,
        history_limit: usize,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let id = SessionId::new();
        info!(session_id = %id, "Session started");
        Self {
            id,
            extractor,
            engine,
            context: ConversationContext::new(history_limit),
            rng,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    /// Resolves the entities of `text`, using this session's history.
    pub fn extract_entities(&self, text: &str) -> Result<Entities> {
        Ok(self.extractor.extract(text, &self.context)?)
    }

    /// Classifies `text`, records the turn and formats the answer.
    pub fn generate_response(&mut self, text: &str, entities: &Entities) -> Result<String> {
        self.engine
            .respond(text, entities, &mut self.context, self.rng.as_mut())
    }

    /// Extracts entities and answers in one step.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn ask(&mut self, text: &str) -> Result<Reply> {
        let entities = self.extract_entities(text)?;
        let response = self.generate_response(text, &entities)?;
        let intent = self
            .context
            .last_interaction()
            .map(|turn| turn.intent)
            .unwrap_or(Intent::Unknown);

        Ok(Reply {
            intent,
            entities,
            response,
        })
    }

    /// Answers `text`, turning any failure into a user-facing error line.
    ///
    /// The session stays usable after an error.
    pub fn handle_turn(&mut self, text: &str) -> String {
        match self.ask(text) {
            Ok(reply) => reply.response,
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Turn failed");
                format!("⚠️ Error: {}", e)
            }
        }
    }

    pub fn export_history(&self, format: ExportFormat) -> Result<String> {
        self.context.export(format)
    }

    /// Clears the conversation context.
    pub fn reset(&mut self) {
        self.context.clear();
        info!(session_id = %self.id, "Session reset");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("turns", &self.context.len())
            .finish()
    }
}
