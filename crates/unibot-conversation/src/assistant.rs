//! Startup wiring of the shared, read-only resources.

use crate::dispatch::ResponseEngine;
use crate::session::Session;
use crate::Result;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;
use tracing::info;
use unibot_core::{load_schedule, AppConfig, ScheduleStore};
use unibot_nlp::{
    BackendRegistry, EntityExtractor, EntityVocabulary, IntentPredictor, PatternIntentClassifier,
};

/// Schedule, vocabulary, language adapters and intent predictor, built once.
///
/// Cloning is cheap; every clone shares the same resources. Each session
/// created from it owns its own conversation context.
#[derive(Clone)]
pub struct Assistant {
    config: Arc<AppConfig>,
    store: Arc<ScheduleStore>,
    extractor: Arc<EntityExtractor>,
    engine: Arc<ResponseEngine>,
}

impl Assistant {
    /// Loads the schedule and builds every component from configuration.
    ///
    /// Any failure (missing data file, missing columns, unknown backend,
    /// unreadable classifier patterns) aborts startup.
    pub fn bootstrap(config: &AppConfig) -> Result<Self> {
        info!(path = %config.data.schedule_path.display(), "Bootstrapping assistant");

        let store = load_schedule(&config.data.schedule_path)?;
        let predictor = PatternIntentClassifier::from_config(&config.classifier)?;

        Self::with_components(
            config,
            store,
            &BackendRegistry::with_builtins(),
            Arc::new(predictor),
        )
    }

    /// Builds the assistant from an already loaded store and explicit
    /// backends and predictor.
    pub fn with_components(
        config: &AppConfig,
        store: ScheduleStore,
        registry: &BackendRegistry,
        predictor: Arc<dyn IntentPredictor>,
    ) -> Result<Self> {
        let store = Arc::new(store);
        let vocabulary = Arc::new(EntityVocabulary::build(
            &store,
            &config.matching.title_prefixes,
        ));
        let extractor = EntityExtractor::new(config, Arc::clone(&vocabulary), registry)?;
        let engine = ResponseEngine::new(Arc::clone(&store), vocabulary, predictor);

        info!(records = store.len(), "Assistant ready");

        Ok(Self {
            config: Arc::new(config.clone()),
            store,
            extractor: Arc::new(extractor),
            engine: Arc::new(engine),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    pub fn vocabulary(&self) -> &EntityVocabulary {
        self.extractor.vocabulary()
    }

    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    /// Starts a session with an entropy-seeded random source.
    pub fn new_session(&self) -> Session {
        self.session_with_rng(Box::new(StdRng::from_entropy()))
    }

    /// Starts a session drawing canned replies from `rng`.
    pub fn session_with_rng(&self, rng: Box<dyn RngCore + Send>) -> Session {
        Session::new(
            Arc::clone(&self.extractor),
            Arc::clone(&self.engine),
            self.config.conversation.history_limit,
            rng,
        )
    }
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("records", &self.store.len())
            .field("extractor", &self.extractor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConversationError;
    use std::io::Write;
    use unibot_core::CoreError;
    use unibot_nlp::NlpError;

    #[test]
    fn test_missing_data_file_is_fatal() {
        let config = AppConfig::default().with_schedule_path("/nonexistent/schedule.json");
        let err = Assistant::bootstrap(&config).unwrap_err();
        assert!(matches!(err, ConversationError::Core(CoreError::NotFound(_))));
    }

    #[test]
    fn test_missing_columns_are_fatal() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"Course": "CS101", "Teacher": "-"}}]"#).unwrap();

        let config = AppConfig::default().with_schedule_path(file.path());
        let err = Assistant::bootstrap(&config).unwrap_err();
        assert!(matches!(err, ConversationError::Core(CoreError::MissingColumns(_))));
    }

    #[test]
    fn test_unknown_backend_is_fatal() {
        let mut config = AppConfig::default();
        if let Some(tr) = config.languages.get_mut("tr") {
            tr.backend = "tr_core_news_trf".to_string();
        }
        let err = Assistant::with_components(
            &config,
            ScheduleStore::default(),
            &BackendRegistry::with_builtins(),
            Arc::new(PatternIntentClassifier::new()),
        )
        .unwrap_err();
        assert!(matches!(err, ConversationError::Nlp(NlpError::BackendUnavailable(_))));
    }
}
