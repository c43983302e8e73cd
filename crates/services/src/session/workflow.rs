use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use intake_core::Clock;
use intake_core::model::{QuestionBank, ResponseStore};
use storage::repository::{InMemoryRepository, ResponseRepository};

use super::controller::{Outcome, SessionController};
use crate::classifier::AdequacyClassifier;
use crate::error::{ReportError, SessionError};
use crate::report::write_report;

/// Orchestrates session resume, response persistence and export.
#[derive(Clone)]
pub struct QuestionnaireService {
    clock: Clock,
    responses: Arc<dyn ResponseRepository>,
    classifier: Arc<dyn AdequacyClassifier>,
}

impl QuestionnaireService {
    #[must_use]
    pub fn new(
        clock: Clock,
        responses: Arc<dyn ResponseRepository>,
        classifier: Arc<dyn AdequacyClassifier>,
    ) -> Self {
        Self {
            clock,
            responses,
            classifier,
        }
    }

    #[must_use]
    pub fn in_memory(clock: Clock, classifier: Arc<dyn AdequacyClassifier>) -> Self {
        Self::new(clock, Arc::new(InMemoryRepository::new()), classifier)
    }

    /// Build a controller seeded with every stored response that still
    /// matches a question in `bank`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if stored responses cannot be read.
    pub async fn resume(&self, bank: Arc<QuestionBank>) -> Result<SessionController, SessionError> {
        let mut store = ResponseStore::new();
        for (key, response) in self.responses.load_responses().await? {
            if bank.question(&key.section, key.index).is_none() {
                warn!(%key, "ignoring stored response for unknown question");
                continue;
            }
            store.commit(key, response);
        }
        info!(restored = store.len(), "session resumed");
        Ok(SessionController::with_store(
            bank,
            store,
            Arc::clone(&self.classifier),
            self.clock,
        ))
    }

    /// Write the response committed by `outcome`, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoResponse` if the committed key is missing
    /// from the controller and `SessionError::Storage` on write failures.
    pub async fn persist(
        &self,
        controller: &SessionController,
        outcome: &Outcome,
    ) -> Result<(), SessionError> {
        let Some(key) = &outcome.committed else {
            return Ok(());
        };
        let response = controller
            .store()
            .get(key)
            .ok_or_else(|| SessionError::NoResponse(key.clone()))?;
        self.responses.save_response(key, response).await?;
        debug!(%key, "response persisted");
        Ok(())
    }

    /// Forget every stored response, then reset the session.
    ///
    /// The session is left untouched when the repository cannot be cleared.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the repository cannot be cleared.
    pub async fn restart(&self, controller: &mut SessionController) -> Result<Outcome, SessionError> {
        self.responses.clear().await?;
        Ok(controller.restart())
    }

    /// Export the controller's report into `dir`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the report cannot be written.
    pub fn export(&self, controller: &SessionController, dir: &Path) -> Result<PathBuf, ReportError> {
        write_report(&controller.report(), dir, self.clock.now())
    }
}
