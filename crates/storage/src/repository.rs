use async_trait::async_trait;
use intake_core::model::{Response, ResponseKey};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable mirror of a session's accepted responses.
///
/// The in-session `ResponseStore` stays authoritative; a repository lets a
/// later run resume where the previous one stopped.
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Insert or replace the response for `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the response cannot be stored.
    async fn save_response(&self, key: &ResponseKey, response: &Response)
    -> Result<(), StorageError>;

    /// Fetch every stored response, ordered by section then index.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or decode failures.
    async fn load_responses(&self) -> Result<Vec<(ResponseKey, Response)>, StorageError>;

    /// Remove every stored response.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    responses: Arc<Mutex<BTreeMap<ResponseKey, Response>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseRepository for InMemoryRepository {
    async fn save_response(
        &self,
        key: &ResponseKey,
        response: &Response,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .responses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.clone(), response.clone());
        Ok(())
    }

    async fn load_responses(&self) -> Result<Vec<(ResponseKey, Response)>, StorageError> {
        let guard = self
            .responses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .map(|(key, response)| (key.clone(), response.clone()))
            .collect())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .responses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clear();
        Ok(())
    }
}

/// Repository handles behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub responses: Arc<dyn ResponseRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let responses: Arc<dyn ResponseRepository> = Arc::new(InMemoryRepository::new());
        Self { responses }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::model::FollowupAnswer;
    use intake_core::time::fixed_now;

    #[tokio::test]
    async fn save_replaces_existing_response() {
        let repo = InMemoryRepository::new();
        let key = ResponseKey::new("Company", 0);
        repo.save_response(&key, &Response::skipped(fixed_now()))
            .await
            .unwrap();
        let replacement = Response::new(
            "SQL",
            vec![FollowupAnswer::new("Which database?", "MySQL")],
            fixed_now(),
        );
        repo.save_response(&key, &replacement).await.unwrap();

        let loaded = repo.load_responses().await.unwrap();
        assert_eq!(loaded, vec![(key, replacement)]);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let storage = Storage::in_memory();
        storage
            .responses
            .save_response(&ResponseKey::new("Company", 1), &Response::skipped(fixed_now()))
            .await
            .unwrap();
        storage.responses.clear().await.unwrap();
        assert!(storage.responses.load_responses().await.unwrap().is_empty());
    }
}
