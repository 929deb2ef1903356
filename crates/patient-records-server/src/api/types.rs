//! Shared types for the API layer.

use std::sync::Arc;

use patient_records_core::{PatientStore, RecordsResult};

use crate::api::error::ApiError;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<PatientStore>,
}

impl ApiContext {
    pub fn new(store: PatientStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Run a store operation on the blocking pool.
    ///
    /// Every store call opens a SQLite connection and may wait on the
    /// busy timeout, so none of them run on the async workers.
    pub async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&PatientStore) -> RecordsResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))?
            .map_err(ApiError::from)
    }
}
