//! Serialised access to the document.
//!
//! Every read and every load-mutate-persist cycle runs under one async lock,
//! so concurrent requests never interleave and no update is lost.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::error;

use super::Document;
use super::Error;
use super::ports::DocumentStore;

/// Message returned to clients when the document cannot be saved.
pub const SAVE_FAILED_MESSAGE: &str = "failed to save";

/// Owns the document store and the lock guarding it.
pub struct DocumentCoordinator {
    store: Arc<dyn DocumentStore>,
    lock: Mutex<()>,
}

impl DocumentCoordinator {
    /// Wrap a document store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Load the document and project a value from it.
    pub async fn read<T>(&self, view: impl FnOnce(&Document) -> T) -> T {
        let _guard = self.lock.lock().await;
        let document = self.store.load().await;
        view(&document)
    }

    /// Load the document, apply `change`, then persist the result.
    ///
    /// When `change` fails nothing is written and its error is returned
    /// unchanged. A failed write surfaces as an internal error.
    pub async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Document) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let _guard = self.lock.lock().await;
        let mut document = self.store.load().await;
        let outcome = change(&mut document)?;
        self.store.persist(&document).await.map_err(|err| {
            error!(error = %err, "document persist failed");
            Error::internal(SAVE_FAILED_MESSAGE)
        })?;
        Ok(outcome)
    }
}
