//! Port abstraction for the document persistence adapter and its errors.
//!
//! The store owns the whole-document lifecycle: reading the data file,
//! falling back to the seeded document when it is missing or unreadable,
//! atomically writing updates and triggering backup snapshots. Callers never
//! see partial writes.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use crate::domain::Document;

/// Errors raised when persisting the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentPersistenceError {
    /// The document could not be encoded as JSON.
    #[error("failed to encode document: {message}")]
    Encode {
        /// Underlying failure.
        message: String,
    },
    /// Writing or replacing the data file failed.
    #[error("failed to write document: {message}")]
    Write {
        /// Underlying failure.
        message: String,
    },
    /// The blocking I/O worker panicked or was cancelled.
    #[error("document store worker failed: {message}")]
    Worker {
        /// Underlying failure.
        message: String,
    },
}

impl DocumentPersistenceError {
    /// Build an [`Self::Encode`] error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Build a [`Self::Write`] error.
    #[must_use]
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    /// Build a [`Self::Worker`] error.
    #[must_use]
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }
}

/// Whole-document persistence.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the current document.
    ///
    /// Never fails: a missing or unreadable file yields the seeded document.
    async fn load(&self) -> Document;

    /// Replace the stored document. On error the previous file is intact.
    async fn persist(&self, document: &Document) -> Result<(), DocumentPersistenceError>;
}

/// In-memory document store for tests and local wiring.
///
/// Persist failures can be injected to exercise error paths.
#[derive(Debug)]
pub struct FixtureDocumentStore {
    document: Mutex<Document>,
    fail_persist: AtomicBool,
    persist_count: AtomicUsize,
}

impl FixtureDocumentStore {
    /// Start from the supplied document.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document: Mutex::new(document),
            fail_persist: AtomicBool::new(false),
            persist_count: AtomicUsize::new(0),
        }
    }

    /// Make subsequent persists fail (or succeed again).
    pub fn set_fail_persist(&self, fail: bool) {
        self.fail_persist.store(fail, Ordering::SeqCst);
    }

    /// Number of successful persists so far.
    #[must_use]
    pub fn persist_count(&self) -> usize {
        self.persist_count.load(Ordering::SeqCst)
    }

    /// Copy of the currently stored document.
    #[must_use]
    pub fn snapshot(&self) -> Document {
        self.document
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Default for FixtureDocumentStore {
    fn default() -> Self {
        Self::new(Document::seeded(Utc::now()))
    }
}

#[async_trait]
impl DocumentStore for FixtureDocumentStore {
    async fn load(&self) -> Document {
        self.snapshot()
    }

    async fn persist(&self, document: &Document) -> Result<(), DocumentPersistenceError> {
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(DocumentPersistenceError::write("injected persist failure"));
        }
        let mut guard = self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = document.clone();
        self.persist_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
