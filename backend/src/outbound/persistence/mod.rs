//! File-backed persistence adapters.
//!
//! The whole application state is one JSON document on disk. The store
//! replaces it atomically on every save and hands the fresh file to the
//! [`BackupManager`] for a rolling snapshot.

pub mod backup;
mod json_document_store;

pub use backup::{BACKUP_DIR, BackupEntry, BackupManager, DEFAULT_BACKUP_RETENTION};
pub use json_document_store::{DATABASE_FILE, JsonFileDocumentStore};
