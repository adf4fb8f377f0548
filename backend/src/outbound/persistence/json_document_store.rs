//! [`DocumentStore`] backed by a single pretty-printed JSON file.
//!
//! Layout under the data directory:
//!
//! ```text
//! <data_dir>/database.json
//! <data_dir>/backups/backup_YYYYmmdd_HHMMSS.json
//! ```
//!
//! Writes go to a uniquely named staging file that is renamed over
//! `database.json`, so readers never observe a partial document. File I/O
//! runs on the blocking pool.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use mockable::Clock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::Document;
use crate::domain::ports::{DocumentPersistenceError, DocumentStore};

use super::backup::BackupManager;

/// File name of the primary document inside the data directory.
pub const DATABASE_FILE: &str = "database.json";

enum LoadOutcome {
    Loaded(Document),
    Missing,
    Unreadable(String),
}

struct DocumentFiles {
    dir: Dir,
    backups: BackupManager,
}

impl DocumentFiles {
    fn read(&self) -> LoadOutcome {
        let contents = match self.dir.read_to_string(DATABASE_FILE) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return LoadOutcome::Missing,
            Err(error) => return LoadOutcome::Unreadable(error.to_string()),
        };
        match serde_json::from_str(&contents) {
            Ok(document) => LoadOutcome::Loaded(document),
            Err(error) => LoadOutcome::Unreadable(error.to_string()),
        }
    }

    fn write(&self, contents: &str) -> Result<(), DocumentPersistenceError> {
        let staging = format!(".{DATABASE_FILE}.{}.tmp", Uuid::new_v4().simple());
        self.write_staging(&staging, contents)
            .and_then(|()| self.dir.rename(&staging, &self.dir, DATABASE_FILE))
            .map_err(|error| {
                drop(self.dir.remove_file(&staging));
                DocumentPersistenceError::write(format!("{DATABASE_FILE}: {error}"))
            })?;
        self.backups.snapshot(&self.dir, DATABASE_FILE);
        Ok(())
    }

    fn write_staging(&self, name: &str, contents: &str) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        let mut file = self.dir.open_with(name, &options)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    }
}

/// JSON file store with rolling backups.
#[derive(Clone)]
pub struct JsonFileDocumentStore {
    files: Arc<DocumentFiles>,
    clock: Arc<dyn Clock>,
}

impl JsonFileDocumentStore {
    /// Open (creating if needed) `data_dir` and its backup directory.
    ///
    /// # Errors
    /// Returns the I/O error when either directory cannot be created or
    /// opened.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use recordkeeper::outbound::persistence::JsonFileDocumentStore;
    ///
    /// let tmp = tempfile::tempdir().unwrap();
    /// let store = JsonFileDocumentStore::open(tmp.path(), 10, Arc::new(DefaultClock)).unwrap();
    /// assert_eq!(store.backups().retention(), 10);
    /// ```
    pub fn open(data_dir: &Path, retention: usize, clock: Arc<dyn Clock>) -> io::Result<Self> {
        Dir::create_ambient_dir_all(data_dir, ambient_authority())?;
        let dir = Dir::open_ambient_dir(data_dir, ambient_authority())?;
        let backups = BackupManager::open(&dir, retention, clock.clone())?;
        Ok(Self {
            files: Arc::new(DocumentFiles { dir, backups }),
            clock,
        })
    }

    /// The backup manager snapshotting this store's file.
    #[must_use]
    pub fn backups(&self) -> &BackupManager {
        &self.files.backups
    }
}

#[async_trait]
impl DocumentStore for JsonFileDocumentStore {
    async fn load(&self) -> Document {
        let files = self.files.clone();
        let outcome = match tokio::task::spawn_blocking(move || files.read()).await {
            Ok(outcome) => outcome,
            Err(error) => LoadOutcome::Unreadable(error.to_string()),
        };
        match outcome {
            LoadOutcome::Loaded(document) => document,
            LoadOutcome::Missing => {
                let document = Document::seeded(self.clock.utc());
                match self.persist(&document).await {
                    Ok(()) => info!(file = DATABASE_FILE, "created default data file"),
                    Err(error) => warn!(error = %error, "writing default data file failed"),
                }
                document
            }
            LoadOutcome::Unreadable(reason) => {
                warn!(
                    file = DATABASE_FILE,
                    reason = %reason,
                    "data file unreadable; serving default document without overwriting"
                );
                Document::seeded(self.clock.utc())
            }
        }
    }

    async fn persist(&self, document: &Document) -> Result<(), DocumentPersistenceError> {
        let contents = serde_json::to_string_pretty(document)
            .map_err(|error| DocumentPersistenceError::encode(error.to_string()))?;
        let files = self.files.clone();
        tokio::task::spawn_blocking(move || files.write(&contents))
            .await
            .map_err(|error| DocumentPersistenceError::worker(error.to_string()))?
    }
}
