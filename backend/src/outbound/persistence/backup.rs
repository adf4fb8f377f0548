//! Rolling snapshots of the data file.
//!
//! The manager holds a capability handle to the backup directory only, so
//! pruning can never reach the primary data file or anything else on disk.
//! Every failure is logged and absorbed: a missing snapshot never fails the
//! save that triggered it.

use std::cmp::Reverse;
use std::io;
use std::sync::Arc;
use std::time::SystemTime;

use cap_std::fs::Dir;
use mockable::Clock;
use tracing::{debug, warn};

/// Directory, relative to the data directory, holding snapshots.
pub const BACKUP_DIR: &str = "backups";
/// Snapshots kept after each prune unless configured otherwise.
pub const DEFAULT_BACKUP_RETENTION: usize = 10;

const BACKUP_PREFIX: &str = "backup_";
const BACKUP_SUFFIX: &str = ".json";
const BACKUP_NAME_FORMAT: &str = "backup_%Y%m%d_%H%M%S.json";

/// One snapshot file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    /// File name inside the backup directory.
    pub name: String,
    /// Last modification time, used for ordering.
    pub modified: SystemTime,
}

/// Copies the data file into the backup directory and prunes old copies.
pub struct BackupManager {
    dir: Dir,
    retention: usize,
    clock: Arc<dyn Clock>,
}

impl BackupManager {
    /// Manage snapshots inside `dir`.
    #[must_use]
    pub fn new(dir: Dir, retention: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir,
            retention,
            clock,
        }
    }

    /// Create (if needed) and open [`BACKUP_DIR`] under `data_dir`.
    ///
    /// # Errors
    /// Returns the I/O error when the directory cannot be created or opened.
    pub fn open(data_dir: &Dir, retention: usize, clock: Arc<dyn Clock>) -> io::Result<Self> {
        data_dir.create_dir_all(BACKUP_DIR)?;
        let dir = data_dir.open_dir(BACKUP_DIR)?;
        Ok(Self::new(dir, retention, clock))
    }

    /// Number of snapshots kept after pruning.
    #[must_use]
    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Copy `file_name` from `source` as `backup_<timestamp>.json`, then prune.
    ///
    /// A snapshot taken in the same second as the previous one replaces it.
    pub fn snapshot(&self, source: &Dir, file_name: &str) {
        let name = self.clock.utc().format(BACKUP_NAME_FORMAT).to_string();
        match source.copy(file_name, &self.dir, &name) {
            Ok(bytes) => debug!(backup = %name, bytes, "backup snapshot written"),
            Err(error) => warn!(backup = %name, error = %error, "backup snapshot failed"),
        }
        self.prune();
    }

    /// Snapshots, newest first.
    ///
    /// Ordered by modification time with the file name breaking ties.
    ///
    /// # Errors
    /// Returns the I/O error when the directory cannot be listed.
    pub fn list(&self) -> io::Result<Vec<BackupEntry>> {
        let mut entries = Vec::new();
        for entry in self.dir.entries()? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_backup_name(&name) {
                continue;
            }
            let modified = entry.metadata()?.modified()?.into_std();
            entries.push(BackupEntry { name, modified });
        }
        entries.sort_by_key(|entry| Reverse((entry.modified, entry.name.clone())));
        Ok(entries)
    }

    /// Delete all but the newest `retention` snapshots; returns how many
    /// were removed.
    pub fn prune(&self) -> usize {
        let entries = match self.list() {
            Ok(entries) => entries,
            Err(error) => {
                warn!(error = %error, "listing backups failed; skipping prune");
                return 0;
            }
        };
        let mut removed = 0;
        for entry in entries.into_iter().skip(self.retention) {
            match self.dir.remove_file(&entry.name) {
                Ok(()) => removed += 1,
                Err(error) => warn!(backup = %entry.name, error = %error, "removing backup failed"),
            }
        }
        if removed > 0 {
            debug!(removed, retention = self.retention, "pruned backups");
        }
        removed
    }
}

fn is_backup_name(name: &str) -> bool {
    name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_SUFFIX)
}
