//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    Document, PasswordDigest, Role, TokenSecret, TokenSigner, User, UserId, format_timestamp,
};

/// Username and password of the non-admin user added by [`document_with_clerk`].
pub const CLERK: (&str, &str) = ("clerk", "clerk-pass");

/// Fixed instant most tests start from.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0)
        .single()
        .unwrap_or_else(|| panic!("fixed timestamp is valid"))
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        self.advance(TimeDelta::seconds(seconds));
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Default for MutableClock {
    fn default() -> Self {
        Self::new(fixed_now())
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Signer with a fixed 32-byte secret and the default lifetime.
#[must_use]
pub fn test_signer() -> TokenSigner {
    TokenSigner::new(
        TokenSecret::new(b"recordkeeper-test-secret-32bytes".to_vec()),
        TimeDelta::hours(crate::domain::DEFAULT_TOKEN_TTL_HOURS),
    )
}

/// Seeded document plus one non-admin user named [`CLERK`].
#[must_use]
pub fn document_with_clerk(now: DateTime<Utc>) -> Document {
    let mut document = Document::seeded(now);
    let (username, password) = CLERK;
    let clerk = User::new(
        UserId::new("clerk").unwrap_or_else(|err| panic!("clerk id: {err}")),
        username,
        PasswordDigest::of(password),
        Role::User,
        format_timestamp(now),
    )
    .unwrap_or_else(|err| panic!("clerk user: {err}"));
    assert!(document.insert_user(clerk), "clerk is unique");
    document
}

/// Fresh temporary directory to use as a data directory.
#[must_use]
pub fn temp_data_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap_or_else(|err| panic!("temp dir: {err}"))
}

/// Shared clock handle for wiring services.
#[must_use]
pub fn shared_clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::default())
}

/// Capability-based file helpers for assertions on data directories.
pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! The crate avoids ambient `std::fs` calls; these helpers give test
    //! suites the same `cap_std::fs::Dir` based access the stores use.

    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    fn open_parent(path: &Path) -> io::Result<(Dir, &std::ffi::OsStr)> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        Ok((Dir::open_ambient_dir(parent, ambient_authority())?, name))
    }

    /// Read a UTF-8 text file.
    pub fn read_file_to_string(path: &Path) -> io::Result<String> {
        let (dir, name) = open_parent(path)?;
        dir.read_to_string(name)
    }

    /// Write `contents` to `path`, creating parent directories.
    pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            Dir::create_ambient_dir_all(parent, ambient_authority())?;
        }
        let (dir, name) = open_parent(path)?;
        dir.write(name, contents)
    }

    /// Sorted file names inside `dir_path`.
    pub fn list_file_names(dir_path: &Path) -> io::Result<Vec<String>> {
        let dir = Dir::open_ambient_dir(dir_path, ambient_authority())?;
        let mut names = Vec::new();
        for entry in dir.entries()? {
            let entry = entry?;
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
