//! Application configuration loaded via OrthoConfig.
//!
//! Values layer from defaults, a configuration file, `RECORDKEEPER_*`
//! environment variables and command-line flags.

use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_TOKEN_TTL_HOURS;
use crate::outbound::persistence::DEFAULT_BACKUP_RETENTION;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5001";
const DEFAULT_DATA_DIR: &str = "data";

/// Server, storage and token settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECORDKEEPER")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// Directory holding `database.json` and `backups/`.
    pub data_dir: Option<PathBuf>,
    /// Number of backup snapshots kept.
    pub backup_retention: Option<usize>,
    /// Token lifetime in hours.
    pub token_ttl_hours: Option<i64>,
    /// File containing the token signing secret.
    pub token_secret_file: Option<PathBuf>,
    /// Allow a random per-process signing secret when no file is readable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
}

impl AppSettings {
    /// The configured listen address, defaulting to `0.0.0.0:5001`.
    ///
    /// # Errors
    /// Returns the parse error for a malformed address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR).parse()
    }

    /// Data directory, defaulting to `data`.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    /// Snapshots kept, defaulting to ten.
    #[must_use]
    pub fn backup_retention(&self) -> usize {
        self.backup_retention.unwrap_or(DEFAULT_BACKUP_RETENTION)
    }

    /// Token lifetime; non-positive values fall back to the default.
    #[must_use]
    pub fn token_ttl(&self) -> TimeDelta {
        let hours = self
            .token_ttl_hours
            .filter(|hours| *hours > 0)
            .unwrap_or(DEFAULT_TOKEN_TTL_HOURS);
        TimeDelta::try_hours(hours).unwrap_or_else(|| TimeDelta::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    /// Configured secret file, if any.
    #[must_use]
    pub fn token_secret_file(&self) -> Option<&Path> {
        self.token_secret_file.as_deref()
    }
}
