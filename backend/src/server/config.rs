//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use recordkeeper::domain::TokenSigner;
use recordkeeper::outbound::persistence::DEFAULT_BACKUP_RETENTION;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) data_dir: PathBuf,
    pub(crate) backup_retention: usize,
    pub(crate) signer: TokenSigner,
}

impl ServerConfig {
    /// Construct a configuration with the default backup retention.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, data_dir: PathBuf, signer: TokenSigner) -> Self {
        Self {
            bind_addr,
            data_dir,
            backup_retention: DEFAULT_BACKUP_RETENTION,
            signer,
        }
    }

    /// Keep `retention` backup snapshots instead of the default.
    #[must_use]
    pub fn with_backup_retention(mut self, retention: usize) -> Self {
        self.backup_retention = retention;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
