//! Recordkeeper entry-point: loads configuration, resolves the token secret
//! and serves the REST API.

mod server;

use std::io;

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use recordkeeper::domain::TokenSigner;
use recordkeeper::inbound::http::token_config::{BuildMode, resolve_token_secret};
use recordkeeper::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|e| io::Error::other(format!("invalid configuration: {e}")))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| io::Error::other(format!("invalid bind address: {e}")))?;

    let secret = resolve_token_secret(
        settings.token_secret_file(),
        settings.allow_ephemeral_secret,
        BuildMode::from_debug_assertions(),
    )
    .map_err(io::Error::other)?;
    info!(fingerprint = %secret.fingerprint(), "token secret loaded");

    let config = ServerConfig::new(
        bind_addr,
        settings.data_dir(),
        TokenSigner::new(secret, settings.token_ttl()),
    )
    .with_backup_retention(settings.backup_retention());
    info!(bind_addr = %config.bind_addr(), "starting server");

    create_server(config).await?.await
}
