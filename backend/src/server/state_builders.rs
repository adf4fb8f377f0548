//! Wiring of the document store, coordinator and services behind the HTTP
//! state.

use std::sync::Arc;

use actix_web::web;
use mockable::Clock;
use tracing::info;

use recordkeeper::domain::{AuthGate, CollectionService, DocumentCoordinator};
use recordkeeper::inbound::http::state::HttpState;
use recordkeeper::outbound::persistence::JsonFileDocumentStore;

use super::ServerConfig;

/// Open the data directory and build the handler state over it.
///
/// The document is loaded once so a missing data file is seeded before the
/// first request.
///
/// # Errors
/// Returns [`std::io::Error`] when the data or backup directory cannot be
/// created or opened.
pub(super) async fn build_http_state(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> std::io::Result<web::Data<HttpState>> {
    let store = JsonFileDocumentStore::open(&config.data_dir, config.backup_retention, clock.clone())?;
    let documents = Arc::new(DocumentCoordinator::new(Arc::new(store)));
    let users = documents.read(|document| document.users().len()).await;
    info!(
        data_dir = %config.data_dir.display(),
        users,
        backup_retention = config.backup_retention,
        "document store ready"
    );

    let auth = AuthGate::new(documents.clone(), config.signer.clone(), clock.clone());
    let collections = CollectionService::new(documents, clock);
    Ok(web::Data::new(HttpState::new(
        Arc::new(auth),
        Arc::new(collections),
    )))
}
