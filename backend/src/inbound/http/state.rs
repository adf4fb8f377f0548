//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without disk I/O.

use std::sync::Arc;

use crate::domain::{AuthGate, CollectionService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Login and bearer-token authentication.
    pub auth: Arc<AuthGate>,
    /// Record, settings and user listing operations.
    pub collections: Arc<CollectionService>,
}

impl HttpState {
    /// Construct state from the two application services.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use chrono::TimeDelta;
    /// use mockable::DefaultClock;
    /// use recordkeeper::domain::ports::FixtureDocumentStore;
    /// use recordkeeper::domain::{
    ///     AuthGate, CollectionService, DocumentCoordinator, TokenSecret, TokenSigner,
    /// };
    /// use recordkeeper::inbound::http::state::HttpState;
    ///
    /// let documents = Arc::new(DocumentCoordinator::new(Arc::new(FixtureDocumentStore::default())));
    /// let signer = TokenSigner::new(TokenSecret::generate(), TimeDelta::hours(24));
    /// let clock = Arc::new(DefaultClock);
    /// let state = HttpState::new(
    ///     Arc::new(AuthGate::new(documents.clone(), signer, clock.clone())),
    ///     Arc::new(CollectionService::new(documents, clock)),
    /// );
    /// let _ = state.auth.signer();
    /// ```
    #[must_use]
    pub fn new(auth: Arc<AuthGate>, collections: Arc<CollectionService>) -> Self {
        Self { auth, collections }
    }
}
