//! Test helpers for inbound HTTP components.
//!
//! [`TestApp`] wires the real services over an in-memory document store and
//! a hand-driven clock so handler tests exercise the full request path
//! without touching disk.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, web};

use crate::Trace;
use crate::domain::ports::FixtureDocumentStore;
use crate::domain::{
    AuthGate, CollectionService, DEFAULT_ADMIN, DEFAULT_ADMIN_PASSWORD, Document,
    DocumentCoordinator, LoginCredentials,
};
use crate::inbound::http::api_scope;
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::HttpState;
use crate::test_support::{CLERK, MutableClock, document_with_clerk, fixed_now, test_signer};

/// `Authorization` header carrying `token` as a bearer credential.
#[must_use]
pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

/// Services wired over a [`FixtureDocumentStore`].
pub struct TestApp {
    /// In-memory store backing every service.
    pub store: Arc<FixtureDocumentStore>,
    /// Clock shared by the gate, the collections and health.
    pub clock: Arc<MutableClock>,
    /// Handler state handed to the app.
    pub state: HttpState,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Seeded document plus the non-admin clerk.
    #[must_use]
    pub fn new() -> Self {
        Self::with_document(document_with_clerk(fixed_now()))
    }

    /// Services over `document`.
    #[must_use]
    pub fn with_document(document: Document) -> Self {
        let store = Arc::new(FixtureDocumentStore::new(document));
        let clock = Arc::new(MutableClock::default());
        let documents = Arc::new(DocumentCoordinator::new(store.clone()));
        let state = HttpState::new(
            Arc::new(AuthGate::new(
                documents.clone(),
                test_signer(),
                clock.clone(),
            )),
            Arc::new(CollectionService::new(documents, clock.clone())),
        );
        Self {
            store,
            clock,
            state,
        }
    }

    /// Application with the full `/api` scope and trace middleware.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .app_data(web::Data::new(HealthState::with_clock(self.clock.clone())))
            .wrap(Trace)
            .service(api_scope())
    }

    /// Token for the seeded administrator.
    pub async fn admin_token(&self) -> String {
        self.token_for(DEFAULT_ADMIN, DEFAULT_ADMIN_PASSWORD).await
    }

    /// Token for the non-admin clerk.
    pub async fn clerk_token(&self) -> String {
        let (username, password) = CLERK;
        self.token_for(username, password).await
    }

    async fn token_for(&self, username: &str, password: &str) -> String {
        let credentials = LoginCredentials::try_from_parts(username, password)
            .unwrap_or_else(|err| panic!("credentials: {err}"));
        self.state
            .auth
            .login(&credentials)
            .await
            .unwrap_or_else(|err| panic!("login as {username}: {err}"))
            .token
    }
}
