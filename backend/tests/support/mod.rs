//! Shared helper utilities for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! the on-disk wiring used by several suites lives here.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use recordkeeper::Trace;
use recordkeeper::domain::{
    AuthGate, CollectionService, DocumentCoordinator, LoginCredentials,
};
use recordkeeper::inbound::http::api_scope;
use recordkeeper::inbound::http::health::HealthState;
use recordkeeper::inbound::http::state::HttpState;
use recordkeeper::outbound::persistence::JsonFileDocumentStore;
use recordkeeper::test_support::{MutableClock, temp_data_dir, test_signer};
use tempfile::TempDir;

/// Services wired over a [`JsonFileDocumentStore`] in a temporary directory.
pub struct DiskHarness {
    pub data: TempDir,
    pub clock: Arc<MutableClock>,
    pub store: JsonFileDocumentStore,
    pub state: HttpState,
}

impl DiskHarness {
    pub fn new(retention: usize) -> Self {
        let data = temp_data_dir();
        let clock = Arc::new(MutableClock::default());
        let store = JsonFileDocumentStore::open(data.path(), retention, clock.clone())
            .expect("open document store");
        let documents = Arc::new(DocumentCoordinator::new(Arc::new(store.clone())));
        let state = HttpState::new(
            Arc::new(AuthGate::new(
                documents.clone(),
                test_signer(),
                clock.clone(),
            )),
            Arc::new(CollectionService::new(documents, clock.clone())),
        );
        Self {
            data,
            clock,
            store,
            state,
        }
    }

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

    pub async fn token(&self, username: &str, password: &str) -> String {
        let credentials =
            LoginCredentials::try_from_parts(username, password).expect("valid credentials");
        self.state
            .auth
            .login(&credentials)
            .await
            .expect("login succeeds")
            .token
    }
}
