//! Token-gated record keeping over a single JSON document.
//!
//! The crate is laid out hexagonally: [`domain`] holds the services and the
//! [`domain::ports::DocumentStore`] port, [`inbound`] the actix-web adapter
//! and [`outbound`] the file-backed store.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
