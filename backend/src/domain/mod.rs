//! Domain primitives, aggregates and services.
//!
//! Purpose: define the record-keeping model (users, records, the persisted
//! document) and the services that operate on it. Types document their
//! invariants and serde contracts in Rustdoc; nothing here knows about HTTP.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — transport agnostic error payload.
//! - Document, Record, CollectionKind, Settings — the persisted model.
//! - User, UserId, Role, UserSummary — accounts held in the document.
//! - DocumentCoordinator — serialised load/mutate/persist cycles.
//! - AuthGate, CollectionService — the application services.

pub mod auth;
pub mod auth_gate;
pub mod collections;
pub mod coordinator;
pub mod document;
pub mod error;
pub mod password;
pub mod ports;
pub mod record;
pub mod token;
pub mod trace_id;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::auth_gate::{AuthGate, Identity, LoginOutcome};
pub use self::collections::CollectionService;
pub use self::coordinator::DocumentCoordinator;
pub use self::document::{
    DEFAULT_ADMIN, DEFAULT_ADMIN_PASSWORD, Document, Settings, format_timestamp,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::password::PasswordDigest;
pub use self::record::{CollectionKind, Record, UnknownCollection};
pub use self::token::{
    DEFAULT_TOKEN_TTL_HOURS, SessionClaims, TokenError, TokenSecret, TokenSigner,
};
pub use self::trace_id::TraceId;
pub use self::user::{Role, User, UserId, UserSummary, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use recordkeeper::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
