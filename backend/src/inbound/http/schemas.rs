//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their wire shape and live in the inbound adapter
//! layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested record does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "record not found")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::UserSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UserSummary)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSummarySchema {
    /// Stable user identifier.
    #[schema(example = "admin")]
    id: String,
    /// Login name.
    #[schema(example = "admin")]
    username: String,
    /// `admin` or `user`.
    #[schema(example = "admin")]
    role: String,
    /// Creation timestamp.
    #[schema(example = "2024-03-05T14:30:00+00:00")]
    created_at: String,
    /// Most recent successful login.
    last_login: Option<String>,
}

/// OpenAPI schema for [`crate::domain::Record`].
///
/// Records are open objects; only the system fields are described.
#[derive(ToSchema)]
#[schema(as = crate::domain::Record)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RecordSchema {
    /// Server-assigned unless supplied on creation.
    #[schema(example = "phone_1_20240305143000")]
    id: String,
    created_at: Option<String>,
    /// Id of the user that created the record.
    created_by: Option<String>,
    updated_at: Option<String>,
    /// Id of the user that last replaced the record.
    updated_by: Option<String>,
}

/// OpenAPI schema for [`crate::domain::Settings`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Settings)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SettingsSchema {
    #[schema(example = "Phone Number Management System")]
    company_name: String,
    #[schema(example = "v3.5")]
    version: String,
    auto_backup: bool,
    #[schema(example = 24)]
    backup_interval: u32,
}
