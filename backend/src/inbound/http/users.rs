//! Login and user listing handlers.
//!
//! ```text
//! POST /api/auth/login {"username":"admin","password":"admin123"}
//! GET /api/users
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, LoginCredentials, LoginValidationError, Role, UserSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::error::{redact_if_internal, status_for};
use crate::inbound::http::schemas::{ErrorSchema, UserSummarySchema};
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/auth/login`.
///
/// Missing fields deserialise as empty strings so they are reported as
/// validation errors naming the field.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Raw password; only its digest is compared.
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// The logged-in user as echoed by the login response.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginUser {
    /// User identifier.
    pub id: String,
    /// Login name.
    pub username: String,
    /// `admin` or `user`.
    #[schema(value_type = String, example = "admin")]
    pub role: Role,
}

/// Successful login payload.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// Always `true`.
    pub success: bool,
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The authenticated user.
    pub user: LoginUser,
    /// Greeting shown by clients.
    pub message: String,
}

/// Failed login payload: the error envelope plus `success: false`.
#[derive(Debug, Serialize)]
struct LoginFailure {
    success: bool,
    #[serde(flatten)]
    error: Error,
}

fn login_failure(error: &Error) -> HttpResponse {
    HttpResponse::build(status_for(error.code())).json(LoginFailure {
        success: false,
        error: redact_if_internal(error),
    })
}

/// Exchange credentials for a bearer token valid for 24 hours.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Missing username or password", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(state: web::Data<HttpState>, payload: web::Json<LoginRequest>) -> HttpResponse {
    let credentials = match LoginCredentials::try_from(payload.into_inner()) {
        Ok(credentials) => credentials,
        Err(err) => return login_failure(&map_login_validation_error(err)),
    };
    match state.auth.login(&credentials).await {
        Ok(outcome) => HttpResponse::Ok().json(LoginResponse {
            success: true,
            token: outcome.token,
            user: LoginUser {
                id: outcome.identity.user_id().to_string(),
                username: outcome.identity.username().to_owned(),
                role: outcome.identity.role(),
            },
            message: "login successful".to_owned(),
        }),
        Err(err) => login_failure(&err),
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// List every user without password digests. Admin only.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = [UserSummarySchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<UserSummary>>> {
    let users = state.collections.users(caller.identity()).await?;
    Ok(web::Json(users))
}
