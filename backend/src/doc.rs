//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler in the inbound layer and the schema
//! wrappers from [`crate::inbound::http::schemas`], plus the bearer token
//! security scheme. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` prints it.

use crate::inbound::http::health::HealthStatus;
use crate::inbound::http::records::{CollectionCleared, MessageResponse, RecordCreated};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, RecordSchema, SettingsSchema, UserSummarySchema,
};
use crate::inbound::http::users::{LoginRequest, LoginResponse, LoginUser};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recordkeeper API",
        description = "Token-gated record keeping for phone numbers, accounts and bills.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::list_users,
        crate::inbound::http::settings::get_settings,
        crate::inbound::http::records::list_records,
        crate::inbound::http::records::add_record,
        crate::inbound::http::records::update_record,
        crate::inbound::http::records::delete_record,
        crate::inbound::http::records::clear_collection,
        crate::inbound::http::health::health,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserSummarySchema,
        RecordSchema,
        SettingsSchema,
        LoginRequest,
        LoginResponse,
        LoginUser,
        RecordCreated,
        MessageResponse,
        CollectionCleared,
        HealthStatus,
    )),
    tags(
        (name = "auth", description = "Login and token issuance"),
        (name = "users", description = "User administration"),
        (name = "records", description = "Phone, account and bill records"),
        (name = "settings", description = "Application settings"),
        (name = "health", description = "Server status")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const USER_SUMMARY_SCHEMA_NAME: &str = "crate.domain.UserSummary";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_envelope_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn user_summary_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get(USER_SUMMARY_SCHEMA_NAME)
            .expect("UserSummary schema");

        assert_object_schema_has_field(schema, "username");
        assert_object_schema_has_field(schema, "createdAt");
    }

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/users",
            "/api/settings",
            "/api/health",
            "/api/{collection}",
            "/api/{collection}/{id}",
            "/api/{collection}/clear",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}
