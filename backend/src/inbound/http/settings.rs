//! Application settings handler.

use actix_web::{get, web};

use crate::domain::Settings;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::{ErrorSchema, SettingsSchema};
use crate::inbound::http::state::HttpState;

/// The settings map stored in the document.
#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Settings", body = SettingsSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "getSettings"
)]
#[get("/settings")]
pub async fn get_settings(
    state: web::Data<HttpState>,
    _caller: Authenticated,
) -> ApiResult<web::Json<Settings>> {
    Ok(web::Json(state.collections.settings().await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestApp, bearer};
    use actix_web::{http::StatusCode, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn settings_require_a_token() {
        let harness = TestApp::new();
        let app = test::init_service(harness.app()).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/api/settings").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn settings_return_seeded_defaults() {
        let harness = TestApp::new();
        let token = harness.admin_token().await;
        let app = test::init_service(harness.app()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/settings")
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["companyName"], "Phone Number Management System");
        assert_eq!(body["version"], "v3.5");
        assert_eq!(body["autoBackup"], true);
        assert_eq!(body["backupInterval"], 24);
    }
}
