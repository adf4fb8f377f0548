//! Public status check.

use std::sync::Arc;

use actix_web::{HttpResponse, get, http::header, web};
use mockable::{Clock, DefaultClock};
use serde::{Deserialize, Serialize};

use crate::domain::format_timestamp;

/// Clock stamping health responses.
pub struct HealthState {
    clock: Arc<dyn Clock>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl HealthState {
    /// Create a health state whose status timestamps come from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct HealthStatus {
    /// Always `ok` while the process serves requests.
    #[schema(example = "ok")]
    pub status: String,
    /// Human-readable status line.
    #[schema(example = "server is running")]
    pub message: String,
    /// Time the response was produced.
    #[schema(example = "2024-03-05T14:30:00+00:00")]
    pub timestamp: String,
}

/// Report that the server is up. Requires no authentication.
#[utoipa::path(
    get,
    path = "/api/health",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is running", body = HealthStatus)
    )
)]
#[get("/health")]
pub async fn health(state: web::Data<HealthState>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(HealthStatus {
            status: "ok".to_owned(),
            message: "server is running".to_owned(),
            timestamp: format_timestamp(state.clock.utc()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::shared_clock;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn health_reports_running_with_clock_timestamp() {
        let state = web::Data::new(HealthState::with_clock(shared_clock()));
        let app = test::init_service(
            App::new()
                .app_data(state)
                .service(web::scope("/api").service(health)),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get(header::CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("no-store")
        );
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "server is running");
        assert_eq!(body["timestamp"], "2024-03-05T14:30:00+00:00");
    }

    #[actix_web::test]
    async fn readiness_and_liveness_paths_are_not_served() {
        let state = web::Data::new(HealthState::default());
        let app = test::init_service(
            App::new()
                .app_data(state)
                .service(web::scope("/api").service(health)),
        )
        .await;

        for path in ["/health/ready", "/health/live"] {
            let res =
                test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }
}
