//! Health probe endpoints.
//!
//! Liveness always answers once the process is up; readiness flips when
//! the server has finished wiring its dependencies. Both are
//! unauthenticated.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, web};
use serde_json::json;

/// Shared readiness flag for the probe endpoints.
#[derive(Debug, Default)]
pub struct HealthState {
    ready: AtomicBool,
}

impl HealthState {
    /// Create a not-yet-ready state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service ready to receive traffic.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/healthz/live",
    responses((status = 200, description = "Process is live")),
    tags = ["health"],
    operation_id = "live",
    security([])
)]
#[get("/healthz/live")]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "live" }))
}

/// Readiness probe.
#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses(
        (status = 200, description = "Ready for traffic"),
        (status = 503, description = "Still starting")
    ),
    tags = ["health"],
    operation_id = "ready",
    security([])
)]
#[get("/healthz/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    if state.is_ready() {
        HttpResponse::Ok().json(json!({ "status": "ready" }))
    } else {
        HttpResponse::ServiceUnavailable().json(json!({ "status": "starting" }))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};

    #[actix_web::test]
    async fn readiness_flips_with_the_flag() {
        let state = web::Data::new(HealthState::new());
        let app = actix_test::init_service(
            App::new().app_data(state.clone()).service(ready).service(live),
        )
        .await;

        let early = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/healthz/ready").to_request(),
        )
        .await;
        assert_eq!(early.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.mark_ready();
        let later = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/healthz/ready").to_request(),
        )
        .await;
        assert_eq!(later.status(), StatusCode::OK);

        let live_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/healthz/live").to_request(),
        )
        .await;
        assert_eq!(live_res.status(), StatusCode::OK);
    }
}
