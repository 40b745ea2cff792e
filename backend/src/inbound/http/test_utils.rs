//! Test helpers for inbound HTTP components.
//!
//! Builds apps over the in-memory adapters so handler tests exercise the
//! full request path (extractor, service, policy, store) without a
//! database.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};

use crate::domain::ports::{
    DoctorRepository, MappingRepository, PatientRepository, TokenService, UserRepository,
};
use crate::inbound::http::state::{HttpPorts, HttpState};
use crate::outbound::memory::MemoryStore;
use crate::server::configure_api;

/// HTTP state wired over a fresh in-memory store.
pub fn memory_state() -> web::Data<HttpState> {
    let store = Arc::new(MemoryStore::new());
    let users: Arc<dyn UserRepository> = store.clone();
    let doctors: Arc<dyn DoctorRepository> = store.clone();
    let patients: Arc<dyn PatientRepository> = store.clone();
    let mappings: Arc<dyn MappingRepository> = store.clone();
    let tokens: Arc<dyn TokenService> = store;
    web::Data::new(HttpState::new(HttpPorts {
        users,
        doctors,
        patients,
        mappings,
        tokens,
    }))
}

/// An app exposing the full API surface over in-memory adapters.
pub fn test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(memory_state()).configure(configure_api)
}

/// Build a registration request for the given account fields.
pub fn register_request(name: &str, username: &str, email: &str, password: &str) -> Request {
    actix_test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "name": name,
            "username": username,
            "email": email,
            "password": password,
        }))
        .to_request()
}

/// Register an account and return its access token.
pub async fn register_and_token<S, B>(app: &S, name: &str, username: &str, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(
        app,
        register_request(name, username, email, "correct horse"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "registration failed");
    let body: Value =
        serde_json::from_slice(&actix_test::read_body(response).await).expect("register payload");
    body["access"]
        .as_str()
        .expect("access token present")
        .to_owned()
}

/// Attach a bearer token to a test request builder.
pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {token}"),
    )
}
