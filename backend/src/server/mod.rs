//! Server assembly: route registration, persistence wiring, and startup.

pub mod config;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use color_eyre::eyre::{WrapErr, eyre};
use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::inbound::http::health::{self, HealthState};
use crate::inbound::http::state::{HttpPorts, HttpState};
use crate::inbound::http::{accounts, doctors, mappings, patients};
use crate::outbound::persistence::{
    DbPool, DieselDoctorRepository, DieselMappingRepository, DieselPatientRepository,
    DieselTokenService, DieselUserRepository, PoolConfig,
};
pub use config::ServerConfig;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Register every API route on a service config.
///
/// Shared between the real server and handler tests so both expose the
/// same surface.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(accounts::register)
        .service(doctors::list_doctors)
        .service(doctors::create_doctor)
        .service(doctors::get_doctor)
        .service(doctors::replace_doctor)
        .service(doctors::update_doctor)
        .service(doctors::delete_doctor)
        .service(patients::list_patients)
        .service(patients::create_patient)
        .service(patients::get_patient)
        .service(patients::replace_patient)
        .service(patients::update_patient)
        .service(patients::delete_patient)
        .service(mappings::list_mappings)
        .service(mappings::create_mapping)
        .service(mappings::delete_mapping)
        .service(mappings::list_mappings_by_patient);
}

fn build_app(
    state: web::Data<HttpState>,
    health_state: web::Data<HealthState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(state)
        .app_data(health_state)
        .configure(configure_api)
        .service(health::live)
        .service(health::ready);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Apply pending migrations over a short-lived synchronous connection.
fn run_migrations(database_url: &str) -> color_eyre::Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .wrap_err("failed to connect for schema migration")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| eyre!("failed to run migrations: {err}"))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied pending migrations");
    }
    Ok(())
}

/// Wire persistence, bind the listener, and serve until shutdown.
pub async fn run(config: ServerConfig) -> color_eyre::Result<()> {
    run_migrations(&config.database_url)?;

    let pool = DbPool::new(
        PoolConfig::new(&config.database_url).with_max_size(config.pool_size),
    )
    .await
    .wrap_err("failed to build database pool")?;

    let state = web::Data::new(HttpState::new(HttpPorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        doctors: Arc::new(DieselDoctorRepository::new(pool.clone())),
        patients: Arc::new(DieselPatientRepository::new(pool.clone())),
        mappings: Arc::new(DieselMappingRepository::new(pool.clone())),
        tokens: Arc::new(DieselTokenService::new(pool)),
    }));

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness flag stays shared.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let app = build_app(state.clone(), server_health_state.clone());
        #[cfg(feature = "metrics")]
        let app = app.wrap(make_metrics());
        app
    })
    .bind(config.bind_addr)?;

    info!(addr = %config.bind_addr, "listening");
    health_state.mark_ready();
    server.run().await.wrap_err("server terminated abnormally")
}

#[cfg(feature = "metrics")]
fn make_metrics() -> actix_web_prom::PrometheusMetrics {
    actix_web_prom::PrometheusMetricsBuilder::new("records")
        .endpoint("/metrics")
        .build()
        .expect("configure Prometheus metrics")
}
