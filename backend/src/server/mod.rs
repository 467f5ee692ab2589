//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{AppServices, build_services};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use admission_queue::Trace;
#[cfg(debug_assertions)]
use admission_queue::doc::ApiDoc;
use admission_queue::domain::OutboxWorker;
use admission_queue::inbound::http::configure_api;
use admission_queue::inbound::http::health::{HealthState, live, ready};
use admission_queue::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Running HTTP server plus the outbox worker the caller must drive.
pub struct ServerHandles {
    /// Listener future; resolves when the server stops.
    pub server: Server,
    /// Mirror outbox drain loop.
    pub outbox_worker: OutboxWorker,
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure_api))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct the Actix HTTP server and the outbox worker for `config`.
///
/// Readiness is flipped once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when the spreadsheet client cannot be built
/// or the socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<ServerHandles> {
    let AppServices {
        http_state,
        outbox_worker,
    } = build_services(&config)?;
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .bind(config.bind_addr())?
        .run();

    health_state.mark_ready();
    Ok(ServerHandles {
        server,
        outbox_worker,
    })
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use admission_queue::domain::OutboxWorkerConfig;
    use admission_queue::outbound::sheets::SheetsClientConfig;
    use admission_queue::test_support::InMemorySpreadsheet;
    use mockable::DefaultClock;

    use super::state_builders::build_with_spreadsheet;
    use super::*;

    fn memory_state() -> web::Data<HttpState> {
        let config = ServerConfig::new(
            SocketAddr::from(([127, 0, 0, 1], 0)),
            SheetsClientConfig {
                credentials_path: PathBuf::from("credentials.json"),
                api_base: reqwest::Url::parse("http://127.0.0.1:9").expect("url"),
                token_uri: None,
                timeout: Duration::from_secs(1),
            },
            OutboxWorkerConfig::default(),
        );
        build_with_spreadsheet(
            &config,
            Arc::new(InMemorySpreadsheet::new("sheet-1", &["Sheet1"])),
            Arc::new(DefaultClock),
        )
        .http_state
    }

    #[actix_web::test]
    async fn mounts_api_and_probes() {
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        let app = actix_test::init_service(build_app(health, memory_state())).await;

        let ready_response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert_eq!(ready_response.status(), StatusCode::OK);

        let staff = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/employees")
                .to_request(),
        )
        .await;
        assert_eq!(staff.status(), StatusCode::OK);
        assert!(staff.headers().contains_key("trace-id"));
    }
}
