//! Shared harness for end-to-end tests over the in-memory store.
//!
//! Services are wired the way the server wires them, with the spreadsheet
//! replaced by [`InMemorySpreadsheet`] and time held by [`MutableClock`].

use std::sync::Arc;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self as actix_test, TestRequest};
use actix_web::{App, web};
use chrono::{DateTime, TimeZone, Utc};
use mockable::Clock;
use serde::de::DeserializeOwned;
use serde_json::Value;

use admission_queue::Trace;
use admission_queue::domain::ports::ArchiveRepository;
use admission_queue::domain::{
    ArchiveAdminService, DisplaySettingsService, MirrorPorts, MirrorSyncService, OutboxWorker,
    OutboxWorkerConfig, OutboxWorkerPorts, OutboxWorkerRuntime, QueueLifecycleService,
    StaffDeskService, StaffDirectoryService,
};
use admission_queue::inbound::http::configure_api;
use admission_queue::inbound::http::state::{HttpState, HttpStatePorts};
use admission_queue::test_support::{
    InMemorySpreadsheet, InMemoryStore, MutableClock, NoJitter, RecordingSleeper,
};

pub const SPREADSHEET_ID: &str = "admissions-2026";
pub const SHEET_NAME: &str = "Sheet1";

/// Doubles and the outbox worker behind one test app.
pub struct Harness {
    pub clock: Arc<MutableClock>,
    pub spreadsheet: Arc<InMemorySpreadsheet>,
    pub state: web::Data<HttpState>,
    pub worker: OutboxWorker,
}

pub fn start_of_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 8, 30, 0)
        .single()
        .expect("valid timestamp")
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(MutableClock::new(start_of_day()));
        let shared_clock: Arc<dyn Clock> = clock.clone();
        let store = Arc::new(InMemoryStore::new(Arc::clone(&shared_clock)));
        let spreadsheet = Arc::new(InMemorySpreadsheet::new(SPREADSHEET_ID, &[SHEET_NAME, "Notes"]));

        let lifecycle = Arc::new(QueueLifecycleService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&shared_clock),
        ));
        let mirror = MirrorSyncService::new(
            MirrorPorts {
                archive: store.clone() as Arc<dyn ArchiveRepository>,
                sync_state: store.clone(),
                outbox: store.clone(),
                spreadsheet: spreadsheet.clone(),
            },
            Arc::clone(&shared_clock),
        );
        let state = web::Data::new(HttpState::new(HttpStatePorts {
            visitor_queue: lifecycle.clone(),
            staff_desk: Arc::new(StaffDeskService::new(
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::clone(&shared_clock),
            )),
            staff_directory: Arc::new(StaffDirectoryService::new(
                Arc::clone(&store),
                Arc::clone(&shared_clock),
            )),
            queue_admin: lifecycle,
            archive_admin: Arc::new(ArchiveAdminService::new(
                Arc::clone(&store),
                Arc::clone(&shared_clock),
            )),
            display: Arc::new(DisplaySettingsService::new(
                Arc::clone(&store),
                Arc::clone(&shared_clock),
            )),
            mirror: Arc::new(mirror.clone()),
        }));
        let worker = OutboxWorker::with_runtime(
            OutboxWorkerPorts::new(store.clone(), Arc::new(mirror)),
            shared_clock,
            OutboxWorkerRuntime {
                sleeper: Arc::new(RecordingSleeper::default()),
                jitter: Arc::new(NoJitter),
            },
            OutboxWorkerConfig {
                max_attempts: 3,
                initial_backoff: Duration::from_secs(10),
                max_backoff: Duration::from_secs(60),
                ..OutboxWorkerConfig::default()
            },
        );

        Self {
            clock,
            spreadsheet,
            state,
            worker,
        }
    }

    /// Test service with the API mounted under `/api/v1`.
    pub async fn app(
        &self,
    ) -> impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    > {
        actix_test::init_service(
            App::new()
                .app_data(self.state.clone())
                .wrap(Trace)
                .service(web::scope("/api/v1").configure(configure_api)),
        )
        .await
    }
}

/// Send `request`, assert the status, and decode the JSON body.
pub async fn call_json<S, B, T>(app: &S, request: TestRequest, expected: StatusCode) -> T
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
    T: DeserializeOwned,
{
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    assert_eq!(
        status,
        expected,
        "unexpected status; body: {}",
        String::from_utf8_lossy(&body)
    );
    serde_json::from_slice(&body).expect("response body should be JSON")
}

/// Send `request` and return the status with the body as loose JSON.
pub async fn call_value<S, B>(app: &S, request: TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("response body should be JSON")
    };
    (status, value)
}
