//! Tests for public queue handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::{Value, json};

use crate::domain::ports::{DisplayBoardEntry, QueueStanding};
use crate::domain::{EmployeeStatus, Error, QueuePosition, QueueStatus};
use crate::inbound::http::test_utils::{MockPorts, sample_employee, sample_entry};

fn join_payload() -> Value {
    json!({
        "fullName": "  Aigerim Nurlanovna ",
        "phone": "+77010000000",
        "programs": ["Law", " "],
        "formLanguage": "ru"
    })
}

#[actix_web::test]
async fn join_trims_input_and_returns_created_entry() {
    let mut ports = MockPorts::default();
    ports
        .visitor_queue
        .expect_join()
        .withf(|request| {
            request.full_name == "Aigerim Nurlanovna"
                && request.programs == vec!["Law".to_owned()]
                && request.assigned_employee_id.is_none()
                && request.form_language.as_deref() == Some("ru")
        })
        .times(1)
        .returning(|_| Ok(sample_entry(7, QueueStatus::Waiting)));
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/public/queue")
            .set_json(join_payload())
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["queueNumber"], 7);
    assert_eq!(body["status"], "waiting");
}

#[actix_web::test]
async fn join_rejects_blank_phone_before_reaching_the_queue() {
    let mut ports = MockPorts::default();
    ports.visitor_queue.expect_join().never();
    let app = actix_test::init_service(ports.into_app()).await;

    let mut payload = join_payload();
    payload["phone"] = json!("   ");
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/public/queue")
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "phone");
}

#[actix_web::test]
async fn duplicate_phone_is_a_conflict() {
    let mut ports = MockPorts::default();
    ports
        .visitor_queue
        .expect_join()
        .returning(|_| Err(Error::conflict("phone already queued")));
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/public/queue")
            .set_json(join_payload())
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn check_reports_position_for_waiting_entry() {
    let mut ports = MockPorts::default();
    ports
        .visitor_queue
        .expect_check()
        .withf(|name| name == "Aigerim Nurlanovna")
        .returning(|_| {
            Ok(QueueStanding {
                entry: sample_entry(4, QueueStatus::Waiting),
                position: Some(QueuePosition {
                    position: 3,
                    people_ahead: 2,
                    estimated_wait_minutes: 10,
                }),
            })
        });
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/public/queue/check?fullName=Aigerim%20Nurlanovna")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["position"], 3);
    assert_eq!(body["peopleAhead"], 2);
    assert_eq!(body["estimatedWaitMinutes"], 10);
}

#[actix_web::test]
async fn check_requires_full_name() {
    let mut ports = MockPorts::default();
    ports.visitor_queue.expect_check().never();
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/public/queue/check")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn cancel_rejects_malformed_id() {
    let mut ports = MockPorts::default();
    ports.visitor_queue.expect_cancel().never();
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/v1/public/queue/not-a-uuid/cancel")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn cancel_returns_completed_entry() {
    let entry = sample_entry(2, QueueStatus::Completed);
    let id = entry.id;
    let mut ports = MockPorts::default();
    ports
        .visitor_queue
        .expect_cancel()
        .withf(move |requested| *requested == id)
        .return_once(move |_| Ok(entry));
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/public/queue/{id}/cancel"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["status"], "completed");
}

#[actix_web::test]
async fn count_and_display_board_are_public() {
    let mut ports = MockPorts::default();
    ports.visitor_queue.expect_open_count().returning(|| Ok(12));
    ports.visitor_queue.expect_display_board().returning(|| {
        Ok(vec![DisplayBoardEntry {
            id: uuid::Uuid::nil(),
            queue_number: 5,
            status: QueueStatus::InProgress,
            assigned_employee_name: Some("B. Serikova".to_owned()),
            employee_desk: Some("3".to_owned()),
        }])
    });
    ports
        .staff_directory
        .expect_list()
        .returning(|| Ok(vec![sample_employee(EmployeeStatus::Available)]));
    let app = actix_test::init_service(ports.into_app()).await;

    let count: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/public/queue/count")
            .to_request(),
    )
    .await;
    assert_eq!(count, json!({"count": 12}));

    let board: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/public/display-queue")
            .to_request(),
    )
    .await;
    assert_eq!(board[0]["employeeDesk"], "3");
    assert_eq!(board[0]["status"], "in_progress");

    let staff: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/public/employees")
            .to_request(),
    )
    .await;
    assert_eq!(staff[0]["status"], "available");
}
