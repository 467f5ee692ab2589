//! Tests for admission desk handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::ports::{CallNextOutcome, DeskStatus};
use crate::domain::{EmployeeId, EmployeeStatus, Error, QueueStatus};
use crate::inbound::http::test_utils::{MockPorts, sample_employee, sample_entry};

#[rstest]
#[case("start-work", EmployeeStatus::Available)]
#[case("pause-work", EmployeeStatus::Paused)]
#[case("resume-work", EmployeeStatus::Available)]
#[case("finish-work", EmployeeStatus::Offline)]
#[case("complete-current", EmployeeStatus::Available)]
#[actix_web::test]
async fn desk_transitions_return_the_employee(
    #[case] action: &str,
    #[case] resulting: EmployeeStatus,
) {
    let employee = sample_employee(resulting);
    let id = employee.id;
    let mut ports = MockPorts::default();
    let desk = &mut ports.staff_desk;
    let reply = move |_: &EmployeeId| Ok(employee.clone());
    match action {
        "start-work" => {
            desk.expect_start_work().times(1).returning(reply);
        }
        "pause-work" => {
            desk.expect_pause_work().times(1).returning(reply);
        }
        "resume-work" => {
            desk.expect_resume_work().times(1).returning(reply);
        }
        "finish-work" => {
            desk.expect_finish_work().times(1).returning(reply);
        }
        _ => {
            desk.expect_complete_current().times(1).returning(reply);
        }
    }
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/admission/{id}/{action}"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["status"], resulting.as_str());
}

#[actix_web::test]
async fn call_next_on_empty_queue_reports_failure_flag() {
    let mut ports = MockPorts::default();
    ports
        .staff_desk
        .expect_call_next()
        .returning(|_| Ok(CallNextOutcome::EmptyQueue));
    let app = actix_test::init_service(ports.into_app()).await;

    let body: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/admission/{}/call-next", EmployeeId::random()))
            .to_request(),
    )
    .await;

    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "empty_queue");
    assert!(body["entry"].is_null());
}

#[actix_web::test]
async fn call_next_by_unavailable_employee_is_rejected() {
    let mut ports = MockPorts::default();
    ports
        .staff_desk
        .expect_call_next()
        .returning(|_| Err(Error::invalid_request("employee is not available")));
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/admission/{}/call-next", EmployeeId::random()))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn status_includes_current_entry_and_waiting_count() {
    let mut ports = MockPorts::default();
    ports.staff_desk.expect_status().returning(|_| {
        Ok(DeskStatus {
            employee: sample_employee(EmployeeStatus::Busy),
            current: Some(sample_entry(3, QueueStatus::InProgress)),
            waiting: 4,
        })
    });
    let app = actix_test::init_service(ports.into_app()).await;

    let body: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/admission/{}/status", EmployeeId::random()))
            .to_request(),
    )
    .await;

    assert_eq!(body["employee"]["status"], "busy");
    assert_eq!(body["current"]["queueNumber"], 3);
    assert_eq!(body["waiting"], 4);
}

#[actix_web::test]
async fn assigned_queue_parses_status_filter() {
    let mut ports = MockPorts::default();
    ports
        .staff_desk
        .expect_assigned_queue()
        .withf(|_, status| *status == Some(QueueStatus::Waiting))
        .times(1)
        .returning(|_, _| Ok(vec![sample_entry(1, QueueStatus::Waiting)]));
    let app = actix_test::init_service(ports.into_app()).await;

    let body: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!(
                "/api/v1/admission/{}/queue?status=waiting",
                EmployeeId::random()
            ))
            .to_request(),
    )
    .await;

    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn update_entry_forwards_only_present_fields() {
    let entry = sample_entry(6, QueueStatus::Paused);
    let entry_id = entry.id;
    let mut ports = MockPorts::default();
    ports
        .staff_desk
        .expect_update_entry()
        .withf(move |id, changes| {
            *id == entry_id
                && changes.status == Some(QueueStatus::Paused)
                && changes.full_name.is_none()
                && changes.notes.as_deref() == Some("documents missing")
        })
        .times(1)
        .return_once(move |_, _| Ok(entry));
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!(
                "/api/v1/admission/{}/queue/{entry_id}",
                EmployeeId::random()
            ))
            .set_json(json!({"status": "paused", "notes": " documents missing "}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn delete_entry_returns_no_content() {
    let mut ports = MockPorts::default();
    ports
        .staff_desk
        .expect_delete_entry()
        .times(1)
        .returning(|_| Ok(()));
    let app = actix_test::init_service(ports.into_app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!(
                "/api/v1/admission/{}/queue/{}",
                EmployeeId::random(),
                uuid::Uuid::new_v4()
            ))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
