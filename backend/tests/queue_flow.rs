//! End-to-end visitor flow through the HTTP API over the in-memory store.

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

mod support;

use support::{Harness, call_json, call_value};

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

fn join_request(full_name: &str, phone: &str) -> TestRequest {
    TestRequest::post().uri("/api/v1/public/queue").set_json(json!({
        "fullName": full_name,
        "phone": phone,
        "programs": ["Law", "Economics"],
        "formLanguage": "kk"
    }))
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id should be a string").to_owned()
}

/// Register an employee and put them on duty; returns their id.
async fn open_desk<S, B>(app: &S, full_name: &str, desk: &str) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let employee: Value = call_json(
        app,
        TestRequest::post()
            .uri("/api/v1/admin/employees")
            .set_json(json!({ "fullName": full_name, "desk": desk })),
        StatusCode::CREATED,
    )
    .await;
    let employee_id = id_of(&employee);
    let _: Value = call_json(
        app,
        TestRequest::post().uri(&format!("/api/v1/admission/{employee_id}/start-work")),
        StatusCode::OK,
    )
    .await;
    employee_id
}

#[rstest]
#[actix_web::test]
async fn applicant_is_called_served_and_archived(harness: Harness) {
    let app = harness.app().await;

    let employee: Value = call_json(
        &app,
        TestRequest::post()
            .uri("/api/v1/admin/employees")
            .set_json(json!({ "fullName": "Dana Reyes", "desk": "3" })),
        StatusCode::CREATED,
    )
    .await;
    let employee_id = id_of(&employee);
    assert_eq!(employee["status"], "offline");

    let online: Value = call_json(
        &app,
        TestRequest::post().uri(&format!("/api/v1/admission/{employee_id}/start-work")),
        StatusCode::OK,
    )
    .await;
    assert_eq!(online["status"], "available");

    let entry: Value = call_json(
        &app,
        join_request("Aigerim Nurlanovna", "+77010000001"),
        StatusCode::CREATED,
    )
    .await;
    let entry_id = id_of(&entry);
    assert_eq!(entry["queueNumber"], 1);
    assert_eq!(entry["status"], "waiting");
    assert_eq!(entry["assignedEmployeeId"], employee_id.as_str());
    assert_eq!(entry["assignedEmployeeName"], "Dana Reyes");

    let standing: Value = call_json(
        &app,
        TestRequest::get().uri("/api/v1/public/queue/check?fullName=Aigerim%20Nurlanovna"),
        StatusCode::OK,
    )
    .await;
    assert_eq!(standing["position"], 1);
    assert_eq!(standing["peopleAhead"], 0);

    let called: Value = call_json(
        &app,
        TestRequest::post().uri(&format!("/api/v1/admission/{employee_id}/call-next")),
        StatusCode::OK,
    )
    .await;
    assert_eq!(called["success"], true);
    assert_eq!(called["entry"]["id"], entry_id.as_str());
    assert_eq!(called["entry"]["status"], "in_progress");

    let desk: Value = call_json(
        &app,
        TestRequest::get().uri(&format!("/api/v1/admission/{employee_id}/status")),
        StatusCode::OK,
    )
    .await;
    assert_eq!(desk["employee"]["status"], "busy");
    assert_eq!(desk["current"]["id"], entry_id.as_str());

    harness.clock.advance_seconds(7 * 60);
    let after: Value = call_json(
        &app,
        TestRequest::post().uri(&format!("/api/v1/admission/{employee_id}/complete-current")),
        StatusCode::OK,
    )
    .await;
    assert_eq!(after["status"], "available");

    let archive: Value = call_json(
        &app,
        TestRequest::get().uri("/api/v1/admin/archive"),
        StatusCode::OK,
    )
    .await;
    let rows = archive.as_array().expect("archive should be a list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["originalId"], entry_id.as_str());
    assert_eq!(rows[0]["status"], "completed");
    assert_eq!(rows[0]["assignedEmployeeName"], "Dana Reyes");
    assert_eq!(rows[0]["archiveReason"], "auto_backup");
    assert_eq!(rows[0]["processingTime"], 7 * 60);

    let idle: Value = call_json(
        &app,
        TestRequest::post().uri(&format!("/api/v1/admission/{employee_id}/call-next")),
        StatusCode::OK,
    )
    .await;
    assert_eq!(idle["success"], false);
    assert_eq!(idle["message"], "empty_queue");

    let count: Value = call_json(
        &app,
        TestRequest::get().uri("/api/v1/public/queue/count"),
        StatusCode::OK,
    )
    .await;
    assert_eq!(count["count"], 0);
}

#[rstest]
#[actix_web::test]
async fn open_phone_cannot_join_twice(harness: Harness) {
    let app = harness.app().await;
    open_desk(&app, "Dana Reyes", "3").await;

    let _: Value = call_json(
        &app,
        join_request("Timur Askarov", "+77010000002"),
        StatusCode::CREATED,
    )
    .await;
    let (status, body) = call_value(&app, join_request("Timur A.", "+77010000002")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[rstest]
#[actix_web::test]
async fn cancelled_entry_frees_the_phone_and_keeps_numbers_rising(harness: Harness) {
    let app = harness.app().await;
    open_desk(&app, "Dana Reyes", "3").await;

    let first: Value = call_json(
        &app,
        join_request("Madina Serikova", "+77010000003"),
        StatusCode::CREATED,
    )
    .await;
    let cancelled: Value = call_json(
        &app,
        TestRequest::delete().uri(&format!("/api/v1/public/queue/{}/cancel", id_of(&first))),
        StatusCode::OK,
    )
    .await;
    assert_eq!(cancelled["status"], "completed");

    let again: Value = call_json(
        &app,
        join_request("Madina Serikova", "+77010000003"),
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(again["queueNumber"], 2);
}

#[rstest]
#[actix_web::test]
async fn reset_numbering_compacts_the_open_queue(harness: Harness) {
    let app = harness.app().await;
    open_desk(&app, "Dana Reyes", "3").await;

    let mut ids = Vec::new();
    for (name, phone) in [
        ("Alua Bekova", "+77010000011"),
        ("Nurlan Omarov", "+77010000012"),
        ("Saule Zhaksy", "+77010000013"),
    ] {
        let entry: Value = call_json(&app, join_request(name, phone), StatusCode::CREATED).await;
        ids.push(id_of(&entry));
    }
    let _: Value = call_json(
        &app,
        TestRequest::delete().uri(&format!("/api/v1/public/queue/{}/cancel", ids[0])),
        StatusCode::OK,
    )
    .await;

    let report: Value = call_json(
        &app,
        TestRequest::post().uri("/api/v1/admin/queue/reset-numbering"),
        StatusCode::OK,
    )
    .await;
    assert_eq!(report["archivedCompleted"], 1);
    assert_eq!(report["nextNumber"], 3);

    let queue: Value = call_json(
        &app,
        TestRequest::get().uri("/api/v1/admin/queue"),
        StatusCode::OK,
    )
    .await;
    let numbers: Vec<i64> = queue
        .as_array()
        .expect("queue should be a list")
        .iter()
        .filter_map(|entry| entry["queueNumber"].as_i64())
        .collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[rstest]
#[actix_web::test]
async fn display_board_shows_applicants_being_served(harness: Harness) {
    let app = harness.app().await;
    let employee_id = open_desk(&app, "Dana Reyes", "Desk 3").await;
    for (name, phone) in [("Erlan Temirov", "+77010000021"), ("Ainur Kasym", "+77010000022")] {
        let _: Value = call_json(&app, join_request(name, phone), StatusCode::CREATED).await;
    }
    let _: Value = call_json(
        &app,
        TestRequest::post().uri(&format!("/api/v1/admission/{employee_id}/call-next")),
        StatusCode::OK,
    )
    .await;

    let board: Value = call_json(
        &app,
        TestRequest::get().uri("/api/v1/public/display-queue"),
        StatusCode::OK,
    )
    .await;
    let lines = board.as_array().expect("board should be a list");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["queueNumber"], 1);
    assert_eq!(lines[0]["status"], "in_progress");
    assert_eq!(lines[0]["employeeDesk"], "Desk 3");
}

#[rstest]
#[actix_web::test]
async fn joining_without_staff_on_duty_is_refused(harness: Harness) {
    let app = harness.app().await;
    let (status, body) = call_value(&app, join_request("Bolat Sadykov", "+77010000031")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["code"], "no_staff_available");
}

#[rstest]
#[actix_web::test]
async fn unknown_employee_is_not_found(harness: Harness) {
    let app = harness.app().await;
    let (status, body) = call_value(
        &app,
        TestRequest::post()
            .uri("/api/v1/admission/3f8c7a52-2f7e-4c39-9d1c-5a0b8e1f2d44/start-work"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[rstest]
#[actix_web::test]
async fn full_queue_evicts_completed_entries_and_renumbers(harness: Harness) {
    let app = harness.app().await;
    open_desk(&app, "Dana Reyes", "3").await;

    let mut ids = Vec::new();
    for n in 1..=99 {
        harness.clock.advance_seconds(1);
        let entry: Value = call_json(
            &app,
            join_request(&format!("Applicant {n}"), &format!("+7702{n:07}")),
            StatusCode::CREATED,
        )
        .await;
        assert_eq!(entry["queueNumber"], n);
        ids.push(id_of(&entry));
    }
    for id in &ids[..33] {
        let _: Value = call_json(
            &app,
            TestRequest::delete().uri(&format!("/api/v1/public/queue/{id}/cancel")),
            StatusCode::OK,
        )
        .await;
    }

    harness.clock.advance_seconds(1);
    let newcomer: Value = call_json(
        &app,
        join_request("Applicant 100", "+77020000100"),
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(newcomer["queueNumber"], 67);

    let queue: Value = call_json(
        &app,
        TestRequest::get().uri("/api/v1/admin/queue"),
        StatusCode::OK,
    )
    .await;
    let rows = queue.as_array().expect("queue should be a list");
    let numbers: Vec<i64> = rows
        .iter()
        .filter_map(|entry| entry["queueNumber"].as_i64())
        .collect();
    assert_eq!(numbers, (1..=67).collect::<Vec<i64>>());
    assert_eq!(rows[0]["id"], ids[33].as_str());
    assert_eq!(rows[65]["id"], ids[98].as_str());
    assert!(rows.iter().all(|entry| entry["status"] == "waiting"));

    let status: Value = call_json(
        &app,
        TestRequest::get().uri("/api/v1/admin/sync/status"),
        StatusCode::OK,
    )
    .await;
    assert_eq!(status["archiveTotal"], 100);
}

#[rstest]
#[actix_web::test]
async fn mirror_stays_idle_until_configured(harness: Harness) {
    let app = harness.app().await;
    open_desk(&app, "Dana Reyes", "3").await;
    let _: Value = call_json(
        &app,
        join_request("Gaukhar Beisen", "+77010000041"),
        StatusCode::CREATED,
    )
    .await;

    let report = harness.worker.run_once().await.expect("drain should run");
    assert!(report.skipped);
    assert_eq!(report.claimed, 0);
    assert!(harness.spreadsheet.rows().is_empty());
}

#[rstest]
#[actix_web::test]
async fn display_video_is_created_on_first_read_then_updated(harness: Harness) {
    let app = harness.app().await;

    let initial: Value = call_json(
        &app,
        TestRequest::get().uri("/api/v1/admin/video-settings"),
        StatusCode::OK,
    )
    .await;
    assert_eq!(initial["youtubeUrl"], "");
    assert_eq!(initial["isEnabled"], false);

    harness.clock.advance_seconds(60);
    let saved: Value = call_json(
        &app,
        TestRequest::put()
            .uri("/api/v1/admin/video-settings")
            .set_json(json!({ "youtubeUrl": " https://youtu.be/open-day ", "isEnabled": true })),
        StatusCode::OK,
    )
    .await;
    assert_eq!(saved["youtubeUrl"], "https://youtu.be/open-day");
    assert_ne!(saved["updatedAt"], initial["updatedAt"]);

    let toggled: Value = call_json(
        &app,
        TestRequest::put()
            .uri("/api/v1/admin/video-settings")
            .set_json(json!({ "isEnabled": false })),
        StatusCode::OK,
    )
    .await;
    assert_eq!(toggled["youtubeUrl"], "https://youtu.be/open-day");
    assert_eq!(toggled["isEnabled"], false);
}
