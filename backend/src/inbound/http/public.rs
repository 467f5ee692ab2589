//! Public queue endpoints used by applicants and the lobby display.
//!
//! ```text
//! POST   /api/v1/public/queue
//! GET    /api/v1/public/queue/check?fullName=
//! DELETE /api/v1/public/queue/{id}/cancel
//! PUT    /api/v1/public/queue/{id}/move-back
//! GET    /api/v1/public/queue/count
//! GET    /api/v1/public/display-queue
//! GET    /api/v1/public/employees
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{DisplayBoardEntry, JoinQueueRequest, QueueStanding};
use crate::domain::{Error, QueueStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{EmployeeBody, QueueEntryBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, optional_text, parse_entry_id, parse_optional_employee_id,
    require_programs, require_text,
};

/// Request payload for joining the queue.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinQueueRequestBody {
    pub full_name: String,
    pub phone: String,
    pub programs: Vec<String>,
    #[schema(format = "uuid")]
    pub assigned_employee_id: Option<String>,
    pub notes: Option<String>,
    #[schema(example = "ru")]
    pub form_language: Option<String>,
}

impl TryFrom<JoinQueueRequestBody> for JoinQueueRequest {
    type Error = Error;

    fn try_from(body: JoinQueueRequestBody) -> Result<Self, Self::Error> {
        Ok(Self {
            full_name: require_text(body.full_name, FieldName::new("fullName"))?,
            phone: require_text(body.phone, FieldName::new("phone"))?,
            programs: require_programs(body.programs, FieldName::new("programs"))?,
            assigned_employee_id: parse_optional_employee_id(
                body.assigned_employee_id,
                FieldName::new("assignedEmployeeId"),
            )?,
            notes: optional_text(body.notes),
            form_language: optional_text(body.form_language),
        })
    }
}

/// Query for the status check.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CheckQuery {
    /// Exact full name the entry was submitted under.
    pub full_name: Option<String>,
}

/// An entry with its standing among waiting applicants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueStandingBody {
    pub entry: QueueEntryBody,
    /// One-based position among waiting entries; absent unless waiting.
    pub position: Option<i64>,
    pub people_ahead: Option<i64>,
    pub estimated_wait_minutes: Option<i64>,
}

impl From<QueueStanding> for QueueStandingBody {
    fn from(standing: QueueStanding) -> Self {
        let position = standing.position;
        Self {
            entry: QueueEntryBody::from(standing.entry),
            position: position.map(|p| p.position),
            people_ahead: position.map(|p| p.people_ahead),
            estimated_wait_minutes: position.map(|p| p.estimated_wait_minutes),
        }
    }
}

/// Number of open entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueCountBody {
    pub count: u64,
}

/// One line of the lobby display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBoardBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub queue_number: i32,
    pub status: QueueStatus,
    pub assigned_employee_name: Option<String>,
    pub employee_desk: Option<String>,
}

impl From<DisplayBoardEntry> for DisplayBoardBody {
    fn from(entry: DisplayBoardEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            queue_number: entry.queue_number,
            status: entry.status,
            assigned_employee_name: entry.assigned_employee_name,
            employee_desk: entry.employee_desk,
        }
    }
}

/// Join the queue.
#[utoipa::path(
    post,
    path = "/api/v1/public/queue",
    request_body = JoinQueueRequestBody,
    responses(
        (status = 201, description = "Entry admitted", body = QueueEntryBody),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 404, description = "Requested employee not found", body = crate::domain::Error),
        (status = 409, description = "Phone already queued", body = crate::domain::Error),
        (status = 503, description = "Service unavailable", body = crate::domain::Error)
    ),
    tags = ["public"],
    operation_id = "joinQueue"
)]
#[post("/public/queue")]
pub async fn join_queue(
    state: web::Data<HttpState>,
    payload: web::Json<JoinQueueRequestBody>,
) -> ApiResult<HttpResponse> {
    let request = JoinQueueRequest::try_from(payload.into_inner())?;
    let entry = state.visitor_queue.join(request).await?;
    Ok(HttpResponse::Created().json(QueueEntryBody::from(entry)))
}

/// Look up the latest entry submitted under a full name.
#[utoipa::path(
    get,
    path = "/api/v1/public/queue/check",
    params(CheckQuery),
    responses(
        (status = 200, description = "Entry standing", body = QueueStandingBody),
        (status = 400, description = "Missing full name", body = crate::domain::Error),
        (status = 404, description = "No entry under this name", body = crate::domain::Error)
    ),
    tags = ["public"],
    operation_id = "checkQueue"
)]
#[get("/public/queue/check")]
pub async fn check_queue(
    state: web::Data<HttpState>,
    query: web::Query<CheckQuery>,
) -> ApiResult<web::Json<QueueStandingBody>> {
    let full_name = optional_text(query.into_inner().full_name)
        .ok_or_else(|| missing_field_error(FieldName::new("fullName")))?;
    let standing = state.visitor_queue.check(&full_name).await?;
    Ok(web::Json(standing.into()))
}

/// Withdraw an entry.
#[utoipa::path(
    delete,
    path = "/api/v1/public/queue/{id}/cancel",
    params(("id" = String, Path, description = "Queue entry id", format = "uuid")),
    responses(
        (status = 200, description = "Entry cancelled", body = QueueEntryBody),
        (status = 400, description = "Entry is no longer open", body = crate::domain::Error),
        (status = 404, description = "Entry not found", body = crate::domain::Error)
    ),
    tags = ["public"],
    operation_id = "cancelQueueEntry"
)]
#[delete("/public/queue/{id}/cancel")]
pub async fn cancel_entry(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<QueueEntryBody>> {
    let id = parse_entry_id(&path.into_inner())?;
    let entry = state.visitor_queue.cancel(&id).await?;
    Ok(web::Json(entry.into()))
}

/// Move a waiting entry to the end of the queue.
#[utoipa::path(
    put,
    path = "/api/v1/public/queue/{id}/move-back",
    params(("id" = String, Path, description = "Queue entry id", format = "uuid")),
    responses(
        (status = 200, description = "Entry moved", body = QueueStandingBody),
        (status = 400, description = "Entry is not waiting", body = crate::domain::Error),
        (status = 404, description = "Entry not found", body = crate::domain::Error)
    ),
    tags = ["public"],
    operation_id = "moveQueueEntryBack"
)]
#[put("/public/queue/{id}/move-back")]
pub async fn move_back(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<QueueStandingBody>> {
    let id = parse_entry_id(&path.into_inner())?;
    let standing = state.visitor_queue.move_back(&id).await?;
    Ok(web::Json(standing.into()))
}

/// Count waiting and in-progress entries.
#[utoipa::path(
    get,
    path = "/api/v1/public/queue/count",
    responses((status = 200, description = "Open entry count", body = QueueCountBody)),
    tags = ["public"],
    operation_id = "countQueue"
)]
#[get("/public/queue/count")]
pub async fn queue_count(state: web::Data<HttpState>) -> ApiResult<web::Json<QueueCountBody>> {
    let count = state.visitor_queue.open_count().await?;
    Ok(web::Json(QueueCountBody { count }))
}

/// Entries currently being served, for the lobby display.
#[utoipa::path(
    get,
    path = "/api/v1/public/display-queue",
    responses((status = 200, description = "Display board", body = [DisplayBoardBody])),
    tags = ["public"],
    operation_id = "displayQueue"
)]
#[get("/public/display-queue")]
pub async fn display_queue(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<DisplayBoardBody>>> {
    let board = state.visitor_queue.display_board().await?;
    Ok(web::Json(board.into_iter().map(Into::into).collect()))
}

/// Admission staff applicants may ask for.
#[utoipa::path(
    get,
    path = "/api/v1/public/employees",
    responses((status = 200, description = "Admission staff", body = [EmployeeBody])),
    tags = ["public"],
    operation_id = "listPublicEmployees"
)]
#[get("/public/employees")]
pub async fn list_employees(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<EmployeeBody>>> {
    let employees = state.staff_directory.list().await?;
    Ok(web::Json(employees.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
#[path = "public_tests.rs"]
mod tests;
