//! Admission staff desk endpoints.
//!
//! ```text
//! POST   /api/v1/admission/{employeeId}/start-work
//! POST   /api/v1/admission/{employeeId}/pause-work
//! POST   /api/v1/admission/{employeeId}/resume-work
//! POST   /api/v1/admission/{employeeId}/finish-work
//! POST   /api/v1/admission/{employeeId}/call-next
//! POST   /api/v1/admission/{employeeId}/complete-current
//! GET    /api/v1/admission/{employeeId}/status
//! GET    /api/v1/admission/{employeeId}/queue?status=
//! PUT    /api/v1/admission/{employeeId}/queue/{id}
//! DELETE /api/v1/admission/{employeeId}/queue/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CallNextOutcome, DeskStatus, EntryChanges};
use crate::domain::{EmployeeId, Error, QueueStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{EmployeeBody, QueueEntryBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, optional_text, parse_employee_id, parse_entry_id, parse_optional_employee_id,
    parse_optional_queue_status, require_programs, require_text,
};

const EMPLOYEE_ID: FieldName = FieldName::new("employeeId");

fn employee_id(path: web::Path<String>) -> Result<EmployeeId, Error> {
    parse_employee_id(&path.into_inner(), EMPLOYEE_ID)
}

/// Result of calling the next applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallNextBody {
    pub success: bool,
    /// `empty_queue` when nobody is waiting for this employee.
    pub message: Option<String>,
    pub entry: Option<QueueEntryBody>,
}

impl From<CallNextOutcome> for CallNextBody {
    fn from(outcome: CallNextOutcome) -> Self {
        match outcome {
            CallNextOutcome::Called(entry) => Self {
                success: true,
                message: None,
                entry: Some(entry.into()),
            },
            CallNextOutcome::EmptyQueue => Self {
                success: false,
                message: Some("empty_queue".to_owned()),
                entry: None,
            },
        }
    }
}

/// Snapshot of an employee's desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeskStatusBody {
    pub employee: EmployeeBody,
    pub current: Option<QueueEntryBody>,
    pub waiting: u64,
}

impl From<DeskStatus> for DeskStatusBody {
    fn from(status: DeskStatus) -> Self {
        Self {
            employee: status.employee.into(),
            current: status.current.map(Into::into),
            waiting: status.waiting,
        }
    }
}

/// Status filter for the assigned queue.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssignedQueueQuery {
    /// `waiting`, `in_progress`, `paused`, or `completed`.
    pub status: Option<String>,
}

/// Partial entry update; absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequestBody {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub programs: Option<Vec<String>>,
    pub status: Option<String>,
    pub notes: Option<String>,
    #[schema(format = "uuid")]
    pub assigned_employee_id: Option<String>,
    pub form_language: Option<String>,
}

impl TryFrom<UpdateEntryRequestBody> for EntryChanges {
    type Error = Error;

    fn try_from(body: UpdateEntryRequestBody) -> Result<Self, Self::Error> {
        Ok(Self {
            full_name: body
                .full_name
                .map(|name| require_text(name, FieldName::new("fullName")))
                .transpose()?,
            phone: body
                .phone
                .map(|phone| require_text(phone, FieldName::new("phone")))
                .transpose()?,
            programs: body
                .programs
                .map(|programs| require_programs(programs, FieldName::new("programs")))
                .transpose()?,
            status: parse_optional_queue_status(body.status, FieldName::new("status"))?,
            notes: body.notes.map(|notes| notes.trim().to_owned()),
            assigned_employee_id: parse_optional_employee_id(
                body.assigned_employee_id,
                FieldName::new("assignedEmployeeId"),
            )?,
            form_language: optional_text(body.form_language),
        })
    }
}

macro_rules! desk_transition {
    ($name:ident, $route:literal, $path:literal, $operation:literal, $method:ident, $summary:literal) => {
        #[doc = $summary]
        #[utoipa::path(
            post,
            path = $path,
            params(("employeeId" = String, Path, format = "uuid")),
            responses(
                (status = 200, description = "Employee after the transition", body = EmployeeBody),
                (status = 400, description = "Transition not allowed", body = crate::domain::Error),
                (status = 404, description = "Employee not found", body = crate::domain::Error)
            ),
            tags = ["admission"],
            operation_id = $operation
        )]
        #[post($route)]
        pub async fn $name(
            state: web::Data<HttpState>,
            path: web::Path<String>,
        ) -> ApiResult<web::Json<EmployeeBody>> {
            let id = employee_id(path)?;
            let employee = state.staff_desk.$method(&id).await?;
            Ok(web::Json(employee.into()))
        }
    };
}

desk_transition!(
    start_work,
    "/admission/{employee_id}/start-work",
    "/api/v1/admission/{employeeId}/start-work",
    "startWork",
    start_work,
    "Go online and start taking applicants."
);
desk_transition!(
    pause_work,
    "/admission/{employee_id}/pause-work",
    "/api/v1/admission/{employeeId}/pause-work",
    "pauseWork",
    pause_work,
    "Leave the rotation temporarily."
);
desk_transition!(
    resume_work,
    "/admission/{employee_id}/resume-work",
    "/api/v1/admission/{employeeId}/resume-work",
    "resumeWork",
    resume_work,
    "Return to the rotation after a pause."
);
desk_transition!(
    finish_work,
    "/admission/{employee_id}/finish-work",
    "/api/v1/admission/{employeeId}/finish-work",
    "finishWork",
    finish_work,
    "Go offline, completing the applicant in progress."
);
desk_transition!(
    complete_current,
    "/admission/{employee_id}/complete-current",
    "/api/v1/admission/{employeeId}/complete-current",
    "completeCurrent",
    complete_current,
    "Complete the applicant in progress and become available."
);

/// Call the next waiting applicant assigned to the employee.
#[utoipa::path(
    post,
    path = "/api/v1/admission/{employeeId}/call-next",
    params(("employeeId" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Called applicant or empty queue", body = CallNextBody),
        (status = 400, description = "Employee is not available", body = crate::domain::Error),
        (status = 404, description = "Employee not found", body = crate::domain::Error)
    ),
    tags = ["admission"],
    operation_id = "callNext"
)]
#[post("/admission/{employee_id}/call-next")]
pub async fn call_next(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CallNextBody>> {
    let id = employee_id(path)?;
    let outcome = state.staff_desk.call_next(&id).await?;
    Ok(web::Json(outcome.into()))
}

/// Current desk state.
#[utoipa::path(
    get,
    path = "/api/v1/admission/{employeeId}/status",
    params(("employeeId" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Desk state", body = DeskStatusBody),
        (status = 404, description = "Employee not found", body = crate::domain::Error)
    ),
    tags = ["admission"],
    operation_id = "deskStatus"
)]
#[get("/admission/{employee_id}/status")]
pub async fn desk_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeskStatusBody>> {
    let id = employee_id(path)?;
    let status = state.staff_desk.status(&id).await?;
    Ok(web::Json(status.into()))
}

/// Entries assigned to the employee.
#[utoipa::path(
    get,
    path = "/api/v1/admission/{employeeId}/queue",
    params(("employeeId" = String, Path, format = "uuid"), AssignedQueueQuery),
    responses(
        (status = 200, description = "Assigned entries", body = [QueueEntryBody]),
        (status = 400, description = "Unknown status", body = crate::domain::Error)
    ),
    tags = ["admission"],
    operation_id = "assignedQueue"
)]
#[get("/admission/{employee_id}/queue")]
pub async fn assigned_queue(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<AssignedQueueQuery>,
) -> ApiResult<web::Json<Vec<QueueEntryBody>>> {
    let id = employee_id(path)?;
    let status: Option<QueueStatus> =
        parse_optional_queue_status(query.into_inner().status, FieldName::new("status"))?;
    let entries = state.staff_desk.assigned_queue(&id, status).await?;
    Ok(web::Json(entries.into_iter().map(Into::into).collect()))
}

/// Partially update an entry.
#[utoipa::path(
    put,
    path = "/api/v1/admission/{employeeId}/queue/{id}",
    params(
        ("employeeId" = String, Path, format = "uuid"),
        ("id" = String, Path, description = "Queue entry id", format = "uuid")
    ),
    request_body = UpdateEntryRequestBody,
    responses(
        (status = 200, description = "Updated entry", body = QueueEntryBody),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 404, description = "Entry not found", body = crate::domain::Error),
        (status = 409, description = "Phone already queued", body = crate::domain::Error)
    ),
    tags = ["admission"],
    operation_id = "updateQueueEntry"
)]
#[put("/admission/{employee_id}/queue/{id}")]
pub async fn update_entry(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    payload: web::Json<UpdateEntryRequestBody>,
) -> ApiResult<web::Json<QueueEntryBody>> {
    let (employee, entry) = path.into_inner();
    parse_employee_id(&employee, EMPLOYEE_ID)?;
    let entry_id = parse_entry_id(&entry)?;
    let changes = EntryChanges::try_from(payload.into_inner())?;
    let updated = state.staff_desk.update_entry(&entry_id, changes).await?;
    Ok(web::Json(updated.into()))
}

/// Remove an entry from the queue; its archive row stays.
#[utoipa::path(
    delete,
    path = "/api/v1/admission/{employeeId}/queue/{id}",
    params(
        ("employeeId" = String, Path, format = "uuid"),
        ("id" = String, Path, description = "Queue entry id", format = "uuid")
    ),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Entry not found", body = crate::domain::Error)
    ),
    tags = ["admission"],
    operation_id = "deleteQueueEntry"
)]
#[delete("/admission/{employee_id}/queue/{id}")]
pub async fn delete_entry(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (employee, entry) = path.into_inner();
    parse_employee_id(&employee, EMPLOYEE_ID)?;
    let entry_id = parse_entry_id(&entry)?;
    state.staff_desk.delete_entry(&entry_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "admission_tests.rs"]
mod tests;
