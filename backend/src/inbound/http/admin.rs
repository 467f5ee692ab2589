//! Administration endpoints for staff records and the live queue.
//!
//! ```text
//! GET    /api/v1/admin/employees
//! POST   /api/v1/admin/employees
//! PUT    /api/v1/admin/employees/{id}
//! DELETE /api/v1/admin/employees/{id}
//! GET    /api/v1/admin/queue
//! DELETE /api/v1/admin/queue/{id}
//! POST   /api/v1/admin/queue/bulk-delete
//! POST   /api/v1/admin/queue/reset-numbering
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{EmployeeUpdateRequest, NewEmployeeRequest, RenumberingReport};
use crate::domain::{Error, QueueEntryId, QueueFilter};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{BulkDeleteBody, BulkDeleteRequest, EmployeeBody, QueueEntryBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, optional_text, parse_date, parse_employee_id, parse_employee_status,
    parse_entry_id, parse_optional_employee_id, parse_optional_queue_status, parse_uuid_list,
    require_text,
};

/// Request payload registering an employee.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequestBody {
    pub full_name: String,
    pub desk: Option<String>,
}

/// Partial employee update. An empty desk clears it.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequestBody {
    pub full_name: Option<String>,
    pub desk: Option<String>,
    /// `offline`, `available`, `busy`, or `paused`.
    pub status: Option<String>,
}

impl TryFrom<UpdateEmployeeRequestBody> for EmployeeUpdateRequest {
    type Error = Error;

    fn try_from(body: UpdateEmployeeRequestBody) -> Result<Self, Self::Error> {
        Ok(Self {
            full_name: body
                .full_name
                .map(|name| require_text(name, FieldName::new("fullName")))
                .transpose()?,
            desk: body.desk,
            status: body
                .status
                .map(|status| parse_employee_status(&status, FieldName::new("status")))
                .transpose()?,
        })
    }
}

/// Queue listing filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct QueueListQuery {
    pub status: Option<String>,
    /// Creation day as `YYYY-MM-DD`.
    pub date: Option<String>,
    pub employee_id: Option<String>,
    /// Substring of the assigned employee name.
    pub employee_name: Option<String>,
    /// Substring of the applicant name.
    pub full_name: Option<String>,
    pub program: Option<String>,
}

impl TryFrom<QueueListQuery> for QueueFilter {
    type Error = Error;

    fn try_from(query: QueueListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_optional_queue_status(query.status, FieldName::new("status"))?,
            created_on: optional_text(query.date)
                .map(|date| parse_date(&date, FieldName::new("date")))
                .transpose()?,
            assigned_employee_id: parse_optional_employee_id(
                query.employee_id,
                FieldName::new("employeeId"),
            )?,
            employee_name: optional_text(query.employee_name),
            full_name: optional_text(query.full_name),
            program: optional_text(query.program),
        })
    }
}

/// Counts reported by a numbering reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenumberingBody {
    pub archived_completed: u64,
    pub renumbered_active: u64,
    pub next_number: i32,
}

impl From<RenumberingReport> for RenumberingBody {
    fn from(report: RenumberingReport) -> Self {
        Self {
            archived_completed: report.archived_completed,
            renumbered_active: report.renumbered_active,
            next_number: report.next_number,
        }
    }
}

/// List every employee.
#[utoipa::path(
    get,
    path = "/api/v1/admin/employees",
    responses((status = 200, description = "Employees ordered by name", body = [EmployeeBody])),
    tags = ["admin"],
    operation_id = "listEmployees"
)]
#[get("/admin/employees")]
pub async fn list_employees(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<EmployeeBody>>> {
    let employees = state.staff_directory.list().await?;
    Ok(web::Json(employees.into_iter().map(Into::into).collect()))
}

/// Register an employee.
#[utoipa::path(
    post,
    path = "/api/v1/admin/employees",
    request_body = CreateEmployeeRequestBody,
    responses(
        (status = 201, description = "Employee registered", body = EmployeeBody),
        (status = 400, description = "Invalid request", body = crate::domain::Error)
    ),
    tags = ["admin"],
    operation_id = "createEmployee"
)]
#[post("/admin/employees")]
pub async fn create_employee(
    state: web::Data<HttpState>,
    payload: web::Json<CreateEmployeeRequestBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let request = NewEmployeeRequest {
        full_name: require_text(body.full_name, FieldName::new("fullName"))?,
        desk: body.desk,
    };
    let employee = state.staff_directory.create(request).await?;
    Ok(HttpResponse::Created().json(EmployeeBody::from(employee)))
}

/// Update an employee.
#[utoipa::path(
    put,
    path = "/api/v1/admin/employees/{id}",
    params(("id" = String, Path, format = "uuid")),
    request_body = UpdateEmployeeRequestBody,
    responses(
        (status = 200, description = "Updated employee", body = EmployeeBody),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 404, description = "Employee not found", body = crate::domain::Error)
    ),
    tags = ["admin"],
    operation_id = "updateEmployee"
)]
#[put("/admin/employees/{id}")]
pub async fn update_employee(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateEmployeeRequestBody>,
) -> ApiResult<web::Json<EmployeeBody>> {
    let id = parse_employee_id(&path.into_inner(), FieldName::new("id"))?;
    let request = EmployeeUpdateRequest::try_from(payload.into_inner())?;
    let employee = state.staff_directory.update(&id, request).await?;
    Ok(web::Json(employee.into()))
}

/// Remove an employee. Their entries keep the stored name.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/employees/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 204, description = "Employee removed"),
        (status = 404, description = "Employee not found", body = crate::domain::Error)
    ),
    tags = ["admin"],
    operation_id = "deleteEmployee"
)]
#[delete("/admin/employees/{id}")]
pub async fn delete_employee(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_employee_id(&path.into_inner(), FieldName::new("id"))?;
    state.staff_directory.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List queue entries matching the filters.
#[utoipa::path(
    get,
    path = "/api/v1/admin/queue",
    params(QueueListQuery),
    responses(
        (status = 200, description = "Matching entries by number", body = [QueueEntryBody]),
        (status = 400, description = "Invalid filter", body = crate::domain::Error)
    ),
    tags = ["admin"],
    operation_id = "listQueue"
)]
#[get("/admin/queue")]
pub async fn list_queue(
    state: web::Data<HttpState>,
    query: web::Query<QueueListQuery>,
) -> ApiResult<web::Json<Vec<QueueEntryBody>>> {
    let filter = QueueFilter::try_from(query.into_inner())?;
    let entries = state.queue_admin.list(filter).await?;
    Ok(web::Json(entries.into_iter().map(Into::into).collect()))
}

/// Delete one queue entry; the archive row stays.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/queue/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Entry not found", body = crate::domain::Error)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteQueueEntry"
)]
#[delete("/admin/queue/{id}")]
pub async fn delete_queue_entry(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_entry_id(&path.into_inner())?;
    state.queue_admin.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete many queue entries.
#[utoipa::path(
    post,
    path = "/api/v1/admin/queue/bulk-delete",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Deletion counts", body = BulkDeleteBody),
        (status = 400, description = "Invalid identifiers", body = crate::domain::Error)
    ),
    tags = ["admin"],
    operation_id = "bulkDeleteQueue"
)]
#[post("/admin/queue/bulk-delete")]
pub async fn bulk_delete_queue(
    state: web::Data<HttpState>,
    payload: web::Json<BulkDeleteRequest>,
) -> ApiResult<web::Json<BulkDeleteBody>> {
    let ids = parse_uuid_list(&payload.ids, FieldName::new("ids"))?
        .into_iter()
        .map(QueueEntryId::from_uuid)
        .collect();
    let outcome = state.queue_admin.bulk_delete(ids).await?;
    Ok(web::Json(outcome.into()))
}

/// Drop completed entries and renumber the rest from 1.
#[utoipa::path(
    post,
    path = "/api/v1/admin/queue/reset-numbering",
    responses((status = 200, description = "Renumbering counts", body = RenumberingBody)),
    tags = ["admin"],
    operation_id = "resetNumbering"
)]
#[post("/admin/queue/reset-numbering")]
pub async fn reset_numbering(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<RenumberingBody>> {
    let report = state.queue_admin.reset_numbering().await?;
    Ok(web::Json(report.into()))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
