//! Archive administration endpoints.
//!
//! ```text
//! GET    /api/v1/admin/archive?status=&reason=&limit=&offset=
//! POST   /api/v1/admin/archive/cleanup
//! GET    /api/v1/admin/archive/cleanup/preview?daysOld=&status=
//! DELETE /api/v1/admin/archive/{id}
//! POST   /api/v1/admin/archive/bulk-delete
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CleanupPreview, CleanupReport, CleanupRequest, DEFAULT_CLEANUP_DAYS};
use crate::domain::{ArchiveFilter, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{ArchivedEntryBody, BulkDeleteBody, BulkDeleteRequest};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, optional_text, parse_optional_queue_status, parse_uuid, parse_uuid_list,
};

/// Largest page an archive listing returns.
pub const MAX_ARCHIVE_PAGE: i64 = 500;

/// Archive listing filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ArchiveListQuery {
    pub status: Option<String>,
    /// `auto_backup`, `auto_cleanup`, `manual_reset`, or a custom label.
    pub reason: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn non_negative(value: Option<i64>, field: &'static str) -> Result<Option<i64>, Error> {
    match value {
        Some(v) if v < 0 => Err(Error::invalid_request(format!("{field} must not be negative"))
            .with_details(json!({ "field": field, "code": "negative" }))),
        other => Ok(other),
    }
}

impl TryFrom<ArchiveListQuery> for ArchiveFilter {
    type Error = Error;

    fn try_from(query: ArchiveListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_optional_queue_status(query.status, FieldName::new("status"))?,
            reason: optional_text(query.reason),
            limit: non_negative(query.limit, "limit")?.map(|limit| limit.min(MAX_ARCHIVE_PAGE)),
            offset: non_negative(query.offset, "offset")?,
        })
    }
}

/// Age-based cleanup selection.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CleanupRequestBody {
    /// Rows archived more than this many days ago; defaults to 30.
    pub days_old: Option<i64>,
    pub status: Option<String>,
}

impl TryFrom<CleanupRequestBody> for CleanupRequest {
    type Error = Error;

    fn try_from(body: CleanupRequestBody) -> Result<Self, Self::Error> {
        Ok(Self {
            days_old: body.days_old.unwrap_or(DEFAULT_CLEANUP_DAYS),
            status: parse_optional_queue_status(body.status, FieldName::new("status"))?,
        })
    }
}

/// Result of a cleanup run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReportBody {
    pub deleted: u64,
    #[schema(format = "date-time")]
    pub cutoff: String,
}

impl From<CleanupReport> for CleanupReportBody {
    fn from(report: CleanupReport) -> Self {
        Self {
            deleted: report.deleted,
            cutoff: report.cutoff.to_rfc3339(),
        }
    }
}

/// Rows a cleanup would delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupPreviewBody {
    pub count: u64,
    #[schema(format = "date-time")]
    pub cutoff: String,
    /// First hundred candidates, newest first.
    pub candidates: Vec<ArchivedEntryBody>,
}

impl From<CleanupPreview> for CleanupPreviewBody {
    fn from(preview: CleanupPreview) -> Self {
        Self {
            count: preview.count,
            cutoff: preview.cutoff.to_rfc3339(),
            candidates: preview.candidates.into_iter().map(Into::into).collect(),
        }
    }
}

/// List archive rows, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/archive",
    params(ArchiveListQuery),
    responses(
        (status = 200, description = "Archive rows", body = [ArchivedEntryBody]),
        (status = 400, description = "Invalid filter", body = crate::domain::Error)
    ),
    tags = ["archive"],
    operation_id = "listArchive"
)]
#[get("/admin/archive")]
pub async fn list_archive(
    state: web::Data<HttpState>,
    query: web::Query<ArchiveListQuery>,
) -> ApiResult<web::Json<Vec<ArchivedEntryBody>>> {
    let filter = ArchiveFilter::try_from(query.into_inner())?;
    let rows = state.archive_admin.list(filter).await?;
    Ok(web::Json(rows.into_iter().map(Into::into).collect()))
}

/// Delete rows archived before the cutoff.
#[utoipa::path(
    post,
    path = "/api/v1/admin/archive/cleanup",
    request_body = CleanupRequestBody,
    responses(
        (status = 200, description = "Rows deleted", body = CleanupReportBody),
        (status = 400, description = "Invalid selection", body = crate::domain::Error)
    ),
    tags = ["archive"],
    operation_id = "cleanupArchive"
)]
#[post("/admin/archive/cleanup")]
pub async fn cleanup_archive(
    state: web::Data<HttpState>,
    payload: web::Json<CleanupRequestBody>,
) -> ApiResult<web::Json<CleanupReportBody>> {
    let report = state
        .archive_admin
        .cleanup(CleanupRequest::try_from(payload.into_inner())?)
        .await?;
    Ok(web::Json(report.into()))
}

/// Report what a cleanup would delete.
#[utoipa::path(
    get,
    path = "/api/v1/admin/archive/cleanup/preview",
    params(CleanupRequestBody),
    responses(
        (status = 200, description = "Cleanup candidates", body = CleanupPreviewBody),
        (status = 400, description = "Invalid selection", body = crate::domain::Error)
    ),
    tags = ["archive"],
    operation_id = "previewArchiveCleanup"
)]
#[get("/admin/archive/cleanup/preview")]
pub async fn preview_cleanup(
    state: web::Data<HttpState>,
    query: web::Query<CleanupRequestBody>,
) -> ApiResult<web::Json<CleanupPreviewBody>> {
    let preview = state
        .archive_admin
        .preview_cleanup(CleanupRequest::try_from(query.into_inner())?)
        .await?;
    Ok(web::Json(preview.into()))
}

/// Delete the row with this id or original id.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/archive/{id}",
    params(("id" = String, Path, description = "Archive id or original queue entry id", format = "uuid")),
    responses(
        (status = 204, description = "Row deleted"),
        (status = 404, description = "Row not found", body = crate::domain::Error)
    ),
    tags = ["archive"],
    operation_id = "deleteArchiveEntry"
)]
#[delete("/admin/archive/{id}")]
pub async fn delete_archive_entry(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    state.archive_admin.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete rows by id or original id.
#[utoipa::path(
    post,
    path = "/api/v1/admin/archive/bulk-delete",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Deletion counts", body = BulkDeleteBody),
        (status = 400, description = "Invalid identifiers", body = crate::domain::Error)
    ),
    tags = ["archive"],
    operation_id = "bulkDeleteArchive"
)]
#[post("/admin/archive/bulk-delete")]
pub async fn bulk_delete_archive(
    state: web::Data<HttpState>,
    payload: web::Json<BulkDeleteRequest>,
) -> ApiResult<web::Json<BulkDeleteBody>> {
    let ids = parse_uuid_list(&payload.ids, FieldName::new("ids"))?;
    let outcome = state.archive_admin.bulk_delete(ids).await?;
    Ok(web::Json(outcome.into()))
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
