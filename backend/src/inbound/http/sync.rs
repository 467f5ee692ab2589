//! Spreadsheet mirror administration endpoints.
//!
//! ```text
//! GET  /api/v1/admin/sync/settings
//! PUT  /api/v1/admin/sync/settings
//! GET  /api/v1/admin/sync/status
//! POST /api/v1/admin/sync/full
//! POST /api/v1/admin/sync/manual
//! POST /api/v1/admin/sync/test
//! GET  /api/v1/admin/sync/stats
//! GET  /api/v1/admin/sync/health
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::mirror::{SyncMode, SyncSettingsUpdate};
use crate::domain::ports::{
    ConnectionReport, FullSyncReport, MirrorHealth, SyncStats, SyncStatusReport,
};
use crate::domain::{Error, TraceId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{SyncLogBody, SyncSettingsBody};
use crate::inbound::http::state::HttpState;

/// Settings update; absent fields stay unchanged. A blank spreadsheet id
/// clears it and a blank sheet name restores `Sheet1`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSyncSettingsRequestBody {
    pub spreadsheet_id: Option<String>,
    pub sheet_name: Option<String>,
    pub enabled: Option<bool>,
    /// `realtime`, `manual`, or `scheduled`.
    pub sync_mode: Option<String>,
}

impl TryFrom<UpdateSyncSettingsRequestBody> for SyncSettingsUpdate {
    type Error = Error;

    fn try_from(body: UpdateSyncSettingsRequestBody) -> Result<Self, Self::Error> {
        let mode = body
            .sync_mode
            .map(|raw| {
                raw.trim().parse::<SyncMode>().map_err(|_| {
                    Error::invalid_request("syncMode must be one of realtime, manual, scheduled")
                        .with_details(json!({
                            "field": "syncMode",
                            "value": raw,
                            "code": "invalid_sync_mode",
                        }))
                })
            })
            .transpose()?;
        Ok(Self {
            spreadsheet_id: body.spreadsheet_id,
            sheet_name: body.sheet_name,
            enabled: body.enabled,
            mode,
        })
    }
}

/// Mirror settings with live counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusBody {
    pub settings: SyncSettingsBody,
    pub archive_total: u64,
    pub pending_changes: u64,
}

impl From<SyncStatusReport> for SyncStatusBody {
    fn from(report: SyncStatusReport) -> Self {
        Self {
            settings: report.settings.into(),
            archive_total: report.archive_total,
            pending_changes: report.pending_changes,
        }
    }
}

/// Result of a synchronous full resync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FullSyncBody {
    pub success: bool,
    pub rows_written: u64,
}

impl From<FullSyncReport> for FullSyncBody {
    fn from(report: FullSyncReport) -> Self {
        Self {
            success: true,
            rows_written: report.rows_written,
        }
    }
}

/// Acknowledgement of a background resync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualSyncBody {
    pub started: bool,
    #[schema(format = "uuid")]
    pub trace_id: Option<String>,
}

/// Spreadsheet details confirmed by a connection test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestBody {
    pub success: bool,
    pub spreadsheet_id: String,
    pub title: String,
    pub sheet_name: String,
    pub sheet_names: Vec<String>,
}

impl From<ConnectionReport> for ConnectionTestBody {
    fn from(report: ConnectionReport) -> Self {
        Self {
            success: true,
            spreadsheet_id: report.spreadsheet_id,
            title: report.title,
            sheet_name: report.sheet_name,
            sheet_names: report.sheet_names,
        }
    }
}

/// Audit trail summary for the last day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatsBody {
    pub archive_total: u64,
    pub total_logs: u64,
    pub successes_last_day: u64,
    pub errors_last_day: u64,
    pub recent_logs: Vec<SyncLogBody>,
}

impl From<SyncStats> for SyncStatsBody {
    fn from(stats: SyncStats) -> Self {
        Self {
            archive_total: stats.archive_total,
            total_logs: stats.total_logs,
            successes_last_day: stats.successes_last_day,
            errors_last_day: stats.errors_last_day,
            recent_logs: stats.recent_logs.into_iter().map(Into::into).collect(),
        }
    }
}

/// Mirror health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MirrorHealthBody {
    /// `not_configured`, `disabled`, `misconfigured`, or `healthy`.
    pub status: String,
    pub message: Option<String>,
    pub archive_total: u64,
    pub sheet_rows: Option<u64>,
    pub needs_full_sync: bool,
}

impl From<MirrorHealth> for MirrorHealthBody {
    fn from(health: MirrorHealth) -> Self {
        Self {
            status: health.state.as_str().to_owned(),
            message: health.message,
            archive_total: health.archive_total,
            sheet_rows: health.sheet_rows,
            needs_full_sync: health.needs_full_sync,
        }
    }
}

/// Current mirror settings.
#[utoipa::path(
    get,
    path = "/api/v1/admin/sync/settings",
    responses((status = 200, description = "Mirror settings", body = SyncSettingsBody)),
    tags = ["sync"],
    operation_id = "getSyncSettings"
)]
#[get("/admin/sync/settings")]
pub async fn get_settings(state: web::Data<HttpState>) -> ApiResult<web::Json<SyncSettingsBody>> {
    let settings = state.mirror.settings().await?;
    Ok(web::Json(settings.into()))
}

/// Update mirror settings.
#[utoipa::path(
    put,
    path = "/api/v1/admin/sync/settings",
    request_body = UpdateSyncSettingsRequestBody,
    responses(
        (status = 200, description = "Saved settings", body = SyncSettingsBody),
        (status = 400, description = "Invalid request", body = crate::domain::Error)
    ),
    tags = ["sync"],
    operation_id = "updateSyncSettings"
)]
#[put("/admin/sync/settings")]
pub async fn update_settings(
    state: web::Data<HttpState>,
    payload: web::Json<UpdateSyncSettingsRequestBody>,
) -> ApiResult<web::Json<SyncSettingsBody>> {
    let update = SyncSettingsUpdate::try_from(payload.into_inner())?;
    let settings = state.mirror.update_settings(update).await?;
    Ok(web::Json(settings.into()))
}

/// Settings with archive and outbox counters.
#[utoipa::path(
    get,
    path = "/api/v1/admin/sync/status",
    responses((status = 200, description = "Mirror status", body = SyncStatusBody)),
    tags = ["sync"],
    operation_id = "getSyncStatus"
)]
#[get("/admin/sync/status")]
pub async fn sync_status(state: web::Data<HttpState>) -> ApiResult<web::Json<SyncStatusBody>> {
    let report = state.mirror.status().await?;
    Ok(web::Json(report.into()))
}

/// Rewrite the whole sheet and wait for the result.
#[utoipa::path(
    post,
    path = "/api/v1/admin/sync/full",
    responses(
        (status = 200, description = "Sheet rewritten", body = FullSyncBody),
        (status = 400, description = "Mirror not configured", body = crate::domain::Error),
        (status = 503, description = "Spreadsheet unavailable", body = crate::domain::Error)
    ),
    tags = ["sync"],
    operation_id = "runFullSync"
)]
#[post("/admin/sync/full")]
pub async fn full_sync(state: web::Data<HttpState>) -> ApiResult<web::Json<FullSyncBody>> {
    let report = state.mirror.run_full_sync().await?;
    Ok(web::Json(report.into()))
}

/// Start a full resync in the background.
#[utoipa::path(
    post,
    path = "/api/v1/admin/sync/manual",
    responses(
        (status = 202, description = "Resync started", body = ManualSyncBody),
        (status = 400, description = "Mirror not configured", body = crate::domain::Error)
    ),
    tags = ["sync"],
    operation_id = "startManualSync"
)]
#[post("/admin/sync/manual")]
pub async fn manual_sync(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    state.mirror.start_background_sync().await?;
    Ok(HttpResponse::Accepted().json(ManualSyncBody {
        started: true,
        trace_id: TraceId::current().map(|id| id.to_string()),
    }))
}

/// Reconnect from scratch and describe the spreadsheet.
#[utoipa::path(
    post,
    path = "/api/v1/admin/sync/test",
    responses(
        (status = 200, description = "Spreadsheet reachable", body = ConnectionTestBody),
        (status = 400, description = "Mirror not configured", body = crate::domain::Error),
        (status = 503, description = "Spreadsheet unavailable", body = crate::domain::Error)
    ),
    tags = ["sync"],
    operation_id = "testSyncConnection"
)]
#[post("/admin/sync/test")]
pub async fn test_connection(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<ConnectionTestBody>> {
    let report = state.mirror.test_connection().await?;
    Ok(web::Json(report.into()))
}

/// Audit trail summary.
#[utoipa::path(
    get,
    path = "/api/v1/admin/sync/stats",
    responses((status = 200, description = "Sync statistics", body = SyncStatsBody)),
    tags = ["sync"],
    operation_id = "getSyncStats"
)]
#[get("/admin/sync/stats")]
pub async fn sync_stats(state: web::Data<HttpState>) -> ApiResult<web::Json<SyncStatsBody>> {
    let stats = state.mirror.stats().await?;
    Ok(web::Json(stats.into()))
}

/// Mirror health.
#[utoipa::path(
    get,
    path = "/api/v1/admin/sync/health",
    responses((status = 200, description = "Mirror health", body = MirrorHealthBody)),
    tags = ["sync"],
    operation_id = "getSyncHealth"
)]
#[get("/admin/sync/health")]
pub async fn sync_health(state: web::Data<HttpState>) -> ApiResult<web::Json<MirrorHealthBody>> {
    let health = state.mirror.health().await?;
    Ok(web::Json(health.into()))
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
