//! Response bodies shared by several handler modules.
//!
//! Domain records stay free of serialisation concerns; these bodies give them
//! their camelCase wire shape and OpenAPI schema.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::mirror::{SyncLog, SyncLogStatus, SyncMode, SyncOperation, SyncSettings};
use crate::domain::ports::BulkDeleteOutcome;
use crate::domain::{ArchivedQueueEntry, Employee, EmployeeStatus, QueueEntry, QueueStatus};

/// Queue entry as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntryBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub queue_number: i32,
    pub full_name: String,
    pub phone: String,
    pub programs: Vec<String>,
    pub status: QueueStatus,
    pub notes: Option<String>,
    #[schema(format = "uuid")]
    pub assigned_employee_id: Option<String>,
    pub assigned_employee_name: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
    /// Seconds from creation to completion.
    pub processing_time: Option<i64>,
    pub form_language: Option<String>,
}

impl From<QueueEntry> for QueueEntryBody {
    fn from(entry: QueueEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            queue_number: entry.queue_number,
            full_name: entry.full_name,
            phone: entry.phone,
            programs: entry.programs,
            status: entry.status,
            notes: entry.notes,
            assigned_employee_id: entry.assigned_employee_id.map(|id| id.to_string()),
            assigned_employee_name: entry.assigned_employee_name,
            created_at: entry.created_at.to_rfc3339(),
            updated_at: entry.updated_at.to_rfc3339(),
            processing_time: entry.processing_time,
            form_language: entry.form_language,
        }
    }
}

/// Admission employee as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub full_name: String,
    pub desk: Option<String>,
    pub status: EmployeeStatus,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Employee> for EmployeeBody {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id.to_string(),
            full_name: employee.full_name,
            desk: employee.desk,
            status: employee.status,
            created_at: employee.created_at.to_rfc3339(),
        }
    }
}

/// Archived queue entry as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedEntryBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub original_id: String,
    pub queue_number: i32,
    pub full_name: String,
    pub phone: String,
    pub programs: Vec<String>,
    pub status: QueueStatus,
    pub notes: Option<String>,
    pub assigned_employee_name: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
    #[schema(format = "date-time")]
    pub completed_at: Option<String>,
    pub processing_time: Option<i64>,
    pub form_language: Option<String>,
    #[schema(format = "date-time")]
    pub archived_at: String,
    #[schema(example = "auto_backup")]
    pub archive_reason: String,
}

impl From<ArchivedQueueEntry> for ArchivedEntryBody {
    fn from(row: ArchivedQueueEntry) -> Self {
        Self {
            id: row.id.to_string(),
            original_id: row.original_id.to_string(),
            queue_number: row.queue_number,
            full_name: row.full_name,
            phone: row.phone,
            programs: row.programs,
            status: row.status,
            notes: row.notes,
            assigned_employee_name: row.assigned_employee_name,
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.to_rfc3339(),
            completed_at: row.completed_at.map(|at| at.to_rfc3339()),
            processing_time: row.processing_time,
            form_language: row.form_language,
            archived_at: row.archived_at.to_rfc3339(),
            archive_reason: row.archive_reason.as_str().to_owned(),
        }
    }
}

/// Counts reported by bulk deletions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteBody {
    pub deleted: u64,
    pub not_found: u64,
}

impl From<BulkDeleteOutcome> for BulkDeleteBody {
    fn from(outcome: BulkDeleteOutcome) -> Self {
        Self {
            deleted: outcome.deleted,
            not_found: outcome.not_found,
        }
    }
}

/// Request listing identifiers for a bulk deletion.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    #[schema(value_type = Vec<uuid::Uuid>)]
    pub ids: Vec<String>,
}

/// Mirror settings as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettingsBody {
    pub spreadsheet_id: Option<String>,
    pub sheet_name: String,
    pub enabled: bool,
    pub sync_mode: SyncMode,
    #[schema(format = "date-time")]
    pub last_sync_at: Option<String>,
    pub last_sync_status: Option<SyncLogStatus>,
    pub last_sync_message: Option<String>,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<SyncSettings> for SyncSettingsBody {
    fn from(settings: SyncSettings) -> Self {
        Self {
            spreadsheet_id: settings.spreadsheet_id,
            sheet_name: settings.sheet_name,
            enabled: settings.enabled,
            sync_mode: settings.mode,
            last_sync_at: settings.last_sync_at.map(|at| at.to_rfc3339()),
            last_sync_status: settings.last_sync_status,
            last_sync_message: settings.last_sync_message,
            updated_at: settings.updated_at.to_rfc3339(),
        }
    }
}

/// One mirror audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncLogBody {
    pub id: i64,
    pub operation: SyncOperation,
    #[schema(format = "uuid")]
    pub entry_id: Option<String>,
    pub status: SyncLogStatus,
    pub message: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<SyncLog> for SyncLogBody {
    fn from(log: SyncLog) -> Self {
        Self {
            id: log.id,
            operation: log.operation,
            entry_id: log.entry_id.map(|id| id.to_string()),
            status: log.status,
            message: log.message,
            created_at: log.created_at.to_rfc3339(),
        }
    }
}
