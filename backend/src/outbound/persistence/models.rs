//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types fail with a
//! plain message when a stored label is not recognised; repositories wrap it
//! in their own query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::mirror::{SyncLog, SyncSettings};
use crate::domain::ports::OutboxIntent;
use crate::domain::{
    ArchiveEntryId, ArchiveReason, ArchivedQueueEntry, DisplayVideoSettings, Employee, EmployeeId,
    QueueEntry, QueueEntryId,
};

use super::schema::{
    archived_queue_entries, display_settings, employees, mirror_outbox, queue_entries, sync_logs,
    sync_settings,
};

/// Primary key of the only `sync_settings` and `display_settings` rows.
pub(crate) const SETTINGS_ROW_ID: i16 = 1;

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = employees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct EmployeeRow {
    pub id: Uuid,
    pub full_name: String,
    pub desk: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Employee> for EmployeeRow {
    fn from(employee: &Employee) -> Self {
        Self {
            id: *employee.id.as_uuid(),
            full_name: employee.full_name.clone(),
            desk: employee.desk.clone(),
            status: employee.status.as_str().to_owned(),
            created_at: employee.created_at,
        }
    }
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = String;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EmployeeId::from_uuid(row.id),
            full_name: row.full_name,
            desk: row.desk,
            status: row.status.parse().map_err(|err| format!("{err}"))?,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Queue entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = queue_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct QueueEntryRow {
    pub id: Uuid,
    pub queue_number: i32,
    pub full_name: String,
    pub phone: String,
    pub programs: Vec<String>,
    pub status: String,
    pub notes: Option<String>,
    pub assigned_employee_id: Option<Uuid>,
    pub assigned_employee_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub processing_time: Option<i64>,
    pub form_language: Option<String>,
}

impl From<&QueueEntry> for QueueEntryRow {
    fn from(entry: &QueueEntry) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            queue_number: entry.queue_number,
            full_name: entry.full_name.clone(),
            phone: entry.phone.clone(),
            programs: entry.programs.clone(),
            status: entry.status.as_str().to_owned(),
            notes: entry.notes.clone(),
            assigned_employee_id: entry.assigned_employee_id.map(|id| *id.as_uuid()),
            assigned_employee_name: entry.assigned_employee_name.clone(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            processing_time: entry.processing_time,
            form_language: entry.form_language.clone(),
        }
    }
}

impl TryFrom<QueueEntryRow> for QueueEntry {
    type Error = String;

    fn try_from(row: QueueEntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: QueueEntryId::from_uuid(row.id),
            queue_number: row.queue_number,
            full_name: row.full_name,
            phone: row.phone,
            programs: row.programs,
            status: row.status.parse().map_err(|err| format!("{err}"))?,
            notes: row.notes,
            assigned_employee_id: row.assigned_employee_id.map(EmployeeId::from_uuid),
            assigned_employee_name: row.assigned_employee_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            processing_time: row.processing_time,
            form_language: row.form_language,
        })
    }
}

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = archived_queue_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArchivedEntryRow {
    pub id: Uuid,
    pub original_id: Uuid,
    pub queue_number: i32,
    pub full_name: String,
    pub phone: String,
    pub programs: Vec<String>,
    pub status: String,
    pub notes: Option<String>,
    pub assigned_employee_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub processing_time: Option<i64>,
    pub form_language: Option<String>,
    pub archived_at: DateTime<Utc>,
    pub archive_reason: String,
}

impl From<&ArchivedQueueEntry> for ArchivedEntryRow {
    fn from(row: &ArchivedQueueEntry) -> Self {
        Self {
            id: *row.id.as_uuid(),
            original_id: *row.original_id.as_uuid(),
            queue_number: row.queue_number,
            full_name: row.full_name.clone(),
            phone: row.phone.clone(),
            programs: row.programs.clone(),
            status: row.status.as_str().to_owned(),
            notes: row.notes.clone(),
            assigned_employee_name: row.assigned_employee_name.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
            processing_time: row.processing_time,
            form_language: row.form_language.clone(),
            archived_at: row.archived_at,
            archive_reason: row.archive_reason.as_str().to_owned(),
        }
    }
}

impl TryFrom<ArchivedEntryRow> for ArchivedQueueEntry {
    type Error = String;

    fn try_from(row: ArchivedEntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ArchiveEntryId::from_uuid(row.id),
            original_id: QueueEntryId::from_uuid(row.original_id),
            queue_number: row.queue_number,
            full_name: row.full_name,
            phone: row.phone,
            programs: row.programs,
            status: row.status.parse().map_err(|err| format!("{err}"))?,
            notes: row.notes,
            assigned_employee_name: row.assigned_employee_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
            processing_time: row.processing_time,
            form_language: row.form_language,
            archived_at: row.archived_at,
            archive_reason: ArchiveReason::from(row.archive_reason),
        })
    }
}

// ---------------------------------------------------------------------------
// Mirror state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = sync_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SyncSettingsRow {
    pub id: i16,
    pub spreadsheet_id: Option<String>,
    pub sheet_name: String,
    pub enabled: bool,
    pub sync_mode: String,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_sync_status: Option<String>,
    pub last_sync_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SyncSettings> for SyncSettingsRow {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            id: SETTINGS_ROW_ID,
            spreadsheet_id: settings.spreadsheet_id.clone(),
            sheet_name: settings.sheet_name.clone(),
            enabled: settings.enabled,
            sync_mode: settings.mode.as_str().to_owned(),
            last_sync_at: settings.last_sync_at,
            last_sync_status: settings
                .last_sync_status
                .map(|status| status.as_str().to_owned()),
            last_sync_message: settings.last_sync_message.clone(),
            created_at: settings.created_at,
            updated_at: settings.updated_at,
        }
    }
}

impl TryFrom<SyncSettingsRow> for SyncSettings {
    type Error = String;

    fn try_from(row: SyncSettingsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            spreadsheet_id: row.spreadsheet_id,
            sheet_name: row.sheet_name,
            enabled: row.enabled,
            mode: row.sync_mode.parse()?,
            last_sync_at: row.last_sync_at,
            last_sync_status: row
                .last_sync_status
                .map(|status| status.parse())
                .transpose()?,
            last_sync_message: row.last_sync_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sync_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SyncLogRow {
    pub id: i64,
    pub operation: String,
    pub entry_id: Option<Uuid>,
    pub status: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SyncLogRow> for SyncLog {
    type Error = String;

    fn try_from(row: SyncLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            operation: row.operation.parse()?,
            entry_id: row.entry_id,
            status: row.status.parse()?,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sync_logs)]
pub(crate) struct NewSyncLogRow<'a> {
    pub operation: &'a str,
    pub entry_id: Option<Uuid>,
    pub status: &'a str,
    pub message: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = mirror_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OutboxRow {
    pub id: i64,
    pub operation: String,
    pub archive_entry_id: Uuid,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OutboxRow> for OutboxIntent {
    type Error = String;

    fn try_from(row: OutboxRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            operation: row.operation.parse()?,
            archive_entry_id: ArchiveEntryId::from_uuid(row.archive_entry_id),
            attempts: u32::try_from(row.attempts)
                .map_err(|_| format!("negative attempt count {}", row.attempts))?,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Display board
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = display_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DisplaySettingsRow {
    pub id: i16,
    pub youtube_url: String,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&DisplayVideoSettings> for DisplaySettingsRow {
    fn from(settings: &DisplayVideoSettings) -> Self {
        Self {
            id: SETTINGS_ROW_ID,
            youtube_url: settings.youtube_url.clone(),
            is_enabled: settings.enabled,
            created_at: settings.created_at,
            updated_at: settings.updated_at,
        }
    }
}

impl From<DisplaySettingsRow> for DisplayVideoSettings {
    fn from(row: DisplaySettingsRow) -> Self {
        Self {
            youtube_url: row.youtube_url,
            enabled: row.is_enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::domain::{EmployeeStatus, QueueStatus};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    fn queue_row_carries_storage_labels() {
        let entry = QueueEntry {
            id: QueueEntryId::random(),
            queue_number: 7,
            full_name: "A. Ivanov".to_owned(),
            phone: "+77001234567".to_owned(),
            programs: vec!["Law".to_owned()],
            status: QueueStatus::InProgress,
            notes: None,
            assigned_employee_id: Some(EmployeeId::random()),
            assigned_employee_name: Some("B. Serikova".to_owned()),
            created_at: now(),
            updated_at: now(),
            processing_time: None,
            form_language: Some("kz".to_owned()),
        };

        let row = QueueEntryRow::from(&entry);
        assert_eq!(row.status, "in_progress");
        assert_eq!(QueueEntry::try_from(row), Ok(entry));
    }

    #[rstest]
    fn unknown_status_label_is_rejected() {
        let row = EmployeeRow {
            id: Uuid::new_v4(),
            full_name: "B. Serikova".to_owned(),
            desk: None,
            status: "on_leave".to_owned(),
            created_at: now(),
        };
        let err = Employee::try_from(row).expect_err("unknown label");
        assert!(err.contains("on_leave"));
    }

    #[rstest]
    fn employee_row_uses_lowercase_status() {
        let employee = Employee {
            id: EmployeeId::random(),
            full_name: "B. Serikova".to_owned(),
            desk: Some("3".to_owned()),
            status: EmployeeStatus::Available,
            created_at: now(),
        };
        assert_eq!(EmployeeRow::from(&employee).status, "available");
    }

    #[rstest]
    fn negative_attempts_are_rejected() {
        let row = OutboxRow {
            id: 1,
            operation: "upsert".to_owned(),
            archive_entry_id: Uuid::new_v4(),
            attempts: -1,
            created_at: now(),
        };
        assert!(OutboxIntent::try_from(row).is_err());
    }

    #[rstest]
    fn display_row_uses_the_singleton_key() {
        let mut settings = DisplayVideoSettings::defaults(now());
        settings.youtube_url = "https://youtu.be/open-day".to_owned();
        settings.enabled = true;

        let row = DisplaySettingsRow::from(&settings);
        assert_eq!(row.id, SETTINGS_ROW_ID);
        assert!(row.is_enabled);
        assert_eq!(DisplayVideoSettings::from(row), settings);
    }
}
