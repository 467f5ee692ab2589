//! Archive shadow rows.
//!
//! Every queue entry gets an [`ArchivedQueueEntry`] at creation time. The
//! archive outlives queue cleanup and is the only data mirrored to the
//! external spreadsheet.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::queue::{QueueEntry, QueueEntryId, QueueStatus};

/// Identifier of an archive row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveEntryId(Uuid);

impl ArchiveEntryId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ArchiveEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Why an archive row was written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArchiveReason {
    /// Shadow written when the entry was created.
    AutoBackup,
    /// Shadow written while evicting completed entries at the ceiling.
    AutoCleanup,
    /// Shadow written by an administrator resetting the numbering.
    ManualReset,
    /// Any other label found in storage.
    Other(String),
}

impl ArchiveReason {
    /// Storage representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AutoBackup => "auto_backup",
            Self::AutoCleanup => "auto_cleanup",
            Self::ManualReset => "manual_reset",
            Self::Other(label) => label.as_str(),
        }
    }
}

impl From<String> for ArchiveReason {
    fn from(value: String) -> Self {
        match value.as_str() {
            "auto_backup" => Self::AutoBackup,
            "auto_cleanup" => Self::AutoCleanup,
            "manual_reset" => Self::ManualReset,
            _ => Self::Other(value),
        }
    }
}

impl fmt::Display for ArchiveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Archive copy of a queue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedQueueEntry {
    pub id: ArchiveEntryId,
    /// Queue entry this row shadows. Not an ownership relation: the queue
    /// row may be gone.
    pub original_id: QueueEntryId,
    pub queue_number: i32,
    pub full_name: String,
    pub phone: String,
    pub programs: Vec<String>,
    pub status: QueueStatus,
    pub notes: Option<String>,
    pub assigned_employee_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub processing_time: Option<i64>,
    pub form_language: Option<String>,
    pub archived_at: DateTime<Utc>,
    pub archive_reason: ArchiveReason,
}

impl ArchivedQueueEntry {
    /// Build the shadow of `entry`.
    ///
    /// A shadow taken of an already completed entry stamps `completed_at`
    /// with the entry's last update.
    #[must_use]
    pub fn shadow_of(entry: &QueueEntry, reason: ArchiveReason, archived_at: DateTime<Utc>) -> Self {
        Self {
            id: ArchiveEntryId::random(),
            original_id: entry.id,
            queue_number: entry.queue_number,
            full_name: entry.full_name.clone(),
            phone: entry.phone.clone(),
            programs: entry.programs.clone(),
            status: entry.status,
            notes: entry.notes.clone(),
            assigned_employee_name: entry.assigned_employee_name.clone(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            completed_at: (entry.status == QueueStatus::Completed).then_some(entry.updated_at),
            processing_time: entry.processing_time,
            form_language: entry.form_language.clone(),
            archived_at,
            archive_reason: reason,
        }
    }
}

/// Listing filter for archive administration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveFilter {
    pub status: Option<QueueStatus>,
    pub reason: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Selection of archive rows for age-based cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveCleanup {
    /// Rows archived strictly before this instant qualify.
    pub archived_before: DateTime<Utc>,
    pub status: Option<QueueStatus>,
}

impl ArchiveCleanup {
    /// Whether `row` is selected by this cleanup.
    #[must_use]
    pub fn selects(&self, row: &ArchivedQueueEntry) -> bool {
        row.archived_at < self.archived_before && self.status.is_none_or(|s| row.status == s)
    }
}
