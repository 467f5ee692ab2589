//! Queue entries and the rules for mutating them.
//!
//! A [`QueueEntry`] is the authoritative record of one applicant waiting
//! for (or being served by) an admissions desk. Entries keep a dense,
//! positive `queue_number` that orders the board.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::employee::{Employee, EmployeeId, EmployeeStatus};

/// Queue size at which completed entries are evicted before admitting more.
pub const ACTIVE_QUEUE_CEILING: usize = 99;

/// Estimated minutes an applicant spends at a desk.
pub const MINUTES_PER_VISITOR: i64 = 5;

/// Stable identifier of a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueEntryId(Uuid);

impl QueueEntryId {
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

impl fmt::Display for QueueEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    /// Waiting to be called.
    Waiting,
    /// Being served at a desk.
    InProgress,
    /// Put aside temporarily.
    Paused,
    /// Served or cancelled.
    Completed,
}

impl QueueStatus {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    /// Whether the entry blocks another submission for the same phone.
    #[must_use]
    pub const fn holds_phone(self) -> bool {
        matches!(self, Self::Waiting | Self::InProgress)
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown queue status: {0}")]
pub struct QueueStatusParseError(pub String);

impl FromStr for QueueStatus {
    type Err = QueueStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(Self::Waiting),
            "in_progress" => Ok(Self::InProgress),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            other => Err(QueueStatusParseError(other.to_owned())),
        }
    }
}

/// Employee reference stored on an entry.
///
/// The name is kept alongside the identifier so the display board and the
/// mirror keep showing who served an applicant after staff changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignee {
    /// Referenced employee.
    pub id: EmployeeId,
    /// Name at assignment time.
    pub name: String,
}

impl From<&Employee> for Assignee {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.full_name.clone(),
        }
    }
}

/// One applicant in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: QueueEntryId,
    pub queue_number: i32,
    pub full_name: String,
    pub phone: String,
    pub programs: Vec<String>,
    pub status: QueueStatus,
    pub notes: Option<String>,
    pub assigned_employee_id: Option<EmployeeId>,
    pub assigned_employee_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Seconds spent at the desk, recorded when the entry completes.
    pub processing_time: Option<i64>,
    pub form_language: Option<String>,
}

/// Partial update applied to an entry. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueEntryPatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub programs: Option<Vec<String>>,
    pub status: Option<QueueStatus>,
    pub notes: Option<String>,
    pub assignee: Option<Assignee>,
    pub queue_number: Option<i32>,
    pub form_language: Option<String>,
}

impl QueueEntryPatch {
    /// Patch that only moves the entry to `status`.
    #[must_use]
    pub fn status(status: QueueStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Fields copied onto the archive shadow after an entry mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowSync {
    pub status: QueueStatus,
    pub updated_at: DateTime<Utc>,
    pub processing_time: Option<i64>,
    /// Present only when this mutation completed the entry.
    pub completed_at: Option<DateTime<Utc>>,
}

impl QueueEntry {
    /// Apply `patch` at `now` and describe what the shadow must copy.
    ///
    /// Completing an entry that was in progress records the time spent since
    /// it was last touched (when it was called to the desk).
    pub fn apply_patch(&mut self, patch: QueueEntryPatch, now: DateTime<Utc>) -> ShadowSync {
        let previous = self.status;
        let started_at = self.updated_at;

        let QueueEntryPatch {
            full_name,
            phone,
            programs,
            status,
            notes,
            assignee,
            queue_number,
            form_language,
        } = patch;

        if let Some(full_name) = full_name {
            self.full_name = full_name;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(programs) = programs {
            self.programs = programs;
        }
        if let Some(notes) = notes {
            self.notes = Some(notes);
        }
        if let Some(Assignee { id, name }) = assignee {
            self.assigned_employee_id = Some(id);
            self.assigned_employee_name = Some(name);
        }
        if let Some(queue_number) = queue_number {
            self.queue_number = queue_number;
        }
        if let Some(form_language) = form_language {
            self.form_language = Some(form_language);
        }
        if let Some(status) = status {
            self.status = status;
        }
        self.updated_at = now;

        let completed_now =
            self.status == QueueStatus::Completed && previous != QueueStatus::Completed;
        if completed_now && previous == QueueStatus::InProgress && self.processing_time.is_none() {
            self.processing_time = Some((now - started_at).num_seconds().max(0));
        }

        ShadowSync {
            status: self.status,
            updated_at: now,
            processing_time: self.processing_time,
            completed_at: completed_now.then_some(now),
        }
    }
}

/// Employee status written together with an entry update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeeStatusChange {
    pub employee_id: EmployeeId,
    pub status: EmployeeStatus,
}

/// Entry mutation committed atomically with its shadow (and optionally the
/// serving employee's status).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryUpdate {
    pub entry: QueueEntry,
    pub shadow: ShadowSync,
    pub employee: Option<EmployeeStatusChange>,
}

/// Whether the archive shadow of an updated entry was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowOutcome {
    /// The shadow row received the new status.
    Synced,
    /// No shadow row exists for the entry.
    Missing,
}

/// Filter for queue listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueFilter {
    pub status: Option<QueueStatus>,
    /// Calendar day (UTC) of `created_at`.
    pub created_on: Option<chrono::NaiveDate>,
    pub assigned_employee_id: Option<EmployeeId>,
    /// Case-insensitive substring of the assigned employee name.
    pub employee_name: Option<String>,
    /// Case-insensitive substring of the applicant name.
    pub full_name: Option<String>,
    /// Exact program the applicant selected.
    pub program: Option<String>,
}

impl QueueFilter {
    /// Whether `entry` satisfies every populated criterion.
    #[must_use]
    pub fn matches(&self, entry: &QueueEntry) -> bool {
        let contains = |haystack: Option<&str>, needle: &Option<String>| match needle {
            None => true,
            Some(needle) => haystack
                .is_some_and(|value| value.to_lowercase().contains(&needle.to_lowercase())),
        };

        self.status.is_none_or(|status| entry.status == status)
            && self
                .created_on
                .is_none_or(|day| entry.created_at.date_naive() == day)
            && self
                .assigned_employee_id
                .is_none_or(|id| entry.assigned_employee_id == Some(id))
            && contains(entry.assigned_employee_name.as_deref(), &self.employee_name)
            && contains(Some(entry.full_name.as_str()), &self.full_name)
            && self
                .program
                .as_ref()
                .is_none_or(|program| entry.programs.iter().any(|p| p == program))
    }
}

/// Where a waiting applicant stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuePosition {
    /// One-based position among waiting entries.
    pub position: i64,
    pub people_ahead: i64,
    pub estimated_wait_minutes: i64,
}

/// Compute the position of `entry` among the waiting entries in `queue`.
///
/// Returns `None` unless `entry` is waiting.
#[must_use]
pub fn waiting_position(entry: &QueueEntry, queue: &[QueueEntry]) -> Option<QueuePosition> {
    if entry.status != QueueStatus::Waiting {
        return None;
    }
    let ahead = queue
        .iter()
        .filter(|other| {
            other.status == QueueStatus::Waiting && other.queue_number < entry.queue_number
        })
        .count();
    let people_ahead = i64::try_from(ahead).unwrap_or(i64::MAX);
    Some(QueuePosition {
        position: people_ahead.saturating_add(1),
        people_ahead,
        estimated_wait_minutes: people_ahead.saturating_mul(MINUTES_PER_VISITOR),
    })
}
