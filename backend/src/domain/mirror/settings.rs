//! Mirror configuration and audit trail records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Default worksheet the archive is mirrored into.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// When mirroring is expected to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Archive changes are drained row by row.
    Realtime,
    /// Only administrator-triggered resyncs run.
    Manual,
    /// Each drain tick with pending changes runs one full resync.
    Scheduled,
}

impl SyncMode {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Realtime => "realtime",
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
        }
    }
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "realtime" => Ok(Self::Realtime),
            "manual" => Ok(Self::Manual),
            "scheduled" => Ok(Self::Scheduled),
            other => Err(format!("unknown sync mode: {other}")),
        }
    }
}

/// Result label of a sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncLogStatus {
    Success,
    Error,
}

impl SyncLogStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl FromStr for SyncLogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown sync status: {other}")),
        }
    }
}

/// Mirror operation recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    Add,
    Update,
    Delete,
    FullSync,
}

impl SyncOperation {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::FullSync => "full_sync",
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "full_sync" => Ok(Self::FullSync),
            other => Err(format!("unknown sync operation: {other}")),
        }
    }
}

/// Process-wide mirror configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub spreadsheet_id: Option<String>,
    pub sheet_name: String,
    pub enabled: bool,
    pub mode: SyncMode,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_sync_status: Option<SyncLogStatus>,
    pub last_sync_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SyncSettings {
    /// Settings used before an administrator saves any.
    #[must_use]
    pub fn defaults(now: DateTime<Utc>) -> Self {
        Self {
            spreadsheet_id: None,
            sheet_name: DEFAULT_SHEET_NAME.to_owned(),
            enabled: false,
            mode: SyncMode::Realtime,
            last_sync_at: None,
            last_sync_status: None,
            last_sync_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Target spreadsheet, when one is set.
    #[must_use]
    pub fn spreadsheet_id(&self) -> Option<&str> {
        self.spreadsheet_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Whether background draining should push changes.
    #[must_use]
    pub fn drains_changes(&self) -> bool {
        self.enabled && self.mode != SyncMode::Manual && self.spreadsheet_id().is_some()
    }

    /// Whether a drained batch is always reconciled with a full resync.
    #[must_use]
    pub fn collapses_batches(&self) -> bool {
        self.mode == SyncMode::Scheduled
    }

    /// Record the outcome of a full resync.
    pub fn record_sync(&mut self, status: SyncLogStatus, message: String, at: DateTime<Utc>) {
        self.last_sync_at = Some(at);
        self.last_sync_status = Some(status);
        self.last_sync_message = Some(message);
        self.updated_at = at;
    }
}

/// Administrator changes to the mirror configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSettingsUpdate {
    pub spreadsheet_id: Option<String>,
    pub sheet_name: Option<String>,
    pub enabled: Option<bool>,
    pub mode: Option<SyncMode>,
}

impl SyncSettingsUpdate {
    /// Apply the present fields onto `settings`.
    pub fn apply(self, settings: &mut SyncSettings, now: DateTime<Utc>) {
        if let Some(spreadsheet_id) = self.spreadsheet_id {
            let trimmed = spreadsheet_id.trim().to_owned();
            settings.spreadsheet_id = (!trimmed.is_empty()).then_some(trimmed);
        }
        if let Some(sheet_name) = self.sheet_name {
            let trimmed = sheet_name.trim();
            settings.sheet_name = if trimmed.is_empty() {
                DEFAULT_SHEET_NAME.to_owned()
            } else {
                trimmed.to_owned()
            };
        }
        if let Some(enabled) = self.enabled {
            settings.enabled = enabled;
        }
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        settings.updated_at = now;
    }
}

/// One audit trail row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncLog {
    pub id: i64,
    pub operation: SyncOperation,
    /// Archive row the operation targeted; absent for full resyncs.
    pub entry_id: Option<Uuid>,
    pub status: SyncLogStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Audit trail row before insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSyncLog {
    pub operation: SyncOperation,
    pub entry_id: Option<Uuid>,
    pub status: SyncLogStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}
