//! Driving port for administering the spreadsheet mirror.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::mirror::settings::{SyncLog, SyncSettings, SyncSettingsUpdate};

/// Mirror configuration plus live counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatusReport {
    pub settings: SyncSettings,
    pub archive_total: u64,
    /// Outbox intents not yet delivered.
    pub pending_changes: u64,
}

/// Result of a synchronous full resync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullSyncReport {
    /// Data rows written below the header.
    pub rows_written: u64,
}

/// Spreadsheet details confirmed by a connection test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionReport {
    pub spreadsheet_id: String,
    pub title: String,
    pub sheet_name: String,
    pub sheet_names: Vec<String>,
}

/// Audit trail summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStats {
    pub archive_total: u64,
    pub total_logs: u64,
    pub successes_last_day: u64,
    pub errors_last_day: u64,
    pub recent_logs: Vec<SyncLog>,
}

/// Coarse mirror health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorHealthState {
    /// No spreadsheet id saved.
    NotConfigured,
    /// Configured but switched off.
    Disabled,
    /// Switched on but the spreadsheet cannot be reached.
    Misconfigured,
    Healthy,
}

impl MirrorHealthState {
    /// Wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Disabled => "disabled",
            Self::Misconfigured => "misconfigured",
            Self::Healthy => "healthy",
        }
    }
}

/// Health report of the mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorHealth {
    pub state: MirrorHealthState,
    pub message: Option<String>,
    pub archive_total: u64,
    /// Data rows currently in the sheet, when it could be read.
    pub sheet_rows: Option<u64>,
    /// The sheet holds fewer rows than the archive.
    pub needs_full_sync: bool,
}

/// Mirror administration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MirrorControl: Send + Sync {
    /// Current settings; defaults are saved on first read.
    async fn settings(&self) -> Result<SyncSettings, Error>;

    /// Apply an update and drop any cached connection.
    async fn update_settings(&self, update: SyncSettingsUpdate) -> Result<SyncSettings, Error>;

    /// Settings with archive and outbox counters.
    async fn status(&self) -> Result<SyncStatusReport, Error>;

    /// Rewrite the whole sheet and wait for the result.
    async fn run_full_sync(&self) -> Result<FullSyncReport, Error>;

    /// Start a full resync in the background.
    async fn start_background_sync(&self) -> Result<(), Error>;

    /// Reconnect from scratch and describe the spreadsheet.
    async fn test_connection(&self) -> Result<ConnectionReport, Error>;

    /// Audit trail summary for the last day.
    async fn stats(&self) -> Result<SyncStats, Error>;

    /// Health of the mirror.
    async fn health(&self) -> Result<MirrorHealth, Error>;
}
