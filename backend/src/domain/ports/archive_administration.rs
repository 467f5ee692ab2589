//! Driving port for archive maintenance.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{ArchiveFilter, ArchivedQueueEntry, Error, QueueStatus};

use super::BulkDeleteOutcome;

/// Candidates shown by a cleanup preview.
pub const CLEANUP_PREVIEW_LIMIT: i64 = 100;

/// Default age threshold for archive cleanup.
pub const DEFAULT_CLEANUP_DAYS: i64 = 30;

/// Age-based cleanup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupRequest {
    pub days_old: i64,
    pub status: Option<QueueStatus>,
}

impl Default for CleanupRequest {
    fn default() -> Self {
        Self {
            days_old: DEFAULT_CLEANUP_DAYS,
            status: None,
        }
    }
}

/// Result of a cleanup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: u64,
    pub cutoff: DateTime<Utc>,
}

/// Rows a cleanup would delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupPreview {
    pub count: u64,
    pub cutoff: DateTime<Utc>,
    /// First [`CLEANUP_PREVIEW_LIMIT`] candidates, newest first.
    pub candidates: Vec<ArchivedQueueEntry>,
}

/// Archive maintenance for administrators.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchiveAdministration: Send + Sync {
    /// Archive rows matching `filter`, newest first.
    async fn list(&self, filter: ArchiveFilter) -> Result<Vec<ArchivedQueueEntry>, Error>;

    /// Delete rows older than the requested age.
    async fn cleanup(&self, request: CleanupRequest) -> Result<CleanupReport, Error>;

    /// Report what [`ArchiveAdministration::cleanup`] would delete.
    async fn preview_cleanup(&self, request: CleanupRequest) -> Result<CleanupPreview, Error>;

    /// Delete the row with this id or original id.
    async fn delete(&self, id: &Uuid) -> Result<(), Error>;

    /// Delete rows by id or original id.
    async fn bulk_delete(&self, ids: Vec<Uuid>) -> Result<BulkDeleteOutcome, Error>;
}
