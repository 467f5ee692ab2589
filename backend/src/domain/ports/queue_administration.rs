//! Driving port for administrative queue maintenance.

use async_trait::async_trait;

use crate::domain::{Error, QueueEntry, QueueEntryId, QueueFilter};

/// Counts reported by bulk deletions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkDeleteOutcome {
    pub deleted: u64,
    pub not_found: u64,
}

/// Counts reported by a numbering reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenumberingReport {
    /// Completed entries removed from the queue.
    pub archived_completed: u64,
    /// Active entries carrying a fresh dense number.
    pub renumbered_active: u64,
    /// Number the next admission receives.
    pub next_number: i32,
}

/// Queue maintenance for administrators.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueAdministration: Send + Sync {
    /// Entries matching `filter`.
    async fn list(&self, filter: QueueFilter) -> Result<Vec<QueueEntry>, Error>;

    /// Delete one entry. The archive row is left alone.
    async fn delete(&self, id: &QueueEntryId) -> Result<(), Error>;

    /// Delete many entries.
    async fn bulk_delete(&self, ids: Vec<QueueEntryId>) -> Result<BulkDeleteOutcome, Error>;

    /// Drop completed entries and renumber the rest from 1.
    async fn reset_numbering(&self) -> Result<RenumberingReport, Error>;
}
