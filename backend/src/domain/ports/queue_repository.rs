//! Port for queue entry persistence.
//!
//! Mutations that touch more than one row (admission, compaction, status
//! updates with their shadow) are committed atomically by the adapter.

use async_trait::async_trait;

use crate::domain::{
    AdmissionPlan, Compaction, EntryUpdate, QueueEntry, QueueEntryId, QueueFilter, ShadowOutcome,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by queue repository adapters.
    pub enum QueueRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "queue repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "queue repository query failed: {message}",
        /// A concurrent admission already holds the queue number.
        QueueNumberTaken { message: String } =>
            "queue number already taken: {message}",
        /// The phone number already has a waiting or in-progress entry.
        PhoneAlreadyQueued { message: String } =>
            "phone number already queued: {message}",
        /// The entry being updated no longer exists.
        EntryMissing { message: String } =>
            "queue entry missing: {message}",
    }
}

/// Port for reading and mutating the live queue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Every entry in the queue, ordered by queue number.
    async fn list_all(&self) -> Result<Vec<QueueEntry>, QueueRepositoryError>;

    /// Entries matching `filter`, ordered by queue number.
    async fn list(&self, filter: &QueueFilter) -> Result<Vec<QueueEntry>, QueueRepositoryError>;

    /// Find an entry by id.
    async fn find_by_id(
        &self,
        id: &QueueEntryId,
    ) -> Result<Option<QueueEntry>, QueueRepositoryError>;

    /// Most recently created entry named exactly `full_name`.
    async fn find_latest_by_full_name(
        &self,
        full_name: &str,
    ) -> Result<Option<QueueEntry>, QueueRepositoryError>;

    /// Whether `phone` belongs to a waiting or in-progress entry.
    async fn has_phone_queued(&self, phone: &str) -> Result<bool, QueueRepositoryError>;

    /// Commit an admission: its compaction, the new entry, and its shadow.
    async fn admit(&self, plan: &AdmissionPlan) -> Result<(), QueueRepositoryError>;

    /// Commit a compaction on its own.
    async fn compact(&self, compaction: &Compaction) -> Result<(), QueueRepositoryError>;

    /// Persist an updated entry together with its shadow and, when present,
    /// the serving employee's status.
    async fn apply_update(
        &self,
        update: &EntryUpdate,
    ) -> Result<ShadowOutcome, QueueRepositoryError>;

    /// Delete an entry. Returns whether a row was removed.
    async fn delete(&self, id: &QueueEntryId) -> Result<bool, QueueRepositoryError>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(QueueRepositoryError::connection("refused"), "connection failed: refused")]
    #[case(QueueRepositoryError::query("syntax"), "query failed: syntax")]
    #[case(
        QueueRepositoryError::queue_number_taken("42"),
        "queue number already taken: 42"
    )]
    #[case(
        QueueRepositoryError::phone_already_queued("+7700"),
        "phone number already queued: +7700"
    )]
    #[case(QueueRepositoryError::entry_missing("e-1"), "queue entry missing: e-1")]
    fn errors_format_messages(#[case] err: QueueRepositoryError, #[case] expected: &str) {
        assert!(err.to_string().contains(expected));
    }
}
