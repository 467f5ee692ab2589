//! Port for archive shadow rows.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    ArchiveCleanup, ArchiveEntryId, ArchiveFilter, ArchivedQueueEntry, QueueEntryId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by archive repository adapters.
    pub enum ArchiveRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "archive repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "archive repository query failed: {message}",
    }
}

/// Port for reading and pruning the archive.
///
/// Listings are ordered newest archived first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchiveRepository: Send + Sync {
    /// Number of archive rows; doubles as the count of entries ever admitted.
    async fn count(&self) -> Result<u64, ArchiveRepositoryError>;

    /// Subset of `ids` that already have a shadow row.
    async fn shadowed_among(
        &self,
        ids: &[QueueEntryId],
    ) -> Result<Vec<QueueEntryId>, ArchiveRepositoryError>;

    /// Find an archive row by id.
    async fn find_by_id(
        &self,
        id: &ArchiveEntryId,
    ) -> Result<Option<ArchivedQueueEntry>, ArchiveRepositoryError>;

    /// Rows matching `filter`.
    async fn list(
        &self,
        filter: &ArchiveFilter,
    ) -> Result<Vec<ArchivedQueueEntry>, ArchiveRepositoryError>;

    /// Up to `limit` rows selected by `cleanup`.
    async fn cleanup_candidates(
        &self,
        cleanup: &ArchiveCleanup,
        limit: i64,
    ) -> Result<Vec<ArchivedQueueEntry>, ArchiveRepositoryError>;

    /// Number of rows selected by `cleanup`.
    async fn count_cleanup(&self, cleanup: &ArchiveCleanup)
    -> Result<u64, ArchiveRepositoryError>;

    /// Delete the rows selected by `cleanup`, returning how many went.
    async fn delete_cleanup(
        &self,
        cleanup: &ArchiveCleanup,
    ) -> Result<u64, ArchiveRepositoryError>;

    /// Delete the row whose id or original id equals `id`.
    async fn delete_by_id_or_original(&self, id: &Uuid) -> Result<u64, ArchiveRepositoryError>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn connection_error_formats_message() {
        let err = ArchiveRepositoryError::connection("pool exhausted");
        assert_eq!(
            err.to_string(),
            "archive repository connection failed: pool exhausted"
        );
    }
}
