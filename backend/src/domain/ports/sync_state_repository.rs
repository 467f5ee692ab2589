//! Port for mirror settings and the sync audit trail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::mirror::settings::{NewSyncLog, SyncLog, SyncLogStatus, SyncSettings};

use super::define_port_error;

define_port_error! {
    /// Errors raised by sync state adapters.
    pub enum SyncStateRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "sync state repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "sync state repository query failed: {message}",
    }
}

/// Port for the single settings record and the append-only sync log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyncStateRepository: Send + Sync {
    /// Saved settings, if an administrator ever saved any.
    async fn load_settings(&self) -> Result<Option<SyncSettings>, SyncStateRepositoryError>;

    /// Replace the settings record.
    async fn save_settings(&self, settings: &SyncSettings)
    -> Result<(), SyncStateRepositoryError>;

    /// Append one audit row.
    async fn append_log(&self, log: &NewSyncLog) -> Result<(), SyncStateRepositoryError>;

    /// Newest audit rows first.
    async fn recent_logs(&self, limit: i64) -> Result<Vec<SyncLog>, SyncStateRepositoryError>;

    /// Number of audit rows with `status` created at or after `since`.
    async fn count_logs_since(
        &self,
        since: DateTime<Utc>,
        status: SyncLogStatus,
    ) -> Result<u64, SyncStateRepositoryError>;

    /// Total number of audit rows.
    async fn count_logs(&self) -> Result<u64, SyncStateRepositoryError>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn connection_error_formats_message() {
        let err = SyncStateRepositoryError::connection("timeout");
        assert!(err.to_string().contains("connection failed: timeout"));
    }
}
