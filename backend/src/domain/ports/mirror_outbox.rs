//! Port for the transactional outbox of pending mirror changes.
//!
//! Intents are written by the store in the same transaction as the archive
//! change they describe; the outbox worker claims and settles them.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ArchiveEntryId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by outbox adapters.
    pub enum MirrorOutboxError {
        /// Outbox connection could not be established.
        Connection { message: String } =>
            "mirror outbox connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "mirror outbox query failed: {message}",
    }
}

/// Kind of change an intent carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutboxOperation {
    /// Archive row inserted or changed.
    Upsert,
    /// Archive row deleted.
    Delete,
}

impl OutboxOperation {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upsert => "upsert",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OutboxOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutboxOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upsert" => Ok(Self::Upsert),
            "delete" => Ok(Self::Delete),
            other => Err(format!("unknown outbox operation: {other}")),
        }
    }
}

/// One pending change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxIntent {
    pub id: i64,
    pub operation: OutboxOperation,
    pub archive_entry_id: ArchiveEntryId,
    /// Attempts already spent on this intent.
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

/// Settlement of a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxFailure {
    pub id: i64,
    pub attempts: u32,
    pub last_error: String,
    /// When to try again; `None` parks the intent as failed.
    pub retry_at: Option<DateTime<Utc>>,
}

/// Port for claiming and settling outbox intents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MirrorOutbox: Send + Sync {
    /// Pending intents due at `now`, oldest first, at most `limit`.
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<OutboxIntent>, MirrorOutboxError>;

    /// Mark intents as delivered.
    async fn mark_processed(
        &self,
        ids: &[i64],
        at: DateTime<Utc>,
    ) -> Result<(), MirrorOutboxError>;

    /// Record a failed attempt.
    async fn record_failure(&self, failure: &OutboxFailure) -> Result<(), MirrorOutboxError>;

    /// Number of intents still pending.
    async fn pending_count(&self) -> Result<u64, MirrorOutboxError>;
}
