//! Driving port for applicants using the public queue.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{EmployeeId, Error, QueueEntry, QueueEntryId, QueuePosition, QueueStatus};

/// Request to join the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinQueueRequest {
    pub full_name: String,
    pub phone: String,
    pub programs: Vec<String>,
    /// Employee the applicant asked for; round-robin picks one otherwise.
    pub assigned_employee_id: Option<EmployeeId>,
    pub notes: Option<String>,
    pub form_language: Option<String>,
}

/// An entry with its standing among waiting applicants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStanding {
    pub entry: QueueEntry,
    /// Present only while the entry is waiting.
    pub position: Option<QueuePosition>,
}

/// One line of the public display board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBoardEntry {
    pub id: Uuid,
    pub queue_number: i32,
    pub status: QueueStatus,
    pub assigned_employee_name: Option<String>,
    pub employee_desk: Option<String>,
}

/// Public queue operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitorQueue: Send + Sync {
    /// Admit an applicant.
    async fn join(&self, request: JoinQueueRequest) -> Result<QueueEntry, Error>;

    /// Latest entry submitted under exactly `full_name`.
    async fn check(&self, full_name: &str) -> Result<QueueStanding, Error>;

    /// Withdraw a waiting or in-progress entry.
    async fn cancel(&self, id: &QueueEntryId) -> Result<QueueEntry, Error>;

    /// Send a waiting entry to the end of the queue.
    async fn move_back(&self, id: &QueueEntryId) -> Result<QueueStanding, Error>;

    /// Number of waiting and in-progress entries.
    async fn open_count(&self) -> Result<u64, Error>;

    /// Entries currently being served.
    async fn display_board(&self) -> Result<Vec<DisplayBoardEntry>, Error>;
}
