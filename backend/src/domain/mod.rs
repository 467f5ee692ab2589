//! Domain primitives, services, and ports.
//!
//! Purpose: model the admissions queue, its staff, the archive of queue
//! history, and the spreadsheet mirror of that archive. Services implement
//! the driving ports in [`ports`] over the driven ports implemented by the
//! outbound adapters.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - QueueEntry, Employee, ArchivedQueueEntry: the stored records.
//! - DisplayVideoSettings: the video looped on the public display board.
//! - QueueLifecycleService, StaffDeskService, StaffDirectoryService,
//!   ArchiveAdminService, DisplaySettingsService, MirrorSyncService: port
//!   implementations.

pub mod admission;
pub mod archive;
pub mod archive_service;
pub mod assignment;
pub mod display;
pub mod display_service;
pub mod employee;
pub mod error;
pub mod mirror;
pub mod outbox_worker;
pub mod ports;
pub mod queue;
pub mod queue_service;
pub mod staff_desk_service;
pub mod staff_directory_service;
pub mod trace_id;

pub use self::admission::{
    AdmissionPlan, Compaction, QueueFull, Renumbering, compact, next_queue_number, plan_admission,
};
pub use self::archive::{
    ArchiveCleanup, ArchiveEntryId, ArchiveFilter, ArchiveReason, ArchivedQueueEntry,
};
pub use self::archive_service::ArchiveAdminService;
pub use self::assignment::select_assignee;
pub use self::display::{DisplayVideoSettings, DisplayVideoUpdate};
pub use self::display_service::DisplaySettingsService;
pub use self::employee::{
    Employee, EmployeeId, EmployeeStatus, EmployeeStatusParseError, UNRANKED_DESK, desk_rank,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::mirror::{
    MirrorOutcome, MirrorPorts, MirrorSyncService, SyncLog, SyncLogStatus, SyncMode,
    SyncOperation, SyncSettings, SyncSettingsUpdate,
};
pub use self::outbox_worker::{
    DrainReport, OutboxWorker, OutboxWorkerConfig, OutboxWorkerPorts, OutboxWorkerRuntime,
};
pub use self::queue::{
    ACTIVE_QUEUE_CEILING, Assignee, EmployeeStatusChange, EntryUpdate, MINUTES_PER_VISITOR,
    QueueEntry, QueueEntryId, QueueEntryPatch, QueueFilter, QueuePosition, QueueStatus,
    QueueStatusParseError, ShadowOutcome, ShadowSync, waiting_position,
};
pub use self::queue_service::{QUEUE_NUMBER_RETRIES, QueueLifecycleService};
pub use self::staff_desk_service::StaffDeskService;
pub use self::staff_directory_service::StaffDirectoryService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use admission_queue::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such entry"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
