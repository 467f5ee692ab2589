//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the outbox, the spreadsheet client) are
//! implemented by outbound adapters. Driving ports are implemented by domain
//! services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod archive_administration;
mod archive_repository;
mod display_administration;
mod display_settings_repository;
mod employee_repository;
mod mirror_control;
mod mirror_outbox;
mod queue_administration;
mod queue_repository;
mod spreadsheet_client;
mod staff_desk;
mod staff_directory;
mod sync_state_repository;
mod visitor_queue;

#[cfg(test)]
pub use archive_administration::MockArchiveAdministration;
pub use archive_administration::{
    ArchiveAdministration, CLEANUP_PREVIEW_LIMIT, CleanupPreview, CleanupReport, CleanupRequest,
    DEFAULT_CLEANUP_DAYS,
};
#[cfg(test)]
pub use archive_repository::MockArchiveRepository;
pub use archive_repository::{ArchiveRepository, ArchiveRepositoryError};
#[cfg(test)]
pub use display_administration::MockDisplayAdministration;
pub use display_administration::DisplayAdministration;
#[cfg(test)]
pub use display_settings_repository::MockDisplaySettingsRepository;
pub use display_settings_repository::{DisplaySettingsRepository, DisplaySettingsRepositoryError};
#[cfg(test)]
pub use employee_repository::MockEmployeeRepository;
pub use employee_repository::{EmployeeRepository, EmployeeRepositoryError};
#[cfg(test)]
pub use mirror_control::MockMirrorControl;
pub use mirror_control::{
    ConnectionReport, FullSyncReport, MirrorControl, MirrorHealth, MirrorHealthState, SyncStats,
    SyncStatusReport,
};
#[cfg(test)]
pub use mirror_outbox::MockMirrorOutbox;
pub use mirror_outbox::{
    MirrorOutbox, MirrorOutboxError, OutboxFailure, OutboxIntent, OutboxOperation,
};
#[cfg(test)]
pub use queue_administration::MockQueueAdministration;
pub use queue_administration::{BulkDeleteOutcome, QueueAdministration, RenumberingReport};
#[cfg(test)]
pub use queue_repository::MockQueueRepository;
pub use queue_repository::{QueueRepository, QueueRepositoryError};
#[cfg(test)]
pub use spreadsheet_client::MockSpreadsheetClient;
pub use spreadsheet_client::{SheetLocator, SheetTarget, SpreadsheetClient, SpreadsheetError};
#[cfg(test)]
pub use staff_desk::MockStaffDesk;
pub use staff_desk::{CallNextOutcome, DeskStatus, EntryChanges, StaffDesk};
#[cfg(test)]
pub use staff_directory::MockStaffDirectory;
pub use staff_directory::{EmployeeUpdateRequest, NewEmployeeRequest, StaffDirectory};
#[cfg(test)]
pub use sync_state_repository::MockSyncStateRepository;
pub use sync_state_repository::{SyncStateRepository, SyncStateRepositoryError};
#[cfg(test)]
pub use visitor_queue::MockVisitorQueue;
pub use visitor_queue::{DisplayBoardEntry, JoinQueueRequest, QueueStanding, VisitorQueue};
