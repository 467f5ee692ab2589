//! Spreadsheet mirror of the archive.
//!
//! [`MirrorSyncService`] owns the connection to the worksheet and performs
//! full resyncs, single-row upserts, and deletions. Administrative operations
//! are exposed through [`crate::domain::ports::MirrorControl`].

mod control;
pub mod row;
mod service;
pub mod settings;

pub use self::control::RECENT_LOG_LIMIT;
pub(crate) use self::control::map_outbox_error;
pub use self::service::{
    ConnectionState, MirrorOutcome, MirrorPorts, MirrorSyncService, RECONNECT_COOLDOWN_SECS,
};
pub use self::settings::{
    DEFAULT_SHEET_NAME, NewSyncLog, SyncLog, SyncLogStatus, SyncMode, SyncOperation, SyncSettings,
    SyncSettingsUpdate,
};
