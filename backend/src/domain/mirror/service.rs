//! Spreadsheet mirror of the archive.
//!
//! The service pushes archive rows to the configured worksheet. Every
//! operation first makes sure the connection is available; when it is not,
//! the operation reports [`MirrorOutcome::Unavailable`] without touching the
//! sheet. Outcomes are written to the sync audit trail and never fail the
//! caller: only store failures surface as errors.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::ports::{
    ArchiveRepository, MirrorOutbox, SheetLocator, SheetTarget, SpreadsheetClient,
    SpreadsheetError, SyncStateRepository, SyncStateRepositoryError,
};
use crate::domain::queue_service::map_archive_error;
use crate::domain::{ArchiveEntryId, ArchiveFilter, Error};

use super::row::{header_row, sheet_row};
use super::settings::{NewSyncLog, SyncLogStatus, SyncOperation, SyncSettings};

/// How long an unavailable connection is trusted before reconnecting.
pub const RECONNECT_COOLDOWN_SECS: i64 = 60;

pub(crate) fn map_sync_state_error(error: SyncStateRepositoryError) -> Error {
    match error {
        SyncStateRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("sync state repository unavailable: {message}"))
        }
        SyncStateRepositoryError::Query { message } => {
            Error::internal(format!("sync state repository error: {message}"))
        }
    }
}

/// Result of one mirror operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// The sheet was rewritten with a header and `rows_written` rows.
    FullResync { rows_written: usize },
    /// An existing row was overwritten.
    Updated { row: usize },
    /// The row was missing and has been appended.
    Appended,
    /// The row was found and removed.
    Deleted { row: usize },
    /// Delete target was not in the sheet.
    AlreadyAbsent,
    /// The connection is not available; nothing was attempted.
    Unavailable { reason: String },
    /// The spreadsheet rejected or failed the request.
    Failed { error: SpreadsheetError },
}

impl MirrorOutcome {
    /// Whether the sheet now reflects the archive for this operation.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Unavailable { .. } | Self::Failed { .. })
    }

    /// Whether repeating the operation later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable { .. } => true,
            Self::Failed { error } => error.is_retryable(),
            _ => false,
        }
    }

    /// Audit trail message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::FullResync { rows_written } => {
                format!("full resync wrote {rows_written} rows")
            }
            Self::Updated { row } => format!("updated sheet row {row}"),
            Self::Appended => "appended new sheet row".to_owned(),
            Self::Deleted { row } => format!("deleted sheet row {row}"),
            Self::AlreadyAbsent => "row already absent from sheet".to_owned(),
            Self::Unavailable { reason } => format!("spreadsheet unavailable: {reason}"),
            Self::Failed { error } => error.to_string(),
        }
    }
}

/// Per-spreadsheet connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Available(SheetTarget),
    Unavailable {
        locator: SheetLocator,
        reason: String,
        since: DateTime<Utc>,
    },
}

/// Ports used by the mirror.
pub struct MirrorPorts {
    pub archive: Arc<dyn ArchiveRepository>,
    pub sync_state: Arc<dyn SyncStateRepository>,
    pub outbox: Arc<dyn MirrorOutbox>,
    pub spreadsheet: Arc<dyn SpreadsheetClient>,
}

pub(super) struct Inner {
    pub(super) archive: Arc<dyn ArchiveRepository>,
    pub(super) sync_state: Arc<dyn SyncStateRepository>,
    pub(super) outbox: Arc<dyn MirrorOutbox>,
    pub(super) spreadsheet: Arc<dyn SpreadsheetClient>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) connection: Mutex<ConnectionState>,
}

/// Shared handle to the mirror; clones share the connection state.
#[derive(Clone)]
pub struct MirrorSyncService {
    pub(super) inner: Arc<Inner>,
}

fn locator_of(settings: &SyncSettings) -> Option<SheetLocator> {
    settings.spreadsheet_id().map(|spreadsheet_id| SheetLocator {
        spreadsheet_id: spreadsheet_id.to_owned(),
        sheet_name: settings.sheet_name.clone(),
    })
}

/// One-based sheet row holding `id` in column A.
fn find_row(ids: &[String], id: &str) -> Option<usize> {
    ids.iter().position(|cell| cell == id).map(|index| index + 1)
}

impl MirrorSyncService {
    /// Build the mirror over its ports.
    pub fn new(ports: MirrorPorts, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                archive: ports.archive,
                sync_state: ports.sync_state,
                outbox: ports.outbox,
                spreadsheet: ports.spreadsheet,
                clock,
                connection: Mutex::new(ConnectionState::Uninitialized),
            }),
        }
    }

    /// Saved settings, or defaults persisted on first read.
    ///
    /// # Errors
    /// Fails when the settings store is unreachable.
    pub async fn load_settings(&self) -> Result<SyncSettings, Error> {
        if let Some(settings) = self
            .inner
            .sync_state
            .load_settings()
            .await
            .map_err(map_sync_state_error)?
        {
            return Ok(settings);
        }
        let defaults = SyncSettings::defaults(self.inner.clock.utc());
        self.inner
            .sync_state
            .save_settings(&defaults)
            .await
            .map_err(map_sync_state_error)?;
        Ok(defaults)
    }

    /// Forget the cached connection so the next operation reconnects.
    pub async fn reset_connection(&self) {
        *self.inner.connection.lock().await = ConnectionState::Uninitialized;
    }

    /// Current connection state.
    pub async fn connection_state(&self) -> ConnectionState {
        self.inner.connection.lock().await.clone()
    }

    /// Resolve the worksheet for `settings`, reusing a cached connection.
    pub(super) async fn connect(&self, settings: &SyncSettings) -> Result<SheetTarget, String> {
        let Some(locator) = locator_of(settings) else {
            return Err("mirror spreadsheet is not configured".to_owned());
        };
        let now = self.inner.clock.utc();
        let mut state = self.inner.connection.lock().await;
        match &*state {
            ConnectionState::Available(target)
                if target.spreadsheet_id == locator.spreadsheet_id
                    && target.sheet_name == locator.sheet_name =>
            {
                return Ok(target.clone());
            }
            ConnectionState::Unavailable {
                locator: failed,
                reason,
                since,
            } if *failed == locator
                && now - *since < Duration::seconds(RECONNECT_COOLDOWN_SECS) =>
            {
                return Err(reason.clone());
            }
            _ => {}
        }

        match self.inner.spreadsheet.open(&locator).await {
            Ok(target) => {
                info!(
                    spreadsheet_id = %target.spreadsheet_id,
                    sheet = %target.sheet_name,
                    "spreadsheet connection available"
                );
                *state = ConnectionState::Available(target.clone());
                Ok(target)
            }
            Err(error) => {
                let reason = error.to_string();
                warn!(%reason, "spreadsheet connection unavailable");
                *state = ConnectionState::Unavailable {
                    locator,
                    reason: reason.clone(),
                    since: now,
                };
                Err(reason)
            }
        }
    }

    /// Mark the connection unavailable after a non-retryable failure.
    async fn invalidate(&self, target: &SheetTarget, error: &SpreadsheetError) {
        if error.is_retryable() {
            return;
        }
        *self.inner.connection.lock().await = ConnectionState::Unavailable {
            locator: SheetLocator {
                spreadsheet_id: target.spreadsheet_id.clone(),
                sheet_name: target.sheet_name.clone(),
            },
            reason: error.to_string(),
            since: self.inner.clock.utc(),
        };
    }

    async fn record(
        &self,
        operation: SyncOperation,
        entry: Option<&ArchiveEntryId>,
        outcome: &MirrorOutcome,
    ) {
        let status = if outcome.is_success() {
            SyncLogStatus::Success
        } else {
            SyncLogStatus::Error
        };
        if !outcome.is_success() {
            warn!(
                %operation,
                entry_id = ?entry.map(ArchiveEntryId::as_uuid),
                message = %outcome.message(),
                "mirror operation failed"
            );
        }
        let log = NewSyncLog {
            operation,
            entry_id: entry.map(|id| *id.as_uuid()),
            status,
            message: Some(outcome.message()),
            created_at: self.inner.clock.utc(),
        };
        if let Err(error) = self.inner.sync_state.append_log(&log).await {
            warn!(%error, "failed to append sync log");
        }
    }

    /// Rewrite the sheet with a header and every archive row, newest first.
    ///
    /// # Errors
    /// Fails only when the archive or settings store cannot be read.
    pub async fn full_resync(&self) -> Result<MirrorOutcome, Error> {
        let mut settings = self.load_settings().await?;
        let outcome = match self.connect(&settings).await {
            Err(reason) => MirrorOutcome::Unavailable { reason },
            Ok(target) => {
                let archived = self
                    .inner
                    .archive
                    .list(&ArchiveFilter::default())
                    .await
                    .map_err(map_archive_error)?;
                let mut rows = Vec::with_capacity(archived.len() + 1);
                rows.push(header_row());
                rows.extend(archived.iter().map(sheet_row));

                match self.rewrite(&target, &rows).await {
                    Ok(()) => MirrorOutcome::FullResync {
                        rows_written: archived.len(),
                    },
                    Err(error) => {
                        self.invalidate(&target, &error).await;
                        MirrorOutcome::Failed { error }
                    }
                }
            }
        };

        self.record(SyncOperation::FullSync, None, &outcome).await;
        let status = if outcome.is_success() {
            SyncLogStatus::Success
        } else {
            SyncLogStatus::Error
        };
        settings.record_sync(status, outcome.message(), self.inner.clock.utc());
        if let Err(error) = self.inner.sync_state.save_settings(&settings).await {
            warn!(%error, "failed to record full resync outcome in settings");
        }
        info!(message = %outcome.message(), "full resync finished");
        Ok(outcome)
    }

    async fn rewrite(
        &self,
        target: &SheetTarget,
        rows: &[Vec<String>],
    ) -> Result<(), SpreadsheetError> {
        self.inner.spreadsheet.clear(target).await?;
        self.inner.spreadsheet.write_rows(target, 1, rows).await
    }

    /// Write archive row `id` into the sheet, overwriting its existing row or
    /// appending one. A row that no longer exists in the archive is removed
    /// from the sheet instead.
    ///
    /// # Errors
    /// Fails only when the archive or settings store cannot be read.
    pub async fn upsert(&self, id: &ArchiveEntryId) -> Result<MirrorOutcome, Error> {
        let Some(archived) = self
            .inner
            .archive
            .find_by_id(id)
            .await
            .map_err(map_archive_error)?
        else {
            return self.delete(id).await;
        };

        let settings = self.load_settings().await?;
        let (operation, outcome) = match self.connect(&settings).await {
            Err(reason) => (SyncOperation::Update, MirrorOutcome::Unavailable { reason }),
            Ok(target) => {
                let cells = sheet_row(&archived);
                let result = match self.inner.spreadsheet.read_ids(&target).await {
                    Err(error) => Err(error),
                    Ok(ids) => match find_row(&ids, &id.to_string()) {
                        Some(row) => self
                            .inner
                            .spreadsheet
                            .write_rows(&target, row, std::slice::from_ref(&cells))
                            .await
                            .map(|()| (SyncOperation::Update, MirrorOutcome::Updated { row })),
                        None => self
                            .inner
                            .spreadsheet
                            .append_row(&target, &cells)
                            .await
                            .map(|()| (SyncOperation::Add, MirrorOutcome::Appended)),
                    },
                };
                match result {
                    Ok(done) => done,
                    Err(error) => {
                        self.invalidate(&target, &error).await;
                        (SyncOperation::Update, MirrorOutcome::Failed { error })
                    }
                }
            }
        };

        self.record(operation, Some(id), &outcome).await;
        Ok(outcome)
    }

    /// Remove archive row `id` from the sheet. A row that is not there is
    /// reported as [`MirrorOutcome::AlreadyAbsent`].
    ///
    /// # Errors
    /// Fails only when the settings store cannot be read.
    pub async fn delete(&self, id: &ArchiveEntryId) -> Result<MirrorOutcome, Error> {
        let settings = self.load_settings().await?;
        let outcome = match self.connect(&settings).await {
            Err(reason) => MirrorOutcome::Unavailable { reason },
            Ok(target) => {
                let result = match self.inner.spreadsheet.read_ids(&target).await {
                    Err(error) => Err(error),
                    Ok(ids) => match find_row(&ids, &id.to_string()) {
                        Some(row) => self
                            .inner
                            .spreadsheet
                            .delete_row(&target, row)
                            .await
                            .map(|()| MirrorOutcome::Deleted { row }),
                        None => Ok(MirrorOutcome::AlreadyAbsent),
                    },
                };
                match result {
                    Ok(outcome) => outcome,
                    Err(error) => {
                        self.invalidate(&target, &error).await;
                        MirrorOutcome::Failed { error }
                    }
                }
            }
        };

        self.record(SyncOperation::Delete, Some(id), &outcome).await;
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
