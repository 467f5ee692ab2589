//! Administrative surface of the mirror.

use async_trait::async_trait;
use chrono::Duration;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    ConnectionReport, FullSyncReport, MirrorControl, MirrorHealth, MirrorHealthState,
    MirrorOutboxError, SyncStats, SyncStatusReport,
};
use crate::domain::queue_service::map_archive_error;
use crate::domain::{Error, TraceId};

use super::service::{MirrorOutcome, MirrorSyncService, map_sync_state_error};
use super::settings::{SyncLogStatus, SyncSettings, SyncSettingsUpdate};

/// Number of audit rows returned by [`MirrorControl::stats`].
pub const RECENT_LOG_LIMIT: i64 = 10;

pub(crate) fn map_outbox_error(error: MirrorOutboxError) -> Error {
    match error {
        MirrorOutboxError::Connection { message } => {
            Error::service_unavailable(format!("mirror outbox unavailable: {message}"))
        }
        MirrorOutboxError::Query { message } => {
            Error::internal(format!("mirror outbox error: {message}"))
        }
    }
}

fn require_configured(settings: &SyncSettings) -> Result<(), Error> {
    if settings.spreadsheet_id().is_none() {
        return Err(Error::invalid_request("mirror spreadsheet is not configured")
            .with_details(json!({ "code": "not_configured" })));
    }
    Ok(())
}

fn unavailable(message: String) -> Error {
    Error::service_unavailable(message).with_details(json!({ "code": "mirror_unavailable" }))
}

fn count(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[async_trait]
impl MirrorControl for MirrorSyncService {
    async fn settings(&self) -> Result<SyncSettings, Error> {
        self.load_settings().await
    }

    async fn update_settings(&self, update: SyncSettingsUpdate) -> Result<SyncSettings, Error> {
        let mut settings = self.load_settings().await?;
        update.apply(&mut settings, self.inner.clock.utc());
        self.inner
            .sync_state
            .save_settings(&settings)
            .await
            .map_err(map_sync_state_error)?;
        self.reset_connection().await;
        info!(
            enabled = settings.enabled,
            mode = settings.mode.as_str(),
            sheet = %settings.sheet_name,
            "mirror settings updated"
        );
        Ok(settings)
    }

    async fn status(&self) -> Result<SyncStatusReport, Error> {
        let settings = self.load_settings().await?;
        let archive_total = self
            .inner
            .archive
            .count()
            .await
            .map_err(map_archive_error)?;
        let pending_changes = self
            .inner
            .outbox
            .pending_count()
            .await
            .map_err(map_outbox_error)?;
        Ok(SyncStatusReport {
            settings,
            archive_total,
            pending_changes,
        })
    }

    async fn run_full_sync(&self) -> Result<FullSyncReport, Error> {
        require_configured(&self.load_settings().await?)?;
        match self.full_resync().await? {
            MirrorOutcome::FullResync { rows_written } => Ok(FullSyncReport {
                rows_written: count(rows_written),
            }),
            other => Err(unavailable(other.message())),
        }
    }

    async fn start_background_sync(&self) -> Result<(), Error> {
        require_configured(&self.load_settings().await?)?;
        let mirror = self.clone();
        let task = async move {
            match mirror.full_resync().await {
                Ok(outcome) if outcome.is_success() => {
                    info!(message = %outcome.message(), "background full resync finished");
                }
                Ok(outcome) => {
                    warn!(message = %outcome.message(), "background full resync failed");
                }
                Err(error) => warn!(%error, "background full resync failed"),
            }
        };
        match TraceId::current() {
            Some(trace_id) => tokio::spawn(TraceId::scope(trace_id, task)),
            None => tokio::spawn(task),
        };
        Ok(())
    }

    async fn test_connection(&self) -> Result<ConnectionReport, Error> {
        let settings = self.load_settings().await?;
        require_configured(&settings)?;
        self.reset_connection().await;
        let target = self.connect(&settings).await.map_err(unavailable)?;
        Ok(ConnectionReport {
            spreadsheet_id: target.spreadsheet_id,
            title: target.title,
            sheet_name: target.sheet_name,
            sheet_names: target.sheet_names,
        })
    }

    async fn stats(&self) -> Result<SyncStats, Error> {
        let since = self.inner.clock.utc() - Duration::hours(24);
        let sync_state = &self.inner.sync_state;
        let archive_total = self
            .inner
            .archive
            .count()
            .await
            .map_err(map_archive_error)?;
        let total_logs = sync_state.count_logs().await.map_err(map_sync_state_error)?;
        let successes_last_day = sync_state
            .count_logs_since(since, SyncLogStatus::Success)
            .await
            .map_err(map_sync_state_error)?;
        let errors_last_day = sync_state
            .count_logs_since(since, SyncLogStatus::Error)
            .await
            .map_err(map_sync_state_error)?;
        let recent_logs = sync_state
            .recent_logs(RECENT_LOG_LIMIT)
            .await
            .map_err(map_sync_state_error)?;
        Ok(SyncStats {
            archive_total,
            total_logs,
            successes_last_day,
            errors_last_day,
            recent_logs,
        })
    }

    async fn health(&self) -> Result<MirrorHealth, Error> {
        let settings = self.load_settings().await?;
        let archive_total = self
            .inner
            .archive
            .count()
            .await
            .map_err(map_archive_error)?;
        let report = |state, message: Option<String>, sheet_rows: Option<u64>| MirrorHealth {
            state,
            message,
            archive_total,
            sheet_rows,
            needs_full_sync: sheet_rows.is_some_and(|rows| rows < archive_total),
        };

        if settings.spreadsheet_id().is_none() {
            return Ok(report(MirrorHealthState::NotConfigured, None, None));
        }
        if !settings.enabled {
            return Ok(report(MirrorHealthState::Disabled, None, None));
        }
        let target = match self.connect(&settings).await {
            Ok(target) => target,
            Err(reason) => {
                return Ok(report(MirrorHealthState::Misconfigured, Some(reason), None));
            }
        };
        match self.inner.spreadsheet.read_ids(&target).await {
            Ok(ids) => {
                let rows = ids.iter().skip(1).filter(|cell| !cell.is_empty()).count();
                Ok(report(MirrorHealthState::Healthy, None, Some(count(rows))))
            }
            Err(error) => Ok(report(
                MirrorHealthState::Misconfigured,
                Some(error.to_string()),
                None,
            )),
        }
    }
}
