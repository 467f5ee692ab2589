//! PostgreSQL-backed `SyncStateRepository`.
//!
//! Settings live in a single row keyed by [`SETTINGS_ROW_ID`]; saving
//! upserts it. The audit log is append-only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::mirror::{NewSyncLog, SyncLog, SyncLogStatus, SyncSettings};
use crate::domain::ports::{SyncStateRepository, SyncStateRepositoryError};

use super::error_mapping::{map_diesel_error, map_pool_error, to_count};
use super::models::{NewSyncLogRow, SETTINGS_ROW_ID, SyncLogRow, SyncSettingsRow};
use super::pool::{DbPool, PoolError};
use super::schema::{sync_logs, sync_settings};

/// Diesel-backed implementation of the `SyncStateRepository` port.
#[derive(Clone)]
pub struct DieselSyncStateRepository {
    pool: DbPool,
}

impl DieselSyncStateRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> SyncStateRepositoryError {
    map_pool_error(error, SyncStateRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> SyncStateRepositoryError {
    map_diesel_error(
        error,
        SyncStateRepositoryError::query,
        SyncStateRepositoryError::connection,
    )
}

#[async_trait]
impl SyncStateRepository for DieselSyncStateRepository {
    async fn load_settings(&self) -> Result<Option<SyncSettings>, SyncStateRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<SyncSettingsRow> = sync_settings::table
            .find(SETTINGS_ROW_ID)
            .select(SyncSettingsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(SyncSettings::try_from)
            .transpose()
            .map_err(SyncStateRepositoryError::query)
    }

    async fn save_settings(
        &self,
        settings: &SyncSettings,
    ) -> Result<(), SyncStateRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = SyncSettingsRow::from(settings);
        diesel::insert_into(sync_settings::table)
            .values(&row)
            .on_conflict(sync_settings::id)
            .do_update()
            .set((
                sync_settings::spreadsheet_id.eq(excluded(sync_settings::spreadsheet_id)),
                sync_settings::sheet_name.eq(excluded(sync_settings::sheet_name)),
                sync_settings::enabled.eq(excluded(sync_settings::enabled)),
                sync_settings::sync_mode.eq(excluded(sync_settings::sync_mode)),
                sync_settings::last_sync_at.eq(excluded(sync_settings::last_sync_at)),
                sync_settings::last_sync_status.eq(excluded(sync_settings::last_sync_status)),
                sync_settings::last_sync_message.eq(excluded(sync_settings::last_sync_message)),
                sync_settings::updated_at.eq(excluded(sync_settings::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn append_log(&self, log: &NewSyncLog) -> Result<(), SyncStateRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(sync_logs::table)
            .values(NewSyncLogRow {
                operation: log.operation.as_str(),
                entry_id: log.entry_id,
                status: log.status.as_str(),
                message: log.message.as_deref(),
                created_at: log.created_at,
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn recent_logs(&self, limit: i64) -> Result<Vec<SyncLog>, SyncStateRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<SyncLogRow> = sync_logs::table
            .order((sync_logs::created_at.desc(), sync_logs::id.desc()))
            .limit(limit)
            .select(SyncLogRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter()
            .map(|row| SyncLog::try_from(row).map_err(SyncStateRepositoryError::query))
            .collect()
    }

    async fn count_logs_since(
        &self,
        since: DateTime<Utc>,
        status: SyncLogStatus,
    ) -> Result<u64, SyncStateRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = sync_logs::table
            .filter(sync_logs::status.eq(status.as_str()))
            .filter(sync_logs::created_at.ge(since))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(to_count(total))
    }

    async fn count_logs(&self) -> Result<u64, SyncStateRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = sync_logs::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(to_count(total))
    }
}
