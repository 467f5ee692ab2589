//! PostgreSQL-backed `DisplaySettingsRepository`.
//!
//! The video settings live in one row keyed by [`SETTINGS_ROW_ID`]; saving
//! upserts it.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::DisplayVideoSettings;
use crate::domain::ports::{DisplaySettingsRepository, DisplaySettingsRepositoryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{DisplaySettingsRow, SETTINGS_ROW_ID};
use super::pool::{DbPool, PoolError};
use super::schema::display_settings;

/// Diesel-backed implementation of the `DisplaySettingsRepository` port.
#[derive(Clone)]
pub struct DieselDisplaySettingsRepository {
    pool: DbPool,
}

impl DieselDisplaySettingsRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> DisplaySettingsRepositoryError {
    map_pool_error(error, DisplaySettingsRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> DisplaySettingsRepositoryError {
    map_diesel_error(
        error,
        DisplaySettingsRepositoryError::query,
        DisplaySettingsRepositoryError::connection,
    )
}

#[async_trait]
impl DisplaySettingsRepository for DieselDisplaySettingsRepository {
    async fn load_video(
        &self,
    ) -> Result<Option<DisplayVideoSettings>, DisplaySettingsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<DisplaySettingsRow> = display_settings::table
            .find(SETTINGS_ROW_ID)
            .select(DisplaySettingsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        Ok(row.map(DisplayVideoSettings::from))
    }

    async fn save_video(
        &self,
        settings: &DisplayVideoSettings,
    ) -> Result<(), DisplaySettingsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(display_settings::table)
            .values(DisplaySettingsRow::from(settings))
            .on_conflict(display_settings::id)
            .do_update()
            .set((
                display_settings::youtube_url.eq(excluded(display_settings::youtube_url)),
                display_settings::is_enabled.eq(excluded(display_settings::is_enabled)),
                display_settings::updated_at.eq(excluded(display_settings::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }
}
