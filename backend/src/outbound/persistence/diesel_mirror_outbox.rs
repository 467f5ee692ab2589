//! PostgreSQL-backed `MirrorOutbox`.
//!
//! Rows are inserted by the archive trigger; this adapter only claims and
//! settles them. A single worker drains the table, so claiming is a plain
//! ordered read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{MirrorOutbox, MirrorOutboxError, OutboxFailure, OutboxIntent};

use super::error_mapping::{map_diesel_error, map_pool_error, to_count};
use super::models::OutboxRow;
use super::pool::{DbPool, PoolError};
use super::schema::mirror_outbox;

/// Diesel-backed implementation of the `MirrorOutbox` port.
#[derive(Clone)]
pub struct DieselMirrorOutbox {
    pool: DbPool,
}

impl DieselMirrorOutbox {
    /// Create a new outbox adapter with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> MirrorOutboxError {
    map_pool_error(error, MirrorOutboxError::connection)
}

fn diesel_error(error: diesel::result::Error) -> MirrorOutboxError {
    map_diesel_error(
        error,
        MirrorOutboxError::query,
        MirrorOutboxError::connection,
    )
}

#[async_trait]
impl MirrorOutbox for DieselMirrorOutbox {
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<OutboxIntent>, MirrorOutboxError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<OutboxRow> = mirror_outbox::table
            .filter(mirror_outbox::processed_at.is_null())
            .filter(mirror_outbox::failed.eq(false))
            .filter(mirror_outbox::next_attempt_at.le(now))
            .order(mirror_outbox::id.asc())
            .limit(limit)
            .select(OutboxRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter()
            .map(|row| OutboxIntent::try_from(row).map_err(MirrorOutboxError::query))
            .collect()
    }

    async fn mark_processed(
        &self,
        ids: &[i64],
        at: DateTime<Utc>,
    ) -> Result<(), MirrorOutboxError> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let settled = diesel::update(mirror_outbox::table.filter(mirror_outbox::id.eq_any(ids)))
            .set(mirror_outbox::processed_at.eq(Some(at)))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        debug!(settled, "outbox intents processed");
        Ok(())
    }

    async fn record_failure(&self, failure: &OutboxFailure) -> Result<(), MirrorOutboxError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let attempts = i32::try_from(failure.attempts).unwrap_or(i32::MAX);
        let target = mirror_outbox::table.find(failure.id);
        let common = (
            mirror_outbox::attempts.eq(attempts),
            mirror_outbox::last_error.eq(Some(failure.last_error.as_str())),
        );
        let result = match failure.retry_at {
            Some(retry_at) => {
                diesel::update(target)
                    .set((common, mirror_outbox::next_attempt_at.eq(retry_at)))
                    .execute(&mut conn)
                    .await
            }
            None => {
                diesel::update(target)
                    .set((common, mirror_outbox::failed.eq(true)))
                    .execute(&mut conn)
                    .await
            }
        };
        result.map(|_| ()).map_err(diesel_error)
    }

    async fn pending_count(&self) -> Result<u64, MirrorOutboxError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = mirror_outbox::table
            .filter(mirror_outbox::processed_at.is_null())
            .filter(mirror_outbox::failed.eq(false))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(to_count(total))
    }
}
