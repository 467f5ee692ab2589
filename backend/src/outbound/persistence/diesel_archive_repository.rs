//! PostgreSQL-backed `ArchiveRepository`.
//!
//! Deletions here fire the `archived_queue_entries_outbox` trigger, so the
//! mirror learns about them without any extra write from this adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ArchiveRepository, ArchiveRepositoryError};
use crate::domain::{ArchiveCleanup, ArchiveEntryId, ArchiveFilter, ArchivedQueueEntry, QueueEntryId};

use super::error_mapping::{affected, map_diesel_error, map_pool_error, to_count};
use super::models::ArchivedEntryRow;
use super::pool::{DbPool, PoolError};
use super::schema::archived_queue_entries;

/// Diesel-backed implementation of the `ArchiveRepository` port.
#[derive(Clone)]
pub struct DieselArchiveRepository {
    pool: DbPool,
}

impl DieselArchiveRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ArchiveRepositoryError {
    map_pool_error(error, ArchiveRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ArchiveRepositoryError {
    map_diesel_error(
        error,
        ArchiveRepositoryError::query,
        ArchiveRepositoryError::connection,
    )
}

fn to_domain(rows: Vec<ArchivedEntryRow>) -> Result<Vec<ArchivedQueueEntry>, ArchiveRepositoryError> {
    rows.into_iter()
        .map(|row| ArchivedQueueEntry::try_from(row).map_err(ArchiveRepositoryError::query))
        .collect()
}

type BoxedArchiveQuery<'a> =
    archived_queue_entries::BoxedQuery<'a, diesel::pg::Pg, archived_queue_entries::SqlType>;

fn cleanup_query(cleanup: &ArchiveCleanup) -> BoxedArchiveQuery<'static> {
    let mut query = archived_queue_entries::table
        .filter(archived_queue_entries::archived_at.lt(cleanup.archived_before))
        .into_boxed();
    if let Some(status) = cleanup.status {
        query = query.filter(archived_queue_entries::status.eq(status.as_str()));
    }
    query
}

#[async_trait]
impl ArchiveRepository for DieselArchiveRepository {
    async fn count(&self) -> Result<u64, ArchiveRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = archived_queue_entries::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(to_count(total))
    }

    async fn shadowed_among(
        &self,
        ids: &[QueueEntryId],
    ) -> Result<Vec<QueueEntryId>, ArchiveRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let wanted: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let found: Vec<Uuid> = archived_queue_entries::table
            .filter(archived_queue_entries::original_id.eq_any(wanted))
            .select(archived_queue_entries::original_id)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(ids
            .iter()
            .filter(|id| found.contains(id.as_uuid()))
            .copied()
            .collect())
    }

    async fn find_by_id(
        &self,
        id: &ArchiveEntryId,
    ) -> Result<Option<ArchivedQueueEntry>, ArchiveRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<ArchivedEntryRow> = archived_queue_entries::table
            .find(id.as_uuid())
            .select(ArchivedEntryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(ArchivedQueueEntry::try_from)
            .transpose()
            .map_err(ArchiveRepositoryError::query)
    }

    async fn list(
        &self,
        filter: &ArchiveFilter,
    ) -> Result<Vec<ArchivedQueueEntry>, ArchiveRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = archived_queue_entries::table.into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(archived_queue_entries::status.eq(status.as_str()));
        }
        if let Some(reason) = filter.reason.clone() {
            query = query.filter(archived_queue_entries::archive_reason.eq(reason));
        }
        if let Some(offset) = filter.offset {
            query = query.offset(offset);
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }
        let rows: Vec<ArchivedEntryRow> = query
            .order(archived_queue_entries::archived_at.desc())
            .select(ArchivedEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        to_domain(rows)
    }

    async fn cleanup_candidates(
        &self,
        cleanup: &ArchiveCleanup,
        limit: i64,
    ) -> Result<Vec<ArchivedQueueEntry>, ArchiveRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<ArchivedEntryRow> = cleanup_query(cleanup)
            .order(archived_queue_entries::archived_at.asc())
            .limit(limit)
            .select(ArchivedEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        to_domain(rows)
    }

    async fn count_cleanup(
        &self,
        cleanup: &ArchiveCleanup,
    ) -> Result<u64, ArchiveRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total: i64 = cleanup_query(cleanup)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(to_count(total))
    }

    async fn delete_cleanup(
        &self,
        cleanup: &ArchiveCleanup,
    ) -> Result<u64, ArchiveRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = diesel::delete(archived_queue_entries::table)
            .filter(archived_queue_entries::archived_at.lt(cleanup.archived_before))
            .into_boxed();
        if let Some(status) = cleanup.status {
            query = query.filter(archived_queue_entries::status.eq(status.as_str()));
        }
        let deleted = query.execute(&mut conn).await.map_err(diesel_error)?;
        Ok(affected(deleted))
    }

    async fn delete_by_id_or_original(&self, id: &Uuid) -> Result<u64, ArchiveRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(
            archived_queue_entries::table.filter(
                archived_queue_entries::id
                    .eq(id)
                    .or(archived_queue_entries::original_id.eq(id)),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(affected(deleted))
    }
}
