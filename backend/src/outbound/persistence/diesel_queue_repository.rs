//! PostgreSQL-backed `QueueRepository`.
//!
//! Multi-row mutations run in one transaction. Queue-number uniqueness is a
//! deferred constraint, so a compaction may swap numbers freely and a
//! collision with a concurrent admission only surfaces at commit, where it
//! maps to [`QueueRepositoryError::QueueNumberTaken`].

use async_trait::async_trait;
use chrono::{NaiveTime, TimeDelta};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{QueueRepository, QueueRepositoryError};
use crate::domain::{
    AdmissionPlan, Compaction, EntryUpdate, QueueEntry, QueueEntryId, QueueFilter, QueueStatus,
    ShadowOutcome,
};

use super::error_mapping::{like_pattern, map_pool_error, map_queue_error, map_update_error};
use super::models::{ArchivedEntryRow, QueueEntryRow};
use super::pool::DbPool;
use super::schema::{archived_queue_entries, employees, queue_entries};

/// Diesel-backed implementation of the `QueueRepository` port.
#[derive(Clone)]
pub struct DieselQueueRepository {
    pool: DbPool,
}

impl DieselQueueRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_domain(rows: Vec<QueueEntryRow>) -> Result<Vec<QueueEntry>, QueueRepositoryError> {
    rows.into_iter()
        .map(|row| QueueEntry::try_from(row).map_err(QueueRepositoryError::query))
        .collect()
}

const OPEN_STATUSES: [&str; 2] = [
    QueueStatus::Waiting.as_str(),
    QueueStatus::InProgress.as_str(),
];

/// Apply a compaction inside an open transaction: archive missing shadows,
/// drop the evicted rows, then renumber the survivors.
async fn apply_compaction(
    conn: &mut AsyncPgConnection,
    compaction: &Compaction,
) -> Result<(), diesel::result::Error> {
    if !compaction.shadows.is_empty() {
        let shadows: Vec<ArchivedEntryRow> =
            compaction.shadows.iter().map(ArchivedEntryRow::from).collect();
        diesel::insert_into(archived_queue_entries::table)
            .values(&shadows)
            .execute(conn)
            .await?;
    }
    if !compaction.removed.is_empty() {
        let removed: Vec<uuid::Uuid> = compaction.removed.iter().map(|id| *id.as_uuid()).collect();
        diesel::delete(queue_entries::table.filter(queue_entries::id.eq_any(removed)))
            .execute(conn)
            .await?;
    }
    for renumbering in &compaction.renumbered {
        diesel::update(queue_entries::table.find(renumbering.id.as_uuid()))
            .set(queue_entries::queue_number.eq(renumbering.queue_number))
            .execute(conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl QueueRepository for DieselQueueRepository {
    async fn list_all(&self) -> Result<Vec<QueueEntry>, QueueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QueueRepositoryError::connection))?;
        let rows: Vec<QueueEntryRow> = queue_entries::table
            .order(queue_entries::queue_number.asc())
            .select(QueueEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_queue_error)?;
        to_domain(rows)
    }

    async fn list(&self, filter: &QueueFilter) -> Result<Vec<QueueEntry>, QueueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QueueRepositoryError::connection))?;

        let mut query = queue_entries::table
            .select(QueueEntryRow::as_select())
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(queue_entries::status.eq(status.as_str()));
        }
        if let Some(day) = filter.created_on {
            let start = day.and_time(NaiveTime::MIN).and_utc();
            query = query.filter(
                queue_entries::created_at
                    .ge(start)
                    .and(queue_entries::created_at.lt(start + TimeDelta::days(1))),
            );
        }
        if let Some(employee_id) = filter.assigned_employee_id {
            query = query.filter(queue_entries::assigned_employee_id.eq(*employee_id.as_uuid()));
        }
        if let Some(name) = filter.employee_name.as_deref() {
            query = query.filter(queue_entries::assigned_employee_name.ilike(like_pattern(name)));
        }
        if let Some(name) = filter.full_name.as_deref() {
            query = query.filter(queue_entries::full_name.ilike(like_pattern(name)));
        }
        if let Some(program) = filter.program.as_ref() {
            query = query.filter(queue_entries::programs.contains(vec![program.clone()]));
        }

        let rows: Vec<QueueEntryRow> = query
            .order(queue_entries::queue_number.asc())
            .load(&mut conn)
            .await
            .map_err(map_queue_error)?;
        to_domain(rows)
    }

    async fn find_by_id(
        &self,
        id: &QueueEntryId,
    ) -> Result<Option<QueueEntry>, QueueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QueueRepositoryError::connection))?;
        let row: Option<QueueEntryRow> = queue_entries::table
            .find(id.as_uuid())
            .select(QueueEntryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_queue_error)?;
        row.map(QueueEntry::try_from)
            .transpose()
            .map_err(QueueRepositoryError::query)
    }

    async fn find_latest_by_full_name(
        &self,
        full_name: &str,
    ) -> Result<Option<QueueEntry>, QueueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QueueRepositoryError::connection))?;
        let row: Option<QueueEntryRow> = queue_entries::table
            .filter(queue_entries::full_name.eq(full_name))
            .order(queue_entries::created_at.desc())
            .select(QueueEntryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_queue_error)?;
        row.map(QueueEntry::try_from)
            .transpose()
            .map_err(QueueRepositoryError::query)
    }

    async fn has_phone_queued(&self, phone: &str) -> Result<bool, QueueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QueueRepositoryError::connection))?;
        diesel::select(diesel::dsl::exists(
            queue_entries::table
                .filter(queue_entries::phone.eq(phone))
                .filter(queue_entries::status.eq_any(OPEN_STATUSES)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_queue_error)
    }

    async fn admit(&self, plan: &AdmissionPlan) -> Result<(), QueueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QueueRepositoryError::connection))?;
        let entry = QueueEntryRow::from(&plan.entry);
        let shadow = ArchivedEntryRow::from(&plan.shadow);

        conn.transaction(|conn| {
            async move {
                apply_compaction(conn, &plan.compaction).await?;
                diesel::insert_into(queue_entries::table)
                    .values(&entry)
                    .execute(conn)
                    .await?;
                diesel::insert_into(archived_queue_entries::table)
                    .values(&shadow)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_queue_error)?;

        debug!(
            queue_number = plan.entry.queue_number,
            evicted = plan.compaction.removed.len(),
            "admission committed"
        );
        Ok(())
    }

    async fn compact(&self, compaction: &Compaction) -> Result<(), QueueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QueueRepositoryError::connection))?;
        conn.transaction(|conn| apply_compaction(conn, compaction).scope_boxed())
            .await
            .map_err(map_queue_error)
    }

    async fn apply_update(
        &self,
        update: &EntryUpdate,
    ) -> Result<ShadowOutcome, QueueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QueueRepositoryError::connection))?;
        let row = QueueEntryRow::from(&update.entry);
        let original_id = *update.entry.id.as_uuid();

        let shadows_touched = conn
            .transaction(|conn| {
                async move {
                    let updated = diesel::update(queue_entries::table.find(original_id))
                        .set(&row)
                        .execute(conn)
                        .await?;
                    if updated == 0 {
                        return Err(diesel::result::Error::NotFound);
                    }

                    if let Some(change) = update.employee {
                        diesel::update(employees::table.find(change.employee_id.as_uuid()))
                            .set(employees::status.eq(change.status.as_str()))
                            .execute(conn)
                            .await?;
                    }

                    let shadows = archived_queue_entries::table
                        .filter(archived_queue_entries::original_id.eq(original_id));
                    let status = archived_queue_entries::status.eq(update.shadow.status.as_str());
                    let updated_at = archived_queue_entries::updated_at.eq(update.shadow.updated_at);
                    let processing_time =
                        archived_queue_entries::processing_time.eq(update.shadow.processing_time);
                    match update.shadow.completed_at {
                        Some(completed_at) => {
                            diesel::update(shadows)
                                .set((
                                    status,
                                    updated_at,
                                    processing_time,
                                    archived_queue_entries::completed_at.eq(completed_at),
                                ))
                                .execute(conn)
                                .await
                        }
                        None => {
                            diesel::update(shadows)
                                .set((status, updated_at, processing_time))
                                .execute(conn)
                                .await
                        }
                    }
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_update_error(err, &update.entry.id))?;

        Ok(if shadows_touched == 0 {
            ShadowOutcome::Missing
        } else {
            ShadowOutcome::Synced
        })
    }

    async fn delete(&self, id: &QueueEntryId) -> Result<bool, QueueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, QueueRepositoryError::connection))?;
        let deleted = diesel::delete(queue_entries::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_queue_error)?;
        Ok(deleted > 0)
    }
}
