//! In-process store implementing every repository port and the outbox.
//!
//! The server falls back to this store when no database URL is configured,
//! and tests use it to drive the services end to end. It mirrors the
//! database's guarantees: each operation is all-or-nothing, queue numbers and
//! active phones are unique, and archive writes append outbox intents the
//! way the table triggers do.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::mirror::{NewSyncLog, SyncLog, SyncLogStatus, SyncSettings};
use crate::domain::ports::{
    ArchiveRepository, ArchiveRepositoryError, DisplaySettingsRepository,
    DisplaySettingsRepositoryError, EmployeeRepository, EmployeeRepositoryError,
    MirrorOutbox, MirrorOutboxError, OutboxFailure, OutboxIntent, OutboxOperation,
    QueueRepository, QueueRepositoryError, SyncStateRepository, SyncStateRepositoryError,
};
use crate::domain::{
    AdmissionPlan, ArchiveCleanup, ArchiveEntryId, ArchiveFilter, ArchivedQueueEntry,
    Compaction, DisplayVideoSettings, Employee, EmployeeId, EntryUpdate, QueueEntry, QueueEntryId, QueueFilter,
    ShadowOutcome,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Clone)]
struct OutboxRow {
    intent: OutboxIntent,
    next_attempt_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
    failed: bool,
}

impl OutboxRow {
    fn pending(&self) -> bool {
        self.processed_at.is_none() && !self.failed
    }
}

#[derive(Debug, Clone, Default)]
struct State {
    queue: Vec<QueueEntry>,
    archive: Vec<ArchivedQueueEntry>,
    employees: Vec<Employee>,
    settings: Option<SyncSettings>,
    video: Option<DisplayVideoSettings>,
    logs: Vec<SyncLog>,
    outbox: Vec<OutboxRow>,
    next_log_id: i64,
    next_intent_id: i64,
}

impl State {
    fn enqueue(&mut self, operation: OutboxOperation, id: ArchiveEntryId, now: DateTime<Utc>) {
        self.next_intent_id += 1;
        self.outbox.push(OutboxRow {
            intent: OutboxIntent {
                id: self.next_intent_id,
                operation,
                archive_entry_id: id,
                attempts: 0,
                created_at: now,
            },
            next_attempt_at: now,
            processed_at: None,
            failed: false,
        });
    }

    fn insert_archive(&mut self, row: ArchivedQueueEntry, now: DateTime<Utc>) {
        self.enqueue(OutboxOperation::Upsert, row.id, now);
        self.archive.push(row);
    }

    fn delete_archive_where(
        &mut self,
        predicate: impl Fn(&ArchivedQueueEntry) -> bool,
        now: DateTime<Utc>,
    ) -> u64 {
        let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.archive)
            .into_iter()
            .partition(|row| predicate(row));
        self.archive = kept;
        for row in &gone {
            self.enqueue(OutboxOperation::Delete, row.id, now);
        }
        u64::try_from(gone.len()).unwrap_or(u64::MAX)
    }

    fn apply_compaction(&mut self, compaction: &Compaction, now: DateTime<Utc>) {
        self.queue
            .retain(|entry| !compaction.removed.contains(&entry.id));
        for renumbering in &compaction.renumbered {
            if let Some(entry) = self.queue.iter_mut().find(|e| e.id == renumbering.id) {
                entry.queue_number = renumbering.queue_number;
            }
        }
        for shadow in &compaction.shadows {
            self.insert_archive(shadow.clone(), now);
        }
    }

    /// Enforce the queue's unique constraints at commit time.
    fn check_queue(&self) -> Result<(), QueueRepositoryError> {
        let mut numbers = HashSet::new();
        let mut phones = HashSet::new();
        for entry in &self.queue {
            if !numbers.insert(entry.queue_number) {
                return Err(QueueRepositoryError::queue_number_taken(format!(
                    "queue number {} is already assigned",
                    entry.queue_number
                )));
            }
            if entry.status.holds_phone() && !phones.insert(entry.phone.as_str()) {
                return Err(QueueRepositoryError::phone_already_queued(format!(
                    "phone {} already has an open entry",
                    entry.phone
                )));
            }
        }
        Ok(())
    }
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

fn window<T>(rows: Vec<T>, offset: Option<i64>, limit: Option<i64>) -> Vec<T> {
    let skip = offset
        .and_then(|value| usize::try_from(value).ok())
        .unwrap_or(0);
    let take = limit
        .and_then(|value| usize::try_from(value).ok())
        .unwrap_or(usize::MAX);
    rows.into_iter().skip(skip).take(take).collect()
}

/// Shared in-memory store; clones see the same data.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    /// Create an empty store stamping outbox intents with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, &'static str> {
        self.state.lock().map_err(|_| POISONED)
    }

    /// Run `change` against a copy of the state and keep it only when it
    /// succeeds, giving each write transaction semantics.
    fn transact<T>(
        &self,
        change: impl FnOnce(&mut State, DateTime<Utc>) -> Result<T, QueueRepositoryError>,
    ) -> Result<T, QueueRepositoryError> {
        let now = self.clock.utc();
        let mut state = self.lock().map_err(QueueRepositoryError::query)?;
        let mut draft = state.clone();
        let value = change(&mut draft, now)?;
        draft.check_queue()?;
        *state = draft;
        Ok(value)
    }
}

#[async_trait]
impl QueueRepository for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<QueueEntry>, QueueRepositoryError> {
        QueueRepository::list(self, &QueueFilter::default()).await
    }

    async fn list(&self, filter: &QueueFilter) -> Result<Vec<QueueEntry>, QueueRepositoryError> {
        let state = self.lock().map_err(QueueRepositoryError::query)?;
        let mut entries: Vec<QueueEntry> = state
            .queue
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.queue_number);
        Ok(entries)
    }

    async fn find_by_id(
        &self,
        id: &QueueEntryId,
    ) -> Result<Option<QueueEntry>, QueueRepositoryError> {
        let state = self.lock().map_err(QueueRepositoryError::query)?;
        Ok(state.queue.iter().find(|entry| entry.id == *id).cloned())
    }

    async fn find_latest_by_full_name(
        &self,
        full_name: &str,
    ) -> Result<Option<QueueEntry>, QueueRepositoryError> {
        let state = self.lock().map_err(QueueRepositoryError::query)?;
        Ok(state
            .queue
            .iter()
            .filter(|entry| entry.full_name == full_name)
            .max_by_key(|entry| entry.created_at)
            .cloned())
    }

    async fn has_phone_queued(&self, phone: &str) -> Result<bool, QueueRepositoryError> {
        let state = self.lock().map_err(QueueRepositoryError::query)?;
        Ok(state
            .queue
            .iter()
            .any(|entry| entry.phone == phone && entry.status.holds_phone()))
    }

    async fn admit(&self, plan: &AdmissionPlan) -> Result<(), QueueRepositoryError> {
        self.transact(|state, now| {
            state.apply_compaction(&plan.compaction, now);
            state.queue.push(plan.entry.clone());
            state.insert_archive(plan.shadow.clone(), now);
            Ok(())
        })
    }

    async fn compact(&self, compaction: &Compaction) -> Result<(), QueueRepositoryError> {
        self.transact(|state, now| {
            state.apply_compaction(compaction, now);
            Ok(())
        })
    }

    async fn apply_update(
        &self,
        update: &EntryUpdate,
    ) -> Result<ShadowOutcome, QueueRepositoryError> {
        self.transact(|state, now| {
            let entry = state
                .queue
                .iter_mut()
                .find(|entry| entry.id == update.entry.id)
                .ok_or_else(|| QueueRepositoryError::entry_missing(update.entry.id.to_string()))?;
            *entry = update.entry.clone();

            if let Some(change) = update.employee {
                if let Some(employee) = state
                    .employees
                    .iter_mut()
                    .find(|employee| employee.id == change.employee_id)
                {
                    employee.status = change.status;
                }
            }

            let mut touched = Vec::new();
            for row in state
                .archive
                .iter_mut()
                .filter(|row| row.original_id == update.entry.id)
            {
                row.status = update.shadow.status;
                row.updated_at = update.shadow.updated_at;
                row.processing_time = update.shadow.processing_time;
                if let Some(completed_at) = update.shadow.completed_at {
                    row.completed_at = Some(completed_at);
                }
                touched.push(row.id);
            }
            if touched.is_empty() {
                return Ok(ShadowOutcome::Missing);
            }
            for id in touched {
                state.enqueue(OutboxOperation::Upsert, id, now);
            }
            Ok(ShadowOutcome::Synced)
        })
    }

    async fn delete(&self, id: &QueueEntryId) -> Result<bool, QueueRepositoryError> {
        self.transact(|state, _| {
            let before = state.queue.len();
            state.queue.retain(|entry| entry.id != *id);
            Ok(state.queue.len() != before)
        })
    }
}

#[async_trait]
impl ArchiveRepository for InMemoryStore {
    async fn count(&self) -> Result<u64, ArchiveRepositoryError> {
        let state = self.lock().map_err(ArchiveRepositoryError::query)?;
        Ok(count(state.archive.len()))
    }

    async fn shadowed_among(
        &self,
        ids: &[QueueEntryId],
    ) -> Result<Vec<QueueEntryId>, ArchiveRepositoryError> {
        let state = self.lock().map_err(ArchiveRepositoryError::query)?;
        let shadowed: HashSet<QueueEntryId> =
            state.archive.iter().map(|row| row.original_id).collect();
        Ok(ids
            .iter()
            .filter(|id| shadowed.contains(id))
            .copied()
            .collect())
    }

    async fn find_by_id(
        &self,
        id: &ArchiveEntryId,
    ) -> Result<Option<ArchivedQueueEntry>, ArchiveRepositoryError> {
        let state = self.lock().map_err(ArchiveRepositoryError::query)?;
        Ok(state.archive.iter().find(|row| row.id == *id).cloned())
    }

    async fn list(
        &self,
        filter: &ArchiveFilter,
    ) -> Result<Vec<ArchivedQueueEntry>, ArchiveRepositoryError> {
        let state = self.lock().map_err(ArchiveRepositoryError::query)?;
        let mut rows: Vec<ArchivedQueueEntry> = state
            .archive
            .iter()
            .filter(|row| filter.status.is_none_or(|status| row.status == status))
            .filter(|row| {
                filter
                    .reason
                    .as_deref()
                    .is_none_or(|reason| row.archive_reason.as_str() == reason)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
        Ok(window(rows, filter.offset, filter.limit))
    }

    async fn cleanup_candidates(
        &self,
        cleanup: &ArchiveCleanup,
        limit: i64,
    ) -> Result<Vec<ArchivedQueueEntry>, ArchiveRepositoryError> {
        let state = self.lock().map_err(ArchiveRepositoryError::query)?;
        let mut rows: Vec<ArchivedQueueEntry> = state
            .archive
            .iter()
            .filter(|row| cleanup.selects(row))
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.archived_at);
        Ok(window(rows, None, Some(limit)))
    }

    async fn count_cleanup(
        &self,
        cleanup: &ArchiveCleanup,
    ) -> Result<u64, ArchiveRepositoryError> {
        let state = self.lock().map_err(ArchiveRepositoryError::query)?;
        Ok(count(
            state.archive.iter().filter(|row| cleanup.selects(row)).count(),
        ))
    }

    async fn delete_cleanup(
        &self,
        cleanup: &ArchiveCleanup,
    ) -> Result<u64, ArchiveRepositoryError> {
        let now = self.clock.utc();
        let mut state = self.lock().map_err(ArchiveRepositoryError::query)?;
        Ok(state.delete_archive_where(|row| cleanup.selects(row), now))
    }

    async fn delete_by_id_or_original(&self, id: &Uuid) -> Result<u64, ArchiveRepositoryError> {
        let now = self.clock.utc();
        let mut state = self.lock().map_err(ArchiveRepositoryError::query)?;
        Ok(state.delete_archive_where(
            |row| row.id.as_uuid() == id || row.original_id.as_uuid() == id,
            now,
        ))
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let state = self.lock().map_err(EmployeeRepositoryError::query)?;
        let mut employees = state.employees.clone();
        employees.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(employees)
    }

    async fn find_by_id(
        &self,
        id: &EmployeeId,
    ) -> Result<Option<Employee>, EmployeeRepositoryError> {
        let state = self.lock().map_err(EmployeeRepositoryError::query)?;
        Ok(state.employees.iter().find(|e| e.id == *id).cloned())
    }

    async fn insert(&self, employee: &Employee) -> Result<(), EmployeeRepositoryError> {
        let mut state = self.lock().map_err(EmployeeRepositoryError::query)?;
        if state.employees.iter().any(|e| e.id == employee.id) {
            return Err(EmployeeRepositoryError::query(format!(
                "employee {} already exists",
                employee.id
            )));
        }
        state.employees.push(employee.clone());
        Ok(())
    }

    async fn update(&self, employee: &Employee) -> Result<bool, EmployeeRepositoryError> {
        let mut state = self.lock().map_err(EmployeeRepositoryError::query)?;
        match state.employees.iter_mut().find(|e| e.id == employee.id) {
            Some(existing) => {
                *existing = employee.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &EmployeeId) -> Result<bool, EmployeeRepositoryError> {
        let mut state = self.lock().map_err(EmployeeRepositoryError::query)?;
        let before = state.employees.len();
        state.employees.retain(|e| e.id != *id);
        if state.employees.len() == before {
            return Ok(false);
        }
        for entry in state
            .queue
            .iter_mut()
            .filter(|entry| entry.assigned_employee_id == Some(*id))
        {
            entry.assigned_employee_id = None;
        }
        Ok(true)
    }
}

#[async_trait]
impl SyncStateRepository for InMemoryStore {
    async fn load_settings(&self) -> Result<Option<SyncSettings>, SyncStateRepositoryError> {
        let state = self.lock().map_err(SyncStateRepositoryError::query)?;
        Ok(state.settings.clone())
    }

    async fn save_settings(
        &self,
        settings: &SyncSettings,
    ) -> Result<(), SyncStateRepositoryError> {
        let mut state = self.lock().map_err(SyncStateRepositoryError::query)?;
        state.settings = Some(settings.clone());
        Ok(())
    }

    async fn append_log(&self, log: &NewSyncLog) -> Result<(), SyncStateRepositoryError> {
        let mut state = self.lock().map_err(SyncStateRepositoryError::query)?;
        state.next_log_id += 1;
        let id = state.next_log_id;
        state.logs.push(SyncLog {
            id,
            operation: log.operation,
            entry_id: log.entry_id,
            status: log.status,
            message: log.message.clone(),
            created_at: log.created_at,
        });
        Ok(())
    }

    async fn recent_logs(&self, limit: i64) -> Result<Vec<SyncLog>, SyncStateRepositoryError> {
        let state = self.lock().map_err(SyncStateRepositoryError::query)?;
        let mut logs = state.logs.clone();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(window(logs, None, Some(limit)))
    }

    async fn count_logs_since(
        &self,
        since: DateTime<Utc>,
        status: SyncLogStatus,
    ) -> Result<u64, SyncStateRepositoryError> {
        let state = self.lock().map_err(SyncStateRepositoryError::query)?;
        Ok(count(
            state
                .logs
                .iter()
                .filter(|log| log.status == status && log.created_at >= since)
                .count(),
        ))
    }

    async fn count_logs(&self) -> Result<u64, SyncStateRepositoryError> {
        let state = self.lock().map_err(SyncStateRepositoryError::query)?;
        Ok(count(state.logs.len()))
    }
}

#[async_trait]
impl DisplaySettingsRepository for InMemoryStore {
    async fn load_video(
        &self,
    ) -> Result<Option<DisplayVideoSettings>, DisplaySettingsRepositoryError> {
        let state = self.lock().map_err(DisplaySettingsRepositoryError::query)?;
        Ok(state.video.clone())
    }

    async fn save_video(
        &self,
        settings: &DisplayVideoSettings,
    ) -> Result<(), DisplaySettingsRepositoryError> {
        let mut state = self.lock().map_err(DisplaySettingsRepositoryError::query)?;
        state.video = Some(settings.clone());
        Ok(())
    }
}

#[async_trait]
impl MirrorOutbox for InMemoryStore {
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<OutboxIntent>, MirrorOutboxError> {
        let state = self.lock().map_err(MirrorOutboxError::query)?;
        let due: Vec<OutboxIntent> = state
            .outbox
            .iter()
            .filter(|row| row.pending() && row.next_attempt_at <= now)
            .map(|row| row.intent.clone())
            .collect();
        Ok(window(due, None, Some(limit)))
    }

    async fn mark_processed(
        &self,
        ids: &[i64],
        at: DateTime<Utc>,
    ) -> Result<(), MirrorOutboxError> {
        let mut state = self.lock().map_err(MirrorOutboxError::query)?;
        for row in state
            .outbox
            .iter_mut()
            .filter(|row| ids.contains(&row.intent.id))
        {
            row.processed_at = Some(at);
        }
        Ok(())
    }

    async fn record_failure(&self, failure: &OutboxFailure) -> Result<(), MirrorOutboxError> {
        let mut state = self.lock().map_err(MirrorOutboxError::query)?;
        if let Some(row) = state
            .outbox
            .iter_mut()
            .find(|row| row.intent.id == failure.id)
        {
            row.intent.attempts = failure.attempts;
            match failure.retry_at {
                Some(retry_at) => row.next_attempt_at = retry_at,
                None => row.failed = true,
            }
        }
        Ok(())
    }

    async fn pending_count(&self) -> Result<u64, MirrorOutboxError> {
        let state = self.lock().map_err(MirrorOutboxError::query)?;
        Ok(count(state.outbox.iter().filter(|row| row.pending()).count()))
    }
}

#[cfg(test)]
mod tests;
