//! Queue lifecycle services.
//!
//! [`QueueLifecycleService`] owns admissions, applicant self-service, and
//! administrative queue maintenance. Every write goes through the queue
//! repository so the entry and its archive shadow commit together.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    ArchiveRepository, ArchiveRepositoryError, BulkDeleteOutcome, DisplayBoardEntry,
    EmployeeRepository, EmployeeRepositoryError, JoinQueueRequest, QueueAdministration,
    QueueRepository, QueueRepositoryError, QueueStanding, RenumberingReport, VisitorQueue,
};
use crate::domain::{
    ACTIVE_QUEUE_CEILING, AdmissionPlan, ArchiveReason, Assignee, EmployeeStatus,
    EmployeeStatusChange, EntryUpdate, Error, QueueEntry, QueueEntryId, QueueEntryPatch,
    QueueFilter, QueueStatus, ShadowOutcome, compact, next_queue_number, plan_admission,
    select_assignee, waiting_position,
};

/// Extra attempts after a concurrent writer took the computed queue number.
pub const QUEUE_NUMBER_RETRIES: u32 = 3;

pub(crate) fn map_queue_error(error: QueueRepositoryError) -> Error {
    match error {
        QueueRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("queue repository unavailable: {message}"))
        }
        QueueRepositoryError::Query { message } => {
            Error::internal(format!("queue repository error: {message}"))
        }
        QueueRepositoryError::QueueNumberTaken { message } => {
            Error::conflict("queue number is already taken; please retry")
                .with_details(json!({ "code": "queue_number_taken", "message": message }))
        }
        QueueRepositoryError::PhoneAlreadyQueued { .. } => duplicate_phone_error(),
        QueueRepositoryError::EntryMissing { message } => {
            Error::not_found(format!("queue entry {message} not found"))
        }
    }
}

pub(crate) fn map_archive_error(error: ArchiveRepositoryError) -> Error {
    match error {
        ArchiveRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("archive repository unavailable: {message}"))
        }
        ArchiveRepositoryError::Query { message } => {
            Error::internal(format!("archive repository error: {message}"))
        }
    }
}

pub(crate) fn map_employee_error(error: EmployeeRepositoryError) -> Error {
    match error {
        EmployeeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("employee repository unavailable: {message}"))
        }
        EmployeeRepositoryError::Query { message } => {
            Error::internal(format!("employee repository error: {message}"))
        }
    }
}

fn duplicate_phone_error() -> Error {
    Error::conflict("an active queue entry already exists for this phone number")
        .with_details(json!({ "code": "duplicate_phone" }))
}

pub(crate) fn entry_not_found(id: &QueueEntryId) -> Error {
    Error::not_found(format!("queue entry {id} not found"))
}

/// Persist `update`, tolerating a missing archive shadow.
pub(crate) async fn commit_update<Q>(queue: &Q, update: EntryUpdate) -> Result<QueueEntry, Error>
where
    Q: QueueRepository + ?Sized,
{
    let outcome = queue.apply_update(&update).await.map_err(map_queue_error)?;
    if outcome == ShadowOutcome::Missing {
        warn!(
            entry_id = %update.entry.id,
            status = %update.entry.status,
            "archive shadow missing; queue entry updated alone"
        );
    }
    Ok(update.entry)
}

fn non_blank(value: &str, field: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_request(format!("{field} must not be empty"))
            .with_details(json!({ "field": field, "code": "empty" })));
    }
    Ok(trimmed.to_owned())
}

/// Queue service implementing the public and administrative driving ports.
#[derive(Clone)]
pub struct QueueLifecycleService<Q, A, E> {
    queue: Arc<Q>,
    archive: Arc<A>,
    employees: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<Q, A, E> QueueLifecycleService<Q, A, E> {
    /// Create the service over its repositories.
    pub fn new(queue: Arc<Q>, archive: Arc<A>, employees: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self {
            queue,
            archive,
            employees,
            clock,
        }
    }
}

impl<Q, A, E> QueueLifecycleService<Q, A, E>
where
    Q: QueueRepository,
    A: ArchiveRepository,
    E: EmployeeRepository,
{
    async fn resolve_assignee(&self, requested: Option<&Assignee>) -> Result<Assignee, Error> {
        if let Some(assignee) = requested {
            return Ok(assignee.clone());
        }
        let staff = self.employees.list().await.map_err(map_employee_error)?;
        let historical_count = self.archive.count().await.map_err(map_archive_error)?;
        select_assignee(&staff, historical_count)
            .map(Assignee::from)
            .ok_or_else(|| {
                Error::conflict("no admission staff is available to take applicants")
                    .with_details(json!({ "code": "no_staff_available" }))
            })
    }

    async fn plan(
        &self,
        request: &JoinQueueRequest,
        requested: Option<&Assignee>,
    ) -> Result<AdmissionPlan, Error> {
        let queue = self.queue.list_all().await.map_err(map_queue_error)?;
        let assignee = self.resolve_assignee(requested).await?;

        let shadowed: HashSet<QueueEntryId> = if queue.len() >= ACTIVE_QUEUE_CEILING {
            let completed: Vec<QueueEntryId> = queue
                .iter()
                .filter(|entry| entry.status == QueueStatus::Completed)
                .map(|entry| entry.id)
                .collect();
            self.archive
                .shadowed_among(&completed)
                .await
                .map_err(map_archive_error)?
                .into_iter()
                .collect()
        } else {
            HashSet::new()
        };

        let now = self.clock.utc();
        let entry = QueueEntry {
            id: QueueEntryId::random(),
            queue_number: 0,
            full_name: request.full_name.clone(),
            phone: request.phone.clone(),
            programs: request.programs.clone(),
            status: QueueStatus::Waiting,
            notes: request.notes.clone(),
            assigned_employee_id: Some(assignee.id),
            assigned_employee_name: Some(assignee.name),
            created_at: now,
            updated_at: now,
            processing_time: None,
            form_language: request.form_language.clone(),
        };

        plan_admission(&queue, &shadowed, entry, now).map_err(|full| {
            Error::conflict(full.to_string()).with_details(json!({
                "code": "queue_full",
                "size": full.size,
            }))
        })
    }

    fn normalise(request: JoinQueueRequest) -> Result<JoinQueueRequest, Error> {
        let full_name = non_blank(&request.full_name, "fullName")?;
        let phone = non_blank(&request.phone, "phone")?;
        let programs: Vec<String> = request
            .programs
            .iter()
            .map(|program| program.trim())
            .filter(|program| !program.is_empty())
            .map(str::to_owned)
            .collect();
        if programs.is_empty() {
            return Err(Error::invalid_request("at least one program is required")
                .with_details(json!({ "field": "programs", "code": "empty" })));
        }
        Ok(JoinQueueRequest {
            full_name,
            phone,
            programs,
            ..request
        })
    }

    async fn find_entry(&self, id: &QueueEntryId) -> Result<QueueEntry, Error> {
        self.queue
            .find_by_id(id)
            .await
            .map_err(map_queue_error)?
            .ok_or_else(|| entry_not_found(id))
    }

    async fn standing(&self, entry: QueueEntry) -> Result<QueueStanding, Error> {
        let position = if entry.status == QueueStatus::Waiting {
            let queue = self.queue.list_all().await.map_err(map_queue_error)?;
            waiting_position(&entry, &queue)
        } else {
            None
        };
        Ok(QueueStanding { entry, position })
    }
}

#[async_trait]
impl<Q, A, E> VisitorQueue for QueueLifecycleService<Q, A, E>
where
    Q: QueueRepository,
    A: ArchiveRepository,
    E: EmployeeRepository,
{
    async fn join(&self, request: JoinQueueRequest) -> Result<QueueEntry, Error> {
        let request = Self::normalise(request)?;

        if self
            .queue
            .has_phone_queued(&request.phone)
            .await
            .map_err(map_queue_error)?
        {
            return Err(duplicate_phone_error());
        }

        let requested = match request.assigned_employee_id {
            Some(id) => {
                let employee = self
                    .employees
                    .find_by_id(&id)
                    .await
                    .map_err(map_employee_error)?
                    .ok_or_else(|| {
                        Error::invalid_request(format!("employee {id} does not exist")).with_details(
                            json!({ "field": "assignedEmployeeId", "code": "unknown_employee" }),
                        )
                    })?;
                Some(Assignee::from(&employee))
            }
            None => None,
        };

        let mut retries = 0;
        loop {
            let plan = self.plan(&request, requested.as_ref()).await?;
            match self.queue.admit(&plan).await {
                Ok(()) => {
                    info!(
                        entry_id = %plan.entry.id,
                        queue_number = plan.entry.queue_number,
                        evicted = plan.compaction.removed.len(),
                        "applicant admitted"
                    );
                    return Ok(plan.entry);
                }
                Err(QueueRepositoryError::QueueNumberTaken { message })
                    if retries < QUEUE_NUMBER_RETRIES =>
                {
                    retries += 1;
                    warn!(%message, retries, "queue number raced; replanning admission");
                }
                Err(error) => return Err(map_queue_error(error)),
            }
        }
    }

    async fn check(&self, full_name: &str) -> Result<QueueStanding, Error> {
        let entry = self
            .queue
            .find_latest_by_full_name(full_name.trim())
            .await
            .map_err(map_queue_error)?
            .ok_or_else(|| Error::not_found("no queue entry found for this name"))?;
        self.standing(entry).await
    }

    async fn cancel(&self, id: &QueueEntryId) -> Result<QueueEntry, Error> {
        let mut entry = self.find_entry(id).await?;
        if !entry.status.holds_phone() {
            return Err(Error::not_found(format!(
                "queue entry {id} not found or already finished"
            )));
        }

        let employee = match (entry.status, entry.assigned_employee_id) {
            (QueueStatus::InProgress, Some(employee_id)) => Some(EmployeeStatusChange {
                employee_id,
                status: EmployeeStatus::Available,
            }),
            _ => None,
        };
        let shadow = entry.apply_patch(
            QueueEntryPatch::status(QueueStatus::Completed),
            self.clock.utc(),
        );
        commit_update(
            self.queue.as_ref(),
            EntryUpdate {
                entry,
                shadow,
                employee,
            },
        )
        .await
    }

    async fn move_back(&self, id: &QueueEntryId) -> Result<QueueStanding, Error> {
        let mut retries = 0;
        loop {
            let mut entry = self.find_entry(id).await?;
            if entry.status != QueueStatus::Waiting {
                return Err(Error::not_found(format!(
                    "queue entry {id} not found or not waiting"
                )));
            }
            let queue = self.queue.list_all().await.map_err(map_queue_error)?;
            let patch = QueueEntryPatch {
                queue_number: Some(next_queue_number(&queue)),
                ..QueueEntryPatch::default()
            };
            let shadow = entry.apply_patch(patch, self.clock.utc());
            let update = EntryUpdate {
                entry,
                shadow,
                employee: None,
            };
            match self.queue.apply_update(&update).await {
                Ok(outcome) => {
                    if outcome == ShadowOutcome::Missing {
                        warn!(entry_id = %id, "archive shadow missing; queue entry updated alone");
                    }
                    return self.standing(update.entry).await;
                }
                Err(QueueRepositoryError::QueueNumberTaken { message })
                    if retries < QUEUE_NUMBER_RETRIES =>
                {
                    retries += 1;
                    warn!(%message, retries, "queue number raced; retrying move to the end");
                }
                Err(error) => return Err(map_queue_error(error)),
            }
        }
    }

    async fn open_count(&self) -> Result<u64, Error> {
        let queue = self.queue.list_all().await.map_err(map_queue_error)?;
        let open = queue.iter().filter(|entry| entry.status.holds_phone()).count();
        Ok(u64::try_from(open).unwrap_or(u64::MAX))
    }

    async fn display_board(&self) -> Result<Vec<DisplayBoardEntry>, Error> {
        let filter = QueueFilter {
            status: Some(QueueStatus::InProgress),
            ..QueueFilter::default()
        };
        let serving = self.queue.list(&filter).await.map_err(map_queue_error)?;
        let desks: HashMap<_, _> = self
            .employees
            .list()
            .await
            .map_err(map_employee_error)?
            .into_iter()
            .map(|employee| (employee.id, employee.desk))
            .collect();

        Ok(serving
            .into_iter()
            .map(|entry| DisplayBoardEntry {
                id: *entry.id.as_uuid(),
                queue_number: entry.queue_number,
                status: entry.status,
                employee_desk: entry
                    .assigned_employee_id
                    .and_then(|id| desks.get(&id).cloned().flatten()),
                assigned_employee_name: entry.assigned_employee_name,
            })
            .collect())
    }
}

#[async_trait]
impl<Q, A, E> QueueAdministration for QueueLifecycleService<Q, A, E>
where
    Q: QueueRepository,
    A: ArchiveRepository,
    E: EmployeeRepository,
{
    async fn list(&self, filter: QueueFilter) -> Result<Vec<QueueEntry>, Error> {
        self.queue.list(&filter).await.map_err(map_queue_error)
    }

    async fn delete(&self, id: &QueueEntryId) -> Result<(), Error> {
        if self.queue.delete(id).await.map_err(map_queue_error)? {
            info!(entry_id = %id, "queue entry deleted");
            Ok(())
        } else {
            Err(entry_not_found(id))
        }
    }

    async fn bulk_delete(&self, ids: Vec<QueueEntryId>) -> Result<BulkDeleteOutcome, Error> {
        let mut outcome = BulkDeleteOutcome::default();
        for id in &ids {
            if self.queue.delete(id).await.map_err(map_queue_error)? {
                outcome.deleted += 1;
            } else {
                outcome.not_found += 1;
            }
        }
        info!(
            deleted = outcome.deleted,
            not_found = outcome.not_found,
            "bulk queue deletion finished"
        );
        Ok(outcome)
    }

    async fn reset_numbering(&self) -> Result<RenumberingReport, Error> {
        let queue = self.queue.list_all().await.map_err(map_queue_error)?;
        let completed: Vec<QueueEntryId> = queue
            .iter()
            .filter(|entry| entry.status == QueueStatus::Completed)
            .map(|entry| entry.id)
            .collect();
        let shadowed: HashSet<QueueEntryId> = self
            .archive
            .shadowed_among(&completed)
            .await
            .map_err(map_archive_error)?
            .into_iter()
            .collect();

        let compaction = compact(
            &queue,
            &shadowed,
            &ArchiveReason::ManualReset,
            self.clock.utc(),
        );
        if !compaction.is_empty() {
            self.queue
                .compact(&compaction)
                .await
                .map_err(map_queue_error)?;
        }

        let survivors = i32::try_from(compaction.survivors).unwrap_or(i32::MAX);
        let report = RenumberingReport {
            archived_completed: u64::try_from(compaction.removed.len()).unwrap_or(u64::MAX),
            renumbered_active: u64::try_from(compaction.survivors).unwrap_or(u64::MAX),
            next_number: survivors.saturating_add(1),
        };
        info!(
            archived_completed = report.archived_completed,
            renumbered_active = report.renumbered_active,
            "queue numbering reset"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "queue_service_tests.rs"]
mod tests;
