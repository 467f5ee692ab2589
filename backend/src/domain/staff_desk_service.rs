//! Desk workflow for admission staff.
//!
//! Each transition that touches an applicant commits the entry, its shadow,
//! and the employee's new status together.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    CallNextOutcome, DeskStatus, EmployeeRepository, EntryChanges, QueueRepository, StaffDesk,
};
use crate::domain::queue_service::{
    commit_update, entry_not_found, map_employee_error, map_queue_error,
};
use crate::domain::{
    Assignee, Employee, EmployeeId, EmployeeStatus, EmployeeStatusChange, EntryUpdate, Error,
    QueueEntry, QueueEntryId, QueueEntryPatch, QueueFilter, QueueStatus,
};

/// Service implementing [`StaffDesk`].
#[derive(Clone)]
pub struct StaffDeskService<Q, E> {
    queue: Arc<Q>,
    employees: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<Q, E> StaffDeskService<Q, E> {
    /// Create the service over the queue and staff repositories.
    pub fn new(queue: Arc<Q>, employees: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self {
            queue,
            employees,
            clock,
        }
    }
}

impl<Q, E> StaffDeskService<Q, E>
where
    Q: QueueRepository,
    E: EmployeeRepository,
{
    async fn employee(&self, id: &EmployeeId) -> Result<Employee, Error> {
        self.employees
            .find_by_id(id)
            .await
            .map_err(map_employee_error)?
            .ok_or_else(|| Error::not_found(format!("employee {id} not found")))
    }

    async fn set_status(
        &self,
        mut employee: Employee,
        status: EmployeeStatus,
    ) -> Result<Employee, Error> {
        employee.status = status;
        if !self
            .employees
            .update(&employee)
            .await
            .map_err(map_employee_error)?
        {
            return Err(Error::not_found(format!("employee {} not found", employee.id)));
        }
        info!(employee_id = %employee.id, status = %status, "employee status changed");
        Ok(employee)
    }

    async fn assigned(
        &self,
        employee_id: &EmployeeId,
        status: Option<QueueStatus>,
    ) -> Result<Vec<QueueEntry>, Error> {
        let filter = QueueFilter {
            status,
            assigned_employee_id: Some(*employee_id),
            ..QueueFilter::default()
        };
        self.queue.list(&filter).await.map_err(map_queue_error)
    }

    async fn current_entry(&self, employee_id: &EmployeeId) -> Result<Option<QueueEntry>, Error> {
        Ok(self
            .assigned(employee_id, Some(QueueStatus::InProgress))
            .await?
            .into_iter()
            .next())
    }

    /// Complete `entry` and move its employee to `status` in one commit.
    async fn finish_entry(
        &self,
        mut entry: QueueEntry,
        employee: &mut Employee,
        status: EmployeeStatus,
    ) -> Result<QueueEntry, Error> {
        let shadow = entry.apply_patch(
            QueueEntryPatch::status(QueueStatus::Completed),
            self.clock.utc(),
        );
        let completed = commit_update(
            self.queue.as_ref(),
            EntryUpdate {
                entry,
                shadow,
                employee: Some(EmployeeStatusChange {
                    employee_id: employee.id,
                    status,
                }),
            },
        )
        .await?;
        employee.status = status;
        info!(
            entry_id = %completed.id,
            employee_id = %employee.id,
            processing_time = completed.processing_time,
            "applicant completed"
        );
        Ok(completed)
    }
}

#[async_trait]
impl<Q, E> StaffDesk for StaffDeskService<Q, E>
where
    Q: QueueRepository,
    E: EmployeeRepository,
{
    async fn start_work(&self, employee_id: &EmployeeId) -> Result<Employee, Error> {
        let employee = self.employee(employee_id).await?;
        self.set_status(employee, EmployeeStatus::Available).await
    }

    async fn pause_work(&self, employee_id: &EmployeeId) -> Result<Employee, Error> {
        let employee = self.employee(employee_id).await?;
        self.set_status(employee, EmployeeStatus::Paused).await
    }

    async fn resume_work(&self, employee_id: &EmployeeId) -> Result<Employee, Error> {
        let employee = self.employee(employee_id).await?;
        self.set_status(employee, EmployeeStatus::Available).await
    }

    async fn finish_work(&self, employee_id: &EmployeeId) -> Result<Employee, Error> {
        let mut employee = self.employee(employee_id).await?;
        if employee.status == EmployeeStatus::Busy {
            if let Some(current) = self.current_entry(employee_id).await? {
                self.finish_entry(current, &mut employee, EmployeeStatus::Offline)
                    .await?;
                return Ok(employee);
            }
        }
        self.set_status(employee, EmployeeStatus::Offline).await
    }

    async fn call_next(&self, employee_id: &EmployeeId) -> Result<CallNextOutcome, Error> {
        let employee = self.employee(employee_id).await?;
        if employee.status != EmployeeStatus::Available {
            return Err(Error::invalid_request(
                "employee must be available to call the next applicant",
            ));
        }

        let Some(mut next) = self
            .assigned(employee_id, Some(QueueStatus::Waiting))
            .await?
            .into_iter()
            .min_by_key(|entry| entry.queue_number)
        else {
            return Ok(CallNextOutcome::EmptyQueue);
        };

        let shadow = next.apply_patch(
            QueueEntryPatch::status(QueueStatus::InProgress),
            self.clock.utc(),
        );
        let called = commit_update(
            self.queue.as_ref(),
            EntryUpdate {
                entry: next,
                shadow,
                employee: Some(EmployeeStatusChange {
                    employee_id: employee.id,
                    status: EmployeeStatus::Busy,
                }),
            },
        )
        .await?;
        info!(entry_id = %called.id, employee_id = %employee.id, "applicant called");
        Ok(CallNextOutcome::Called(called))
    }

    async fn complete_current(&self, employee_id: &EmployeeId) -> Result<Employee, Error> {
        let mut employee = self.employee(employee_id).await?;
        if employee.status != EmployeeStatus::Busy {
            return Err(Error::invalid_request(
                "employee must be busy with an applicant to complete one",
            ));
        }
        match self.current_entry(employee_id).await? {
            Some(current) => {
                self.finish_entry(current, &mut employee, EmployeeStatus::Available)
                    .await?;
                Ok(employee)
            }
            None => self.set_status(employee, EmployeeStatus::Available).await,
        }
    }

    async fn status(&self, employee_id: &EmployeeId) -> Result<DeskStatus, Error> {
        let employee = self.employee(employee_id).await?;
        let assigned = self.assigned(employee_id, None).await?;
        let current = assigned
            .iter()
            .find(|entry| entry.status == QueueStatus::InProgress)
            .cloned();
        let waiting = assigned
            .iter()
            .filter(|entry| entry.status == QueueStatus::Waiting)
            .count();
        Ok(DeskStatus {
            employee,
            current,
            waiting: u64::try_from(waiting).unwrap_or(u64::MAX),
        })
    }

    async fn assigned_queue(
        &self,
        employee_id: &EmployeeId,
        status: Option<QueueStatus>,
    ) -> Result<Vec<QueueEntry>, Error> {
        self.employee(employee_id).await?;
        self.assigned(employee_id, status).await
    }

    async fn update_entry(
        &self,
        entry_id: &QueueEntryId,
        changes: EntryChanges,
    ) -> Result<QueueEntry, Error> {
        let mut entry = self
            .queue
            .find_by_id(entry_id)
            .await
            .map_err(map_queue_error)?
            .ok_or_else(|| entry_not_found(entry_id))?;

        let assignee = match changes.assigned_employee_id {
            Some(id) => Some(Assignee::from(&self.employee(&id).await?)),
            None => None,
        };
        let patch = QueueEntryPatch {
            full_name: changes.full_name,
            phone: changes.phone,
            programs: changes.programs,
            status: changes.status,
            notes: changes.notes,
            assignee,
            queue_number: None,
            form_language: changes.form_language,
        };
        let shadow = entry.apply_patch(patch, self.clock.utc());
        commit_update(
            self.queue.as_ref(),
            EntryUpdate {
                entry,
                shadow,
                employee: None,
            },
        )
        .await
    }

    async fn delete_entry(&self, entry_id: &QueueEntryId) -> Result<(), Error> {
        if self.queue.delete(entry_id).await.map_err(map_queue_error)? {
            info!(entry_id = %entry_id, "queue entry deleted by staff");
            Ok(())
        } else {
            Err(entry_not_found(entry_id))
        }
    }
}
