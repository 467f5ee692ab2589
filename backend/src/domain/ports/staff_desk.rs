//! Driving port for admission staff working their desk.

use async_trait::async_trait;

use crate::domain::{Employee, EmployeeId, Error, QueueEntry, QueueEntryId, QueueStatus};

/// Partial entry update requested by staff. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryChanges {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub programs: Option<Vec<String>>,
    pub status: Option<QueueStatus>,
    pub notes: Option<String>,
    /// Reassign the entry to another employee.
    pub assigned_employee_id: Option<EmployeeId>,
    pub form_language: Option<String>,
}

/// Result of asking for the next applicant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallNextOutcome {
    /// The applicant now in progress at the desk.
    Called(QueueEntry),
    /// Nobody assigned to the employee is waiting.
    EmptyQueue,
}

/// Snapshot of an employee's desk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskStatus {
    pub employee: Employee,
    /// Entry currently in progress at the desk.
    pub current: Option<QueueEntry>,
    /// Waiting entries assigned to the employee.
    pub waiting: u64,
}

/// Operations an employee performs on their own desk.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StaffDesk: Send + Sync {
    /// Go online and start taking applicants.
    async fn start_work(&self, employee_id: &EmployeeId) -> Result<Employee, Error>;

    /// Leave the rotation temporarily.
    async fn pause_work(&self, employee_id: &EmployeeId) -> Result<Employee, Error>;

    /// Return to the rotation after a pause.
    async fn resume_work(&self, employee_id: &EmployeeId) -> Result<Employee, Error>;

    /// Go offline, completing the applicant in progress if any.
    async fn finish_work(&self, employee_id: &EmployeeId) -> Result<Employee, Error>;

    /// Call the lowest-numbered waiting applicant assigned to the employee.
    async fn call_next(&self, employee_id: &EmployeeId) -> Result<CallNextOutcome, Error>;

    /// Complete the applicant in progress at the desk and become available.
    async fn complete_current(&self, employee_id: &EmployeeId) -> Result<Employee, Error>;

    /// Current desk state.
    async fn status(&self, employee_id: &EmployeeId) -> Result<DeskStatus, Error>;

    /// Entries assigned to the employee, optionally filtered by status.
    async fn assigned_queue(
        &self,
        employee_id: &EmployeeId,
        status: Option<QueueStatus>,
    ) -> Result<Vec<QueueEntry>, Error>;

    /// Partially update an entry.
    async fn update_entry(
        &self,
        entry_id: &QueueEntryId,
        changes: EntryChanges,
    ) -> Result<QueueEntry, Error>;

    /// Remove an entry from the queue; its archive row stays.
    async fn delete_entry(&self, entry_id: &QueueEntryId) -> Result<(), Error>;
}
