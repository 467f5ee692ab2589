//! Port for staff records.

use async_trait::async_trait;

use crate::domain::{Employee, EmployeeId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by employee repository adapters.
    pub enum EmployeeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "employee repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "employee repository query failed: {message}",
    }
}

/// Port for employee persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// All employees ordered by name.
    async fn list(&self) -> Result<Vec<Employee>, EmployeeRepositoryError>;

    /// Find an employee by id.
    async fn find_by_id(&self, id: &EmployeeId)
    -> Result<Option<Employee>, EmployeeRepositoryError>;

    /// Insert a new employee.
    async fn insert(&self, employee: &Employee) -> Result<(), EmployeeRepositoryError>;

    /// Overwrite an existing employee. Returns whether it existed.
    async fn update(&self, employee: &Employee) -> Result<bool, EmployeeRepositoryError>;

    /// Delete an employee. Queue entries keep the name they were assigned
    /// but lose the id reference.
    async fn delete(&self, id: &EmployeeId) -> Result<bool, EmployeeRepositoryError>;
}
