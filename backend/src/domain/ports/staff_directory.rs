//! Driving port for managing admission staff records.

use async_trait::async_trait;

use crate::domain::{Employee, EmployeeId, EmployeeStatus, Error};

/// Request to register an employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployeeRequest {
    pub full_name: String,
    pub desk: Option<String>,
}

/// Partial employee update; a blank desk clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeUpdateRequest {
    pub full_name: Option<String>,
    pub desk: Option<String>,
    pub status: Option<EmployeeStatus>,
}

/// Staff administration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    /// Every employee, ordered by name.
    async fn list(&self) -> Result<Vec<Employee>, Error>;

    /// Register a new employee, initially offline.
    async fn create(&self, request: NewEmployeeRequest) -> Result<Employee, Error>;

    /// Apply a partial update.
    async fn update(
        &self,
        id: &EmployeeId,
        request: EmployeeUpdateRequest,
    ) -> Result<Employee, Error>;

    /// Remove an employee.
    async fn delete(&self, id: &EmployeeId) -> Result<(), Error>;
}
