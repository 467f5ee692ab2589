//! Staff administration service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    EmployeeRepository, EmployeeUpdateRequest, NewEmployeeRequest, StaffDirectory,
};
use crate::domain::queue_service::map_employee_error;
use crate::domain::{Employee, EmployeeId, EmployeeStatus, Error};

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn not_found(id: &EmployeeId) -> Error {
    Error::not_found(format!("employee {id} not found"))
}

/// Service implementing [`StaffDirectory`].
#[derive(Clone)]
pub struct StaffDirectoryService<E> {
    employees: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<E> StaffDirectoryService<E> {
    /// Create the service over the employee repository.
    pub fn new(employees: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self { employees, clock }
    }
}

#[async_trait]
impl<E> StaffDirectory for StaffDirectoryService<E>
where
    E: EmployeeRepository,
{
    async fn list(&self) -> Result<Vec<Employee>, Error> {
        self.employees.list().await.map_err(map_employee_error)
    }

    async fn create(&self, request: NewEmployeeRequest) -> Result<Employee, Error> {
        let full_name = request.full_name.trim();
        if full_name.is_empty() {
            return Err(Error::invalid_request("fullName must not be empty")
                .with_details(json!({ "field": "fullName", "code": "empty" })));
        }
        let employee = Employee {
            id: EmployeeId::random(),
            full_name: full_name.to_owned(),
            desk: blank_to_none(request.desk),
            status: EmployeeStatus::Offline,
            created_at: self.clock.utc(),
        };
        self.employees
            .insert(&employee)
            .await
            .map_err(map_employee_error)?;
        info!(employee_id = %employee.id, "employee created");
        Ok(employee)
    }

    async fn update(
        &self,
        id: &EmployeeId,
        request: EmployeeUpdateRequest,
    ) -> Result<Employee, Error> {
        let mut employee = self
            .employees
            .find_by_id(id)
            .await
            .map_err(map_employee_error)?
            .ok_or_else(|| not_found(id))?;

        if let Some(full_name) = request.full_name {
            let trimmed = full_name.trim();
            if trimmed.is_empty() {
                return Err(Error::invalid_request("fullName must not be empty")
                    .with_details(json!({ "field": "fullName", "code": "empty" })));
            }
            trimmed.clone_into(&mut employee.full_name);
        }
        if request.desk.is_some() {
            employee.desk = blank_to_none(request.desk);
        }
        if let Some(status) = request.status {
            employee.status = status;
        }

        if !self
            .employees
            .update(&employee)
            .await
            .map_err(map_employee_error)?
        {
            return Err(not_found(id));
        }
        Ok(employee)
    }

    async fn delete(&self, id: &EmployeeId) -> Result<(), Error> {
        if self.employees.delete(id).await.map_err(map_employee_error)? {
            info!(employee_id = %id, "employee deleted");
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockEmployeeRepository;
    use crate::test_support::MutableClock;

    fn service(repo: MockEmployeeRepository) -> StaffDirectoryService<MockEmployeeRepository> {
        StaffDirectoryService::new(Arc::new(repo), Arc::new(MutableClock::new(Utc::now())))
    }

    #[rstest]
    #[tokio::test]
    async fn create_trims_and_starts_offline() {
        let mut repo = MockEmployeeRepository::new();
        repo.expect_insert()
            .withf(|e| e.full_name == "B. Serikova" && e.desk.is_none())
            .times(1)
            .return_once(|_| Ok(()));

        let created = service(repo)
            .create(NewEmployeeRequest {
                full_name: "  B. Serikova ".to_owned(),
                desk: Some("   ".to_owned()),
            })
            .await
            .expect("create succeeds");
        assert_eq!(created.status, EmployeeStatus::Offline);
    }

    #[rstest]
    #[tokio::test]
    async fn blank_name_is_rejected() {
        let err = service(MockEmployeeRepository::new())
            .create(NewEmployeeRequest {
                full_name: " ".to_owned(),
                desk: None,
            })
            .await
            .expect_err("blank name");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn update_applies_present_fields() {
        let existing = Employee {
            id: EmployeeId::random(),
            full_name: "Old".to_owned(),
            desk: Some("Desk 1".to_owned()),
            status: EmployeeStatus::Offline,
            created_at: Utc::now(),
        };
        let mut repo = MockEmployeeRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(existing)));
        repo.expect_update().return_once(|_| Ok(true));

        let updated = service(repo)
            .update(
                &EmployeeId::random(),
                EmployeeUpdateRequest {
                    full_name: None,
                    desk: Some("Desk 5".to_owned()),
                    status: Some(EmployeeStatus::Available),
                },
            )
            .await
            .expect("update succeeds");
        assert_eq!(updated.full_name, "Old");
        assert_eq!(updated.desk.as_deref(), Some("Desk 5"));
        assert_eq!(updated.status, EmployeeStatus::Available);
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_unknown_employee_is_not_found() {
        let mut repo = MockEmployeeRepository::new();
        repo.expect_delete().return_once(|_| Ok(false));
        let err = service(repo)
            .delete(&EmployeeId::random())
            .await
            .expect_err("missing employee");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
