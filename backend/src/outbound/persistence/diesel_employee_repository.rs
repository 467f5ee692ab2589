//! PostgreSQL-backed `EmployeeRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{EmployeeRepository, EmployeeRepositoryError};
use crate::domain::{Employee, EmployeeId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::EmployeeRow;
use super::pool::{DbPool, PoolError};
use super::schema::employees;

/// Diesel-backed implementation of the `EmployeeRepository` port.
#[derive(Clone)]
pub struct DieselEmployeeRepository {
    pool: DbPool,
}

impl DieselEmployeeRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> EmployeeRepositoryError {
    map_pool_error(error, EmployeeRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> EmployeeRepositoryError {
    map_diesel_error(
        error,
        EmployeeRepositoryError::query,
        EmployeeRepositoryError::connection,
    )
}

#[async_trait]
impl EmployeeRepository for DieselEmployeeRepository {
    async fn list(&self) -> Result<Vec<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<EmployeeRow> = employees::table
            .order(employees::full_name.asc())
            .select(EmployeeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter()
            .map(|row| Employee::try_from(row).map_err(EmployeeRepositoryError::query))
            .collect()
    }

    async fn find_by_id(
        &self,
        id: &EmployeeId,
    ) -> Result<Option<Employee>, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<EmployeeRow> = employees::table
            .find(id.as_uuid())
            .select(EmployeeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(Employee::try_from)
            .transpose()
            .map_err(EmployeeRepositoryError::query)
    }

    async fn insert(&self, employee: &Employee) -> Result<(), EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(employees::table)
            .values(EmployeeRow::from(employee))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn update(&self, employee: &Employee) -> Result<bool, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::update(employees::table.find(employee.id.as_uuid()))
            .set(EmployeeRow::from(employee))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &EmployeeId) -> Result<bool, EmployeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        // The foreign key clears queue_entries.assigned_employee_id.
        let deleted = diesel::delete(employees::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(deleted > 0)
    }
}
