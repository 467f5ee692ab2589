//! Embedded schema migrations applied at start-up.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use thiserror::Error;
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failures raised while bringing the schema up to date.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("migration connection failed: {0}")]
    Connection(String),
    /// A pending migration failed to apply.
    #[error("migration failed: {0}")]
    Apply(String),
    /// The blocking migration task was cancelled or panicked.
    #[error("migration task aborted: {0}")]
    Task(String),
}

/// Apply every pending migration against `database_url`.
///
/// Diesel's migration harness is synchronous, so the work runs on the
/// blocking pool.
pub async fn run_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || -> Result<usize, MigrationError> {
        let mut conn = PgConnection::establish(&url)
            .map_err(|err| MigrationError::Connection(err.to_string()))?;
        let versions = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| MigrationError::Apply(err.to_string()))?;
        Ok(versions.len())
    })
    .await
    .map_err(|err| MigrationError::Task(err.to_string()))??;

    info!(applied, "database migrations applied");
    Ok(applied)
}
