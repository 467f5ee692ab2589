//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each adapter implements one driven port from `domain::ports` on top of a
//! shared `bb8` pool of `diesel-async` connections.
//!
//! - **Thin adapters**: repositories translate between row structs and
//!   domain types. Queue rules live in the domain services.
//! - **Internal models**: `models.rs` and `schema.rs` never leak past this
//!   module.
//! - **Database-side outbox**: a trigger on `archived_queue_entries` writes
//!   `mirror_outbox` rows in the same transaction as the archive change.
//!
//! # Example
//!
//! ```ignore
//! use admission_queue::outbound::persistence::{
//!     DbPool, DieselQueueRepository, PoolConfig, run_migrations,
//! };
//!
//! run_migrations("postgres://localhost/admissions").await?;
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/admissions")).await?;
//! let queue = DieselQueueRepository::new(pool);
//! ```

mod diesel_archive_repository;
mod diesel_display_settings_repository;
mod diesel_employee_repository;
mod diesel_mirror_outbox;
mod diesel_queue_repository;
mod diesel_sync_state_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_archive_repository::DieselArchiveRepository;
pub use diesel_display_settings_repository::DieselDisplaySettingsRepository;
pub use diesel_employee_repository::DieselEmployeeRepository;
pub use diesel_mirror_outbox::DieselMirrorOutbox;
pub use diesel_queue_repository::DieselQueueRepository;
pub use diesel_sync_state_repository::DieselSyncStateRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
