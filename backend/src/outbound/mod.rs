//! Outbound adapters implementing the driven domain ports.
//!
//! - **persistence**: PostgreSQL repositories and the mirror outbox using
//!   Diesel with diesel-async.
//! - **sheets**: Google Sheets v4 REST client behind
//!   [`crate::domain::ports::SpreadsheetClient`].
//! - **memory**: in-process store used when no database is configured and by
//!   tests.
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod persistence;
pub mod sheets;
