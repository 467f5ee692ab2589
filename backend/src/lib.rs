//! Admissions queue backend.
//!
//! Applicants join a numbered queue from a kiosk or phone, admission staff
//! call them to their desks, and administrators maintain staff, the queue,
//! and its archive. Every archive change is mirrored to a Google Sheet by a
//! background outbox worker.
//!
//! The crate is laid out hexagonally: [`domain`] holds the model, services,
//! and ports; [`inbound`] adapts HTTP requests onto the driving ports;
//! [`outbound`] implements the driven ports over PostgreSQL and the Sheets
//! REST API.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
