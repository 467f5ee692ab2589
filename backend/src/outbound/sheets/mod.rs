//! Google Sheets outbound adapter.
//!
//! Implements the `SpreadsheetClient` port over the Sheets v4 REST API,
//! authenticating as a service account.

mod credentials;
mod dto;
mod errors;
mod http_client;
mod token;

pub use credentials::ServiceAccountKey;
pub use http_client::{GoogleSheetsClient, SheetsClientConfig};
