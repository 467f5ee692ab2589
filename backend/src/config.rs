//! Process configuration loaded via OrthoConfig.
//!
//! Every field can be supplied as an `ADMISSION_*` environment variable, a
//! CLI flag, or a configuration file key. The request timeout carries a
//! declared default; other absent values fall back to the accessor methods.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::outbox_worker::OutboxWorkerConfig;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
/// Google Sheets REST endpoint used unless overridden.
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Settings controlling the HTTP listener, storage, and the spreadsheet
/// mirror.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ADMISSION")]
pub struct AppSettings {
    /// Socket the HTTP server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string. Without it the server keeps all state
    /// in memory.
    pub database_url: Option<String>,
    /// Path to the Google service-account JSON key.
    pub credentials_path: Option<PathBuf>,
    /// Base URL of the Sheets REST API.
    pub sheets_api_base: Option<String>,
    /// Override for the OAuth token endpoint named in the credentials.
    pub token_uri: Option<String>,
    /// Timeout in seconds applied to each outbound spreadsheet request.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
    /// Outbox intents claimed per drain tick.
    pub outbox_batch_size: Option<i64>,
    /// Delivery attempts before an outbox intent is parked.
    pub outbox_max_attempts: Option<u32>,
}

impl AppSettings {
    /// Listener address, `0.0.0.0:8080` unless configured.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(SocketAddr::V4(SocketAddrV4::new(
            Ipv4Addr::UNSPECIFIED,
            DEFAULT_PORT,
        )))
    }

    /// Non-blank database URL, if any.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Service-account key location.
    #[must_use]
    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH))
    }

    /// Sheets API base URL.
    #[must_use]
    pub fn sheets_api_base(&self) -> &str {
        self.sheets_api_base
            .as_deref()
            .unwrap_or(DEFAULT_SHEETS_API_BASE)
    }

    /// Per-request timeout for spreadsheet calls.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        let secs = if self.request_timeout_secs == 0 {
            DEFAULT_REQUEST_TIMEOUT_SECS
        } else {
            self.request_timeout_secs
        };
        Duration::from_secs(secs)
    }

    /// Outbox worker configuration with overrides applied.
    #[must_use]
    pub fn outbox_worker(&self) -> OutboxWorkerConfig {
        let defaults = OutboxWorkerConfig::default();
        OutboxWorkerConfig {
            batch_size: self
                .outbox_batch_size
                .filter(|size| *size > 0)
                .unwrap_or(defaults.batch_size),
            max_attempts: self
                .outbox_max_attempts
                .filter(|attempts| *attempts > 0)
                .unwrap_or(defaults.max_attempts),
            ..defaults
        }
    }
}
