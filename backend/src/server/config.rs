//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use admission_queue::domain::OutboxWorkerConfig;
use admission_queue::outbound::persistence::DbPool;
use admission_queue::outbound::sheets::SheetsClientConfig;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) sheets: SheetsClientConfig,
    pub(crate) outbox: OutboxWorkerConfig,
}

impl ServerConfig {
    /// Construct a configuration that keeps state in memory until a pool is
    /// attached.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        sheets: SheetsClientConfig,
        outbox: OutboxWorkerConfig,
    ) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            sheets,
            outbox,
        }
    }

    /// Attach a database connection pool for the persistence adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
