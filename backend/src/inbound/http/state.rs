//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ArchiveAdministration, DisplayAdministration, MirrorControl, QueueAdministration, StaffDesk,
    StaffDirectory, VisitorQueue,
};

/// Parameter object bundling the port implementations used by handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub visitor_queue: Arc<dyn VisitorQueue>,
    pub staff_desk: Arc<dyn StaffDesk>,
    pub staff_directory: Arc<dyn StaffDirectory>,
    pub queue_admin: Arc<dyn QueueAdministration>,
    pub archive_admin: Arc<dyn ArchiveAdministration>,
    pub display: Arc<dyn DisplayAdministration>,
    pub mirror: Arc<dyn MirrorControl>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub visitor_queue: Arc<dyn VisitorQueue>,
    pub staff_desk: Arc<dyn StaffDesk>,
    pub staff_directory: Arc<dyn StaffDirectory>,
    pub queue_admin: Arc<dyn QueueAdministration>,
    pub archive_admin: Arc<dyn ArchiveAdministration>,
    pub display: Arc<dyn DisplayAdministration>,
    pub mirror: Arc<dyn MirrorControl>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use admission_queue::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// fn wire(ports: HttpStatePorts) -> HttpState {
    ///     let state = HttpState::new(ports);
    ///     let _queue = Arc::clone(&state.visitor_queue);
    ///     state
    /// }
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            visitor_queue,
            staff_desk,
            staff_directory,
            queue_admin,
            archive_admin,
            display,
            mirror,
        } = ports;
        Self {
            visitor_queue,
            staff_desk,
            staff_directory,
            queue_admin,
            archive_admin,
            display,
            mirror,
        }
    }
}
