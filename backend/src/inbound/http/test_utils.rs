//! Test helpers for inbound HTTP handlers.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::ports::{
    MockArchiveAdministration, MockDisplayAdministration, MockMirrorControl,
    MockQueueAdministration, MockStaffDesk, MockStaffDirectory, MockVisitorQueue,
};
use crate::domain::{Employee, EmployeeId, EmployeeStatus, QueueEntry, QueueEntryId, QueueStatus};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Mocked driving ports; set expectations, then build an app.
#[derive(Default)]
pub struct MockPorts {
    pub visitor_queue: MockVisitorQueue,
    pub staff_desk: MockStaffDesk,
    pub staff_directory: MockStaffDirectory,
    pub queue_admin: MockQueueAdministration,
    pub archive_admin: MockArchiveAdministration,
    pub display: MockDisplayAdministration,
    pub mirror: MockMirrorControl,
}

impl MockPorts {
    fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            visitor_queue: Arc::new(self.visitor_queue),
            staff_desk: Arc::new(self.staff_desk),
            staff_directory: Arc::new(self.staff_directory),
            queue_admin: Arc::new(self.queue_admin),
            archive_admin: Arc::new(self.archive_admin),
            display: Arc::new(self.display),
            mirror: Arc::new(self.mirror),
        })
    }

    /// App with every API route mounted under `/api/v1`.
    pub fn into_app(
        self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.into_state()))
            .service(web::scope("/api/v1").configure(super::configure_api))
    }
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub fn sample_entry(number: i32, status: QueueStatus) -> QueueEntry {
    QueueEntry {
        id: QueueEntryId::random(),
        queue_number: number,
        full_name: "Aigerim Nurlanovna".to_owned(),
        phone: "+77010000000".to_owned(),
        programs: vec!["Law".to_owned()],
        status,
        notes: None,
        assigned_employee_id: None,
        assigned_employee_name: None,
        created_at: fixed_now(),
        updated_at: fixed_now(),
        processing_time: None,
        form_language: None,
    }
}

pub fn sample_employee(status: EmployeeStatus) -> Employee {
    Employee {
        id: EmployeeId::random(),
        full_name: "B. Serikova".to_owned(),
        desk: Some("3".to_owned()),
        status,
        created_at: fixed_now(),
    }
}
