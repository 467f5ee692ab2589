//! Builders wiring driven adapters into the services behind the HTTP state
//! and the outbox worker.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use admission_queue::domain::ports::{
    ArchiveRepository, DisplaySettingsRepository, EmployeeRepository, MirrorOutbox,
    QueueRepository, SpreadsheetClient, SyncStateRepository,
};
use admission_queue::domain::{
    ArchiveAdminService, DisplaySettingsService, MirrorPorts, MirrorSyncService, OutboxWorker, OutboxWorkerConfig,
    OutboxWorkerPorts, QueueLifecycleService, StaffDeskService, StaffDirectoryService,
};
use admission_queue::inbound::http::state::{HttpState, HttpStatePorts};
use admission_queue::outbound::memory::InMemoryStore;
use admission_queue::outbound::persistence::{
    DbPool, DieselArchiveRepository, DieselDisplaySettingsRepository, DieselEmployeeRepository,
    DieselMirrorOutbox, DieselQueueRepository, DieselSyncStateRepository,
};
use admission_queue::outbound::sheets::GoogleSheetsClient;

use super::ServerConfig;

/// Driven adapters shared by every service.
struct DrivenPorts<Q, A, E> {
    queue: Arc<Q>,
    archive: Arc<A>,
    employees: Arc<E>,
    display: Arc<dyn DisplaySettingsRepository>,
    sync_state: Arc<dyn SyncStateRepository>,
    outbox: Arc<dyn MirrorOutbox>,
    spreadsheet: Arc<dyn SpreadsheetClient>,
}

/// HTTP state plus the worker draining the mirror outbox.
pub(super) struct AppServices {
    pub(super) http_state: web::Data<HttpState>,
    pub(super) outbox_worker: OutboxWorker,
}

fn wire_services<Q, A, E>(
    ports: DrivenPorts<Q, A, E>,
    clock: Arc<dyn Clock>,
    outbox_config: OutboxWorkerConfig,
) -> AppServices
where
    Q: QueueRepository + 'static,
    A: ArchiveRepository + 'static,
    E: EmployeeRepository + 'static,
{
    let DrivenPorts {
        queue,
        archive,
        employees,
        display,
        sync_state,
        outbox,
        spreadsheet,
    } = ports;

    let lifecycle = Arc::new(QueueLifecycleService::new(
        Arc::clone(&queue),
        Arc::clone(&archive),
        Arc::clone(&employees),
        Arc::clone(&clock),
    ));
    let mirror = MirrorSyncService::new(
        MirrorPorts {
            archive: archive.clone() as Arc<dyn ArchiveRepository>,
            sync_state,
            outbox: Arc::clone(&outbox),
            spreadsheet,
        },
        Arc::clone(&clock),
    );

    let http_state = web::Data::new(HttpState::new(HttpStatePorts {
        visitor_queue: lifecycle.clone(),
        staff_desk: Arc::new(StaffDeskService::new(
            queue,
            Arc::clone(&employees),
            Arc::clone(&clock),
        )),
        staff_directory: Arc::new(StaffDirectoryService::new(employees, Arc::clone(&clock))),
        queue_admin: lifecycle,
        archive_admin: Arc::new(ArchiveAdminService::new(archive, Arc::clone(&clock))),
        display: Arc::new(DisplaySettingsService::new(display, Arc::clone(&clock))),
        mirror: Arc::new(mirror.clone()),
    }));
    let outbox_worker = OutboxWorker::new(
        OutboxWorkerPorts::new(outbox, Arc::new(mirror)),
        clock,
        outbox_config,
    );

    AppServices {
        http_state,
        outbox_worker,
    }
}

fn database_ports(
    pool: &DbPool,
    spreadsheet: Arc<dyn SpreadsheetClient>,
) -> DrivenPorts<DieselQueueRepository, DieselArchiveRepository, DieselEmployeeRepository> {
    DrivenPorts {
        queue: Arc::new(DieselQueueRepository::new(pool.clone())),
        archive: Arc::new(DieselArchiveRepository::new(pool.clone())),
        employees: Arc::new(DieselEmployeeRepository::new(pool.clone())),
        display: Arc::new(DieselDisplaySettingsRepository::new(pool.clone())),
        sync_state: Arc::new(DieselSyncStateRepository::new(pool.clone())),
        outbox: Arc::new(DieselMirrorOutbox::new(pool.clone())),
        spreadsheet,
    }
}

fn memory_ports(
    store: &Arc<InMemoryStore>,
    spreadsheet: Arc<dyn SpreadsheetClient>,
) -> DrivenPorts<InMemoryStore, InMemoryStore, InMemoryStore> {
    DrivenPorts {
        queue: Arc::clone(store),
        archive: Arc::clone(store),
        employees: Arc::clone(store),
        display: store.clone(),
        sync_state: store.clone(),
        outbox: store.clone(),
        spreadsheet,
    }
}

pub(super) fn build_with_spreadsheet(
    config: &ServerConfig,
    spreadsheet: Arc<dyn SpreadsheetClient>,
    clock: Arc<dyn Clock>,
) -> AppServices {
    match &config.db_pool {
        Some(pool) => wire_services(
            database_ports(pool, spreadsheet),
            clock,
            config.outbox.clone(),
        ),
        None => {
            let store = Arc::new(InMemoryStore::new(Arc::clone(&clock)));
            wire_services(
                memory_ports(&store, spreadsheet),
                clock,
                config.outbox.clone(),
            )
        }
    }
}

/// Build services over PostgreSQL when a pool is configured, otherwise over
/// the in-memory store.
///
/// # Errors
/// Returns [`std::io::Error`] when the spreadsheet HTTP client cannot be
/// constructed.
pub(super) fn build_services(config: &ServerConfig) -> std::io::Result<AppServices> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let spreadsheet = GoogleSheetsClient::new(config.sheets.clone(), Arc::clone(&clock))
        .map_err(|err| std::io::Error::other(format!("spreadsheet client: {err}")))?;
    Ok(build_with_spreadsheet(config, Arc::new(spreadsheet), clock))
}
