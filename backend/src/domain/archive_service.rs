//! Archive administration service.
//!
//! Deleting archive rows is what removes them from the spreadsheet mirror:
//! the store records an outbox intent for every deleted row.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    ArchiveAdministration, ArchiveRepository, BulkDeleteOutcome, CLEANUP_PREVIEW_LIMIT,
    CleanupPreview, CleanupReport, CleanupRequest,
};
use crate::domain::queue_service::map_archive_error;
use crate::domain::{ArchiveCleanup, ArchiveFilter, ArchivedQueueEntry, Error};

/// Service implementing [`ArchiveAdministration`].
#[derive(Clone)]
pub struct ArchiveAdminService<A> {
    archive: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<A> ArchiveAdminService<A> {
    /// Create the service over the archive repository.
    pub fn new(archive: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self { archive, clock }
    }

    fn selection(&self, request: CleanupRequest) -> Result<(ArchiveCleanup, DateTime<Utc>), Error> {
        if request.days_old < 0 {
            return Err(Error::invalid_request("daysOld must not be negative")
                .with_details(json!({ "field": "daysOld", "code": "negative" })));
        }
        let cutoff = Duration::try_days(request.days_old)
            .and_then(|age| self.clock.utc().checked_sub_signed(age))
            .ok_or_else(|| {
                Error::invalid_request("daysOld is out of range")
                    .with_details(json!({ "field": "daysOld", "code": "out_of_range" }))
            })?;
        Ok((
            ArchiveCleanup {
                archived_before: cutoff,
                status: request.status,
            },
            cutoff,
        ))
    }
}

#[async_trait]
impl<A> ArchiveAdministration for ArchiveAdminService<A>
where
    A: ArchiveRepository,
{
    async fn list(&self, filter: ArchiveFilter) -> Result<Vec<ArchivedQueueEntry>, Error> {
        self.archive.list(&filter).await.map_err(map_archive_error)
    }

    async fn cleanup(&self, request: CleanupRequest) -> Result<CleanupReport, Error> {
        let (cleanup, cutoff) = self.selection(request)?;
        let deleted = self
            .archive
            .delete_cleanup(&cleanup)
            .await
            .map_err(map_archive_error)?;
        info!(deleted, %cutoff, days_old = request.days_old, "archive cleanup finished");
        Ok(CleanupReport { deleted, cutoff })
    }

    async fn preview_cleanup(&self, request: CleanupRequest) -> Result<CleanupPreview, Error> {
        let (cleanup, cutoff) = self.selection(request)?;
        let count = self
            .archive
            .count_cleanup(&cleanup)
            .await
            .map_err(map_archive_error)?;
        let candidates = self
            .archive
            .cleanup_candidates(&cleanup, CLEANUP_PREVIEW_LIMIT)
            .await
            .map_err(map_archive_error)?;
        Ok(CleanupPreview {
            count,
            cutoff,
            candidates,
        })
    }

    async fn delete(&self, id: &Uuid) -> Result<(), Error> {
        let deleted = self
            .archive
            .delete_by_id_or_original(id)
            .await
            .map_err(map_archive_error)?;
        if deleted == 0 {
            return Err(Error::not_found(format!("archive entry {id} not found")));
        }
        info!(archive_id = %id, deleted, "archive entry deleted");
        Ok(())
    }

    async fn bulk_delete(&self, ids: Vec<Uuid>) -> Result<BulkDeleteOutcome, Error> {
        let mut outcome = BulkDeleteOutcome::default();
        for id in &ids {
            let deleted = self
                .archive
                .delete_by_id_or_original(id)
                .await
                .map_err(map_archive_error)?;
            if deleted == 0 {
                outcome.not_found += 1;
            } else {
                outcome.deleted += deleted;
            }
        }
        info!(
            deleted = outcome.deleted,
            not_found = outcome.not_found,
            "bulk archive deletion finished"
        );
        Ok(outcome)
    }
}
