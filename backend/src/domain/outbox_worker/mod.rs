//! Background delivery of archive changes to the spreadsheet mirror.
//!
//! The store appends an intent to the outbox in the same transaction as
//! every archive insert, update, or delete. The worker claims due intents on
//! a fixed interval and replays them against the mirror: upserts row by row,
//! and any batch holding a delete as one full resync. Failed intents are
//! rescheduled with jittered exponential backoff and parked once they run
//! out of attempts, so delivery is at least once.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::mirror::{MirrorOutcome, MirrorSyncService, SyncSettings, map_outbox_error};
use crate::domain::ports::{MirrorOutbox, OutboxFailure, OutboxIntent, OutboxOperation};
use crate::domain::{ArchiveEntryId, Error, TraceId};

mod runtime;

pub use runtime::{AttemptJitter, OutboxWorkerPorts, OutboxWorkerRuntime, TokioSleeper};

/// Fixed interval between drain ticks.
pub const DRAIN_INTERVAL: Duration = Duration::from_secs(10);

/// Worker configuration controlling batching and retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxWorkerConfig {
    /// Pause between drain ticks.
    pub poll_interval: Duration,
    /// Maximum intents claimed per tick.
    pub batch_size: i64,
    /// Delivery attempts before an intent is parked as failed.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Retry delay cap.
    pub max_backoff: Duration,
}

impl Default for OutboxWorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DRAIN_INTERVAL,
            batch_size: 100,
            max_attempts: 8,
            initial_backoff: Duration::from_secs(10),
            max_backoff: Duration::from_secs(600),
        }
    }
}

/// Summary of one drain tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Mirroring was disabled or unconfigured; nothing was claimed.
    pub skipped: bool,
    /// Intents claimed this tick.
    pub claimed: usize,
    /// Intents settled as delivered.
    pub delivered: usize,
    /// Intents rescheduled for another attempt.
    pub rescheduled: usize,
    /// Intents parked after exhausting their attempts.
    pub parked: usize,
    /// The batch was reconciled with a full resync.
    pub full_resync: bool,
}

/// Mirror operations the worker replays intents against.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchiveMirror: Send + Sync {
    /// Current mirror settings.
    async fn settings(&self) -> Result<SyncSettings, Error>;

    /// Rewrite the whole sheet from the archive.
    async fn full_resync(&self) -> Result<MirrorOutcome, Error>;

    /// Bring one archive row up to date in the sheet.
    async fn upsert(&self, id: &ArchiveEntryId) -> Result<MirrorOutcome, Error>;
}

#[async_trait]
impl ArchiveMirror for MirrorSyncService {
    async fn settings(&self) -> Result<SyncSettings, Error> {
        self.load_settings().await
    }

    async fn full_resync(&self) -> Result<MirrorOutcome, Error> {
        MirrorSyncService::full_resync(self).await
    }

    async fn upsert(&self, id: &ArchiveEntryId) -> Result<MirrorOutcome, Error> {
        MirrorSyncService::upsert(self, id).await
    }
}

/// Async sleeping abstraction for the poll loop.
#[async_trait]
pub trait OutboxSleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Retry backoff jitter abstraction.
pub trait BackoffJitter: Send + Sync {
    /// Return a jittered delay from the exponential base delay.
    ///
    /// ```rust
    /// use admission_queue::domain::outbox_worker::BackoffJitter;
    /// use chrono::{TimeZone, Utc};
    /// use std::time::Duration;
    /// struct FixedJitter;
    /// impl BackoffJitter for FixedJitter {
    ///     fn jittered_delay(&self, base: Duration, _attempt: u32, _now: chrono::DateTime<Utc>) -> Duration {
    ///         base + Duration::from_secs(1)
    ///     }
    /// }
    /// let now = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).single().expect("valid time");
    /// let delay = FixedJitter.jittered_delay(Duration::from_secs(10), 1, now);
    /// assert_eq!(delay, Duration::from_secs(11));
    /// ```
    fn jittered_delay(&self, base: Duration, attempt: u32, now: DateTime<Utc>) -> Duration;
}

/// Drains the mirror outbox.
pub struct OutboxWorker {
    outbox: Arc<dyn MirrorOutbox>,
    mirror: Arc<dyn ArchiveMirror>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn OutboxSleeper>,
    jitter: Arc<dyn BackoffJitter>,
    config: OutboxWorkerConfig,
}

impl OutboxWorker {
    /// Build a worker using default runtime dependencies.
    pub fn new(ports: OutboxWorkerPorts, clock: Arc<dyn Clock>, config: OutboxWorkerConfig) -> Self {
        Self::with_runtime(ports, clock, OutboxWorkerRuntime::default(), config)
    }

    /// Build a worker with injected runtime abstractions.
    pub fn with_runtime(
        ports: OutboxWorkerPorts,
        clock: Arc<dyn Clock>,
        runtime: OutboxWorkerRuntime,
        config: OutboxWorkerConfig,
    ) -> Self {
        Self {
            outbox: ports.outbox,
            mirror: ports.mirror,
            clock,
            sleeper: runtime.sleeper,
            jitter: runtime.jitter,
            config,
        }
    }

    /// Drain until `shutdown` resolves. A failed tick is logged and the loop
    /// carries on with the next one.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);
        loop {
            match TraceId::scope(TraceId::generate(), self.run_once()).await {
                Ok(report) if report.claimed > 0 => info!(
                    claimed = report.claimed,
                    delivered = report.delivered,
                    rescheduled = report.rescheduled,
                    parked = report.parked,
                    full_resync = report.full_resync,
                    "outbox drained"
                ),
                Ok(_) => {}
                Err(error) => warn!(%error, "outbox drain failed"),
            }
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                () = self.sleeper.sleep(self.config.poll_interval) => {}
            }
        }
        info!("outbox worker stopped");
    }

    /// Run one drain tick.
    ///
    /// # Errors
    /// Fails when the outbox, settings, or archive cannot be read. Intents
    /// not settled before the failure stay pending.
    pub async fn run_once(&self) -> Result<DrainReport, Error> {
        let settings = self.mirror.settings().await?;
        if !settings.drains_changes() {
            debug!("mirroring inactive; outbox left pending");
            return Ok(DrainReport {
                skipped: true,
                ..DrainReport::default()
            });
        }

        let batch = self
            .outbox
            .claim_due(self.clock.utc(), self.config.batch_size)
            .await
            .map_err(map_outbox_error)?;
        let mut report = DrainReport {
            claimed: batch.len(),
            ..DrainReport::default()
        };
        if batch.is_empty() {
            return Ok(report);
        }

        let collapse = settings.collapses_batches()
            || batch
                .iter()
                .any(|intent| intent.operation == OutboxOperation::Delete);
        if collapse {
            report.full_resync = true;
            let outcome = self.mirror.full_resync().await?;
            if outcome.is_success() {
                let ids: Vec<i64> = batch.iter().map(|intent| intent.id).collect();
                self.outbox
                    .mark_processed(&ids, self.clock.utc())
                    .await
                    .map_err(map_outbox_error)?;
                report.delivered = batch.len();
            } else {
                for intent in &batch {
                    self.reschedule(intent, &outcome, &mut report).await?;
                }
            }
            return Ok(report);
        }

        for intent in &batch {
            let outcome = self.mirror.upsert(&intent.archive_entry_id).await?;
            if outcome.is_success() {
                self.outbox
                    .mark_processed(&[intent.id], self.clock.utc())
                    .await
                    .map_err(map_outbox_error)?;
                report.delivered += 1;
            } else {
                self.reschedule(intent, &outcome, &mut report).await?;
            }
        }
        Ok(report)
    }

    async fn reschedule(
        &self,
        intent: &OutboxIntent,
        outcome: &MirrorOutcome,
        report: &mut DrainReport,
    ) -> Result<(), Error> {
        let attempts = intent.attempts.saturating_add(1);
        let now = self.clock.utc();
        let retry_at = if attempts >= self.config.max_attempts.max(1) {
            report.parked += 1;
            None
        } else {
            report.rescheduled += 1;
            let delay = self
                .jitter
                .jittered_delay(self.retry_base_delay(attempts), attempts, now);
            Some(
                TimeDelta::from_std(delay)
                    .ok()
                    .and_then(|delta| now.checked_add_signed(delta))
                    .unwrap_or(now),
            )
        };
        warn!(
            intent_id = intent.id,
            operation = %intent.operation,
            attempts,
            retry_at = ?retry_at,
            message = %outcome.message(),
            "mirror delivery failed"
        );
        self.outbox
            .record_failure(&OutboxFailure {
                id: intent.id,
                attempts,
                last_error: outcome.message(),
                retry_at,
            })
            .await
            .map_err(map_outbox_error)
    }

    fn retry_base_delay(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.config.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.config.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }
}

#[cfg(test)]
mod tests;
