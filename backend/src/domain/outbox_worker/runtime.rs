//! Port and runtime dependency bundles for the outbox worker.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::MirrorOutbox;

use super::{ArchiveMirror, BackoffJitter, OutboxSleeper};

/// Port bundle required by the outbox worker.
pub struct OutboxWorkerPorts {
    /// Pending mirror changes.
    pub outbox: Arc<dyn MirrorOutbox>,
    /// Mirror the changes are delivered to.
    pub mirror: Arc<dyn ArchiveMirror>,
}

impl OutboxWorkerPorts {
    /// Build a worker port bundle.
    pub fn new(outbox: Arc<dyn MirrorOutbox>, mirror: Arc<dyn ArchiveMirror>) -> Self {
        Self { outbox, mirror }
    }
}

/// Runtime helpers used by the poll loop and retry policy.
pub struct OutboxWorkerRuntime {
    /// Async sleep implementation.
    pub sleeper: Arc<dyn OutboxSleeper>,
    /// Jitter strategy for retry delays.
    pub jitter: Arc<dyn BackoffJitter>,
}

impl Default for OutboxWorkerRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(AttemptJitter),
        }
    }
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl OutboxSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Default jitter: adds up to a quarter of the base delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttemptJitter;

impl BackoffJitter for AttemptJitter {
    fn jittered_delay(&self, base: Duration, attempt: u32, now: DateTime<Utc>) -> Duration {
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        let max_extra = (base_ms / 4).max(1);
        let seed = u64::from(now.timestamp_subsec_nanos()) ^ u64::from(attempt);
        let extra = seed % (max_extra.saturating_add(1));
        Duration::from_millis(base_ms.saturating_add(extra))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1)]
    #[case(4)]
    fn jitter_stays_within_a_quarter(#[case] attempt: u32) {
        let now = Utc
            .with_ymd_and_hms(2026, 10, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        let base = Duration::from_secs(10);
        let delay = AttemptJitter.jittered_delay(base, attempt, now);
        assert!(delay >= base);
        assert!(delay <= base + Duration::from_millis(2_500));
    }
}
