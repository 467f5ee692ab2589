//! Unit tests for outbox draining.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::{
    DrainReport, MockArchiveMirror, OutboxWorker, OutboxWorkerConfig, OutboxWorkerPorts,
    OutboxWorkerRuntime,
};
use crate::domain::mirror::{MirrorOutcome, SyncMode, SyncSettings};
use crate::domain::ports::{
    MirrorOutboxError, MockMirrorOutbox, OutboxIntent, OutboxOperation, SpreadsheetError,
};
use crate::domain::{ArchiveEntryId, ErrorCode};
use crate::test_support::{MutableClock, NoJitter, RecordingSleeper};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn active_settings(now: DateTime<Utc>, mode: SyncMode) -> SyncSettings {
    let mut settings = SyncSettings::defaults(now);
    settings.spreadsheet_id = Some("sheet-1".to_owned());
    settings.enabled = true;
    settings.mode = mode;
    settings
}

fn intent(id: i64, operation: OutboxOperation, attempts: u32, now: DateTime<Utc>) -> OutboxIntent {
    OutboxIntent {
        id,
        operation,
        archive_entry_id: ArchiveEntryId::random(),
        attempts,
        created_at: now,
    }
}

fn mirror_with(settings: SyncSettings) -> MockArchiveMirror {
    let mut mirror = MockArchiveMirror::new();
    mirror
        .expect_settings()
        .returning(move || Ok(settings.clone()));
    mirror
}

fn worker(
    outbox: MockMirrorOutbox,
    mirror: MockArchiveMirror,
    now: DateTime<Utc>,
    sleeper: Arc<RecordingSleeper>,
) -> OutboxWorker {
    OutboxWorker::with_runtime(
        OutboxWorkerPorts::new(Arc::new(outbox), Arc::new(mirror)),
        Arc::new(MutableClock::new(now)),
        OutboxWorkerRuntime {
            sleeper,
            jitter: Arc::new(NoJitter),
        },
        OutboxWorkerConfig::default(),
    )
}

fn unavailable() -> MirrorOutcome {
    MirrorOutcome::Unavailable {
        reason: "spreadsheet unreachable".to_owned(),
    }
}

#[rstest]
#[case(SyncSettings::defaults(Utc::now()))]
#[case(active_settings(Utc::now(), SyncMode::Manual))]
#[tokio::test]
async fn inactive_mirror_leaves_intents_pending(#[case] settings: SyncSettings, now: DateTime<Utc>) {
    let mut outbox = MockMirrorOutbox::new();
    outbox.expect_claim_due().never();

    let report = worker(outbox, mirror_with(settings), now, Arc::default())
        .run_once()
        .await
        .expect("tick runs");
    assert!(report.skipped);
    assert_eq!(report.claimed, 0);
}

#[rstest]
#[tokio::test]
async fn upserts_are_replayed_row_by_row(now: DateTime<Utc>) {
    let batch = vec![
        intent(1, OutboxOperation::Upsert, 0, now),
        intent(2, OutboxOperation::Upsert, 0, now),
    ];
    let mut outbox = MockMirrorOutbox::new();
    outbox
        .expect_claim_due()
        .withf(|_, limit| *limit == 100)
        .return_once(move |_, _| Ok(batch));
    outbox
        .expect_mark_processed()
        .withf(|ids, _| ids.len() == 1)
        .times(2)
        .returning(|_, _| Ok(()));
    outbox.expect_record_failure().never();

    let mut mirror = mirror_with(active_settings(now, SyncMode::Realtime));
    mirror.expect_full_resync().never();
    mirror
        .expect_upsert()
        .times(2)
        .returning(|_| Ok(MirrorOutcome::Appended));

    let report = worker(outbox, mirror, now, Arc::default())
        .run_once()
        .await
        .expect("tick runs");
    assert_eq!(
        report,
        DrainReport {
            claimed: 2,
            delivered: 2,
            ..DrainReport::default()
        }
    );
}

#[rstest]
#[tokio::test]
async fn any_delete_collapses_batch_into_full_resync(now: DateTime<Utc>) {
    let batch = vec![
        intent(1, OutboxOperation::Upsert, 0, now),
        intent(2, OutboxOperation::Delete, 0, now),
        intent(3, OutboxOperation::Delete, 0, now),
    ];
    let mut outbox = MockMirrorOutbox::new();
    outbox.expect_claim_due().return_once(move |_, _| Ok(batch));
    outbox
        .expect_mark_processed()
        .withf(|ids, _| ids.to_vec() == vec![1, 2, 3])
        .times(1)
        .returning(|_, _| Ok(()));

    let mut mirror = mirror_with(active_settings(now, SyncMode::Realtime));
    mirror.expect_upsert().never();
    mirror
        .expect_full_resync()
        .times(1)
        .returning(|| Ok(MirrorOutcome::FullResync { rows_written: 7 }));

    let report = worker(outbox, mirror, now, Arc::default())
        .run_once()
        .await
        .expect("tick runs");
    assert!(report.full_resync);
    assert_eq!(report.delivered, 3);
}

#[rstest]
#[tokio::test]
async fn scheduled_mode_always_resyncs(now: DateTime<Utc>) {
    let batch = vec![intent(5, OutboxOperation::Upsert, 0, now)];
    let mut outbox = MockMirrorOutbox::new();
    outbox.expect_claim_due().return_once(move |_, _| Ok(batch));
    outbox.expect_mark_processed().returning(|_, _| Ok(()));

    let mut mirror = mirror_with(active_settings(now, SyncMode::Scheduled));
    mirror.expect_upsert().never();
    mirror
        .expect_full_resync()
        .times(1)
        .returning(|| Ok(MirrorOutcome::FullResync { rows_written: 1 }));

    let report = worker(outbox, mirror, now, Arc::default())
        .run_once()
        .await
        .expect("tick runs");
    assert!(report.full_resync);
}

#[rstest]
#[case(0, 10)]
#[case(1, 20)]
#[case(3, 80)]
#[case(6, 600)]
#[tokio::test]
async fn failures_back_off_exponentially(
    #[case] attempts: u32,
    #[case] delay_secs: i64,
    now: DateTime<Utc>,
) {
    let batch = vec![intent(9, OutboxOperation::Upsert, attempts, now)];
    let expected_retry = now + chrono::Duration::seconds(delay_secs);
    let mut outbox = MockMirrorOutbox::new();
    outbox.expect_claim_due().return_once(move |_, _| Ok(batch));
    outbox.expect_mark_processed().never();
    outbox
        .expect_record_failure()
        .withf(move |failure| {
            failure.id == 9
                && failure.attempts == attempts + 1
                && failure.retry_at == Some(expected_retry)
                && failure.last_error.contains("unreachable")
        })
        .times(1)
        .returning(|_| Ok(()));

    let mut mirror = mirror_with(active_settings(now, SyncMode::Realtime));
    mirror.expect_upsert().returning(|_| Ok(unavailable()));

    let report = worker(outbox, mirror, now, Arc::default())
        .run_once()
        .await
        .expect("tick runs");
    assert_eq!(report.rescheduled, 1);
}

#[rstest]
#[tokio::test]
async fn exhausted_intents_are_parked(now: DateTime<Utc>) {
    let batch = vec![intent(4, OutboxOperation::Upsert, 7, now)];
    let mut outbox = MockMirrorOutbox::new();
    outbox.expect_claim_due().return_once(move |_, _| Ok(batch));
    outbox
        .expect_record_failure()
        .withf(|failure| failure.attempts == 8 && failure.retry_at.is_none())
        .times(1)
        .returning(|_| Ok(()));

    let mut mirror = mirror_with(active_settings(now, SyncMode::Realtime));
    mirror.expect_upsert().returning(|_| {
        Ok(MirrorOutcome::Failed {
            error: SpreadsheetError::permission_denied("share the sheet"),
        })
    });

    let report = worker(outbox, mirror, now, Arc::default())
        .run_once()
        .await
        .expect("tick runs");
    assert_eq!(report.parked, 1);
    assert_eq!(report.rescheduled, 0);
}

#[rstest]
#[tokio::test]
async fn failed_resync_reschedules_whole_batch(now: DateTime<Utc>) {
    let batch = vec![
        intent(1, OutboxOperation::Delete, 0, now),
        intent(2, OutboxOperation::Upsert, 2, now),
    ];
    let mut outbox = MockMirrorOutbox::new();
    outbox.expect_claim_due().return_once(move |_, _| Ok(batch));
    outbox.expect_mark_processed().never();
    outbox
        .expect_record_failure()
        .times(2)
        .returning(|_| Ok(()));

    let mut mirror = mirror_with(active_settings(now, SyncMode::Realtime));
    mirror.expect_full_resync().returning(|| Ok(unavailable()));

    let report = worker(outbox, mirror, now, Arc::default())
        .run_once()
        .await
        .expect("tick runs");
    assert_eq!(report.rescheduled, 2);
    assert_eq!(report.delivered, 0);
}

#[rstest]
#[tokio::test]
async fn outbox_failures_surface_as_service_errors(now: DateTime<Utc>) {
    let mut outbox = MockMirrorOutbox::new();
    outbox
        .expect_claim_due()
        .return_once(|_, _| Err(MirrorOutboxError::connection("pool exhausted")));

    let err = worker(
        outbox,
        mirror_with(active_settings(now, SyncMode::Realtime)),
        now,
        Arc::default(),
    )
    .run_once()
    .await
    .expect_err("claim fails");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn run_until_stops_on_shutdown(now: DateTime<Utc>) {
    let mut outbox = MockMirrorOutbox::new();
    outbox
        .expect_claim_due()
        .times(1)
        .returning(|_, _| Ok(Vec::new()));
    let sleeper = Arc::new(RecordingSleeper::default());

    worker(
        outbox,
        mirror_with(active_settings(now, SyncMode::Realtime)),
        now,
        Arc::clone(&sleeper),
    )
    .run_until(async {})
    .await;

    assert!(sleeper.recorded().is_empty());
}

#[rstest]
#[tokio::test]
async fn run_until_sleeps_between_ticks(now: DateTime<Utc>) {
    let mut outbox = MockMirrorOutbox::new();
    outbox
        .expect_claim_due()
        .times(3)
        .returning(|_, _| Ok(Vec::new()));
    let sleeper = Arc::new(RecordingSleeper::default());
    let watcher = Arc::clone(&sleeper);
    let after_two_sleeps = std::future::poll_fn(move |_| {
        if watcher.recorded().len() >= 2 {
            std::task::Poll::Ready(())
        } else {
            std::task::Poll::Pending
        }
    });

    worker(
        outbox,
        mirror_with(active_settings(now, SyncMode::Realtime)),
        now,
        Arc::clone(&sleeper),
    )
    .run_until(after_two_sleeps)
    .await;

    assert_eq!(
        sleeper.recorded(),
        vec![Duration::from_secs(10), Duration::from_secs(10)]
    );
}
