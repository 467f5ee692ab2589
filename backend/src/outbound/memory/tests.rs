//! Behaviour of the in-memory store's transactional guarantees.

use std::sync::Arc;

use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{ArchiveReason, EmployeeStatus, QueueEntryPatch, QueueStatus, Renumbering};
use crate::test_support::MutableClock;

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn store(now: DateTime<Utc>) -> InMemoryStore {
    InMemoryStore::new(Arc::new(MutableClock::new(now)))
}

fn entry(number: i32, phone: &str, status: QueueStatus, now: DateTime<Utc>) -> QueueEntry {
    QueueEntry {
        id: QueueEntryId::random(),
        queue_number: number,
        full_name: format!("Applicant {number}"),
        phone: phone.to_owned(),
        programs: vec!["Law".to_owned()],
        status,
        notes: None,
        assigned_employee_id: None,
        assigned_employee_name: None,
        created_at: now + Duration::seconds(i64::from(number)),
        updated_at: now,
        processing_time: None,
        form_language: None,
    }
}

fn plan_for(entry: QueueEntry, now: DateTime<Utc>) -> AdmissionPlan {
    AdmissionPlan {
        compaction: Compaction::default(),
        shadow: ArchivedQueueEntry::shadow_of(&entry, ArchiveReason::AutoBackup, now),
        entry,
    }
}

#[rstest]
#[tokio::test]
async fn admission_writes_entry_shadow_and_intent(store: InMemoryStore, now: DateTime<Utc>) {
    let admitted = entry(1, "100", QueueStatus::Waiting, now);
    store
        .admit(&plan_for(admitted.clone(), now))
        .await
        .expect("admission commits");

    assert_eq!(store.list_all().await.expect("list"), vec![admitted.clone()]);
    assert_eq!(
        store
            .shadowed_among(&[admitted.id])
            .await
            .expect("shadow lookup"),
        vec![admitted.id]
    );
    let intents = store.claim_due(now, 10).await.expect("claim");
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].operation, OutboxOperation::Upsert);
}

#[rstest]
#[tokio::test]
async fn duplicate_number_rolls_back_everything(store: InMemoryStore, now: DateTime<Utc>) {
    store
        .admit(&plan_for(entry(1, "100", QueueStatus::Waiting, now), now))
        .await
        .expect("first admission");

    let err = store
        .admit(&plan_for(entry(1, "200", QueueStatus::Waiting, now), now))
        .await
        .expect_err("number clash");
    assert!(matches!(err, QueueRepositoryError::QueueNumberTaken { .. }));
    assert_eq!(ArchiveRepository::count(&store).await.expect("count"), 1);
    assert_eq!(store.pending_count().await.expect("pending"), 1);
}

#[rstest]
#[tokio::test]
async fn open_phone_is_unique_but_completed_phone_is_not(
    store: InMemoryStore,
    now: DateTime<Utc>,
) {
    store
        .admit(&plan_for(entry(1, "100", QueueStatus::Completed, now), now))
        .await
        .expect("completed entry");
    store
        .admit(&plan_for(entry(2, "100", QueueStatus::Waiting, now), now))
        .await
        .expect("phone reusable after completion");

    let err = store
        .admit(&plan_for(entry(3, "100", QueueStatus::Waiting, now), now))
        .await
        .expect_err("phone clash");
    assert!(matches!(err, QueueRepositoryError::PhoneAlreadyQueued { .. }));
}

#[rstest]
#[tokio::test]
async fn renumbering_may_swap_numbers_within_one_commit(
    store: InMemoryStore,
    now: DateTime<Utc>,
) {
    let first = entry(1, "100", QueueStatus::Waiting, now);
    let second = entry(2, "200", QueueStatus::Waiting, now);
    store.admit(&plan_for(first.clone(), now)).await.expect("first");
    store.admit(&plan_for(second.clone(), now)).await.expect("second");

    store
        .compact(&Compaction {
            renumbered: vec![
                Renumbering {
                    id: first.id,
                    queue_number: 2,
                },
                Renumbering {
                    id: second.id,
                    queue_number: 1,
                },
            ],
            survivors: 2,
            ..Compaction::default()
        })
        .await
        .expect("deferred uniqueness allows swaps");

    let listed = store.list_all().await.expect("list");
    assert_eq!(listed[0].id, second.id);
}

#[rstest]
#[tokio::test]
async fn update_syncs_shadow_and_employee(store: InMemoryStore, now: DateTime<Utc>) {
    let employee = Employee {
        id: EmployeeId::random(),
        full_name: "B. Serikova".to_owned(),
        desk: Some("3".to_owned()),
        status: EmployeeStatus::Busy,
        created_at: now,
    };
    EmployeeRepository::insert(&store, &employee)
        .await
        .expect("employee");
    let mut served = entry(1, "100", QueueStatus::InProgress, now);
    store.admit(&plan_for(served.clone(), now)).await.expect("admit");

    let later = now + Duration::minutes(30);
    let shadow = served.apply_patch(QueueEntryPatch::status(QueueStatus::Completed), later);
    let outcome = store
        .apply_update(&EntryUpdate {
            entry: served.clone(),
            shadow,
            employee: Some(crate::domain::EmployeeStatusChange {
                employee_id: employee.id,
                status: EmployeeStatus::Available,
            }),
        })
        .await
        .expect("update commits");

    assert_eq!(outcome, ShadowOutcome::Synced);
    let archived = ArchiveRepository::list(&store, &ArchiveFilter::default())
        .await
        .expect("archive");
    assert_eq!(archived[0].status, QueueStatus::Completed);
    assert_eq!(archived[0].processing_time, Some(1800));
    assert_eq!(archived[0].completed_at, Some(later));
    let reloaded = EmployeeRepository::find_by_id(&store, &employee.id)
        .await
        .expect("lookup")
        .expect("employee exists");
    assert_eq!(reloaded.status, EmployeeStatus::Available);
}

#[rstest]
#[tokio::test]
async fn update_of_removed_entry_reports_it_missing(store: InMemoryStore, now: DateTime<Utc>) {
    let mut gone = entry(1, "100", QueueStatus::Waiting, now);
    let shadow = gone.apply_patch(QueueEntryPatch::status(QueueStatus::InProgress), now);

    let err = store
        .apply_update(&EntryUpdate {
            entry: gone.clone(),
            shadow,
            employee: None,
        })
        .await
        .expect_err("missing entry is refused");

    assert_eq!(err, QueueRepositoryError::entry_missing(gone.id.to_string()));
}

#[rstest]
#[tokio::test]
async fn archive_deletes_queue_delete_intents(store: InMemoryStore, now: DateTime<Utc>) {
    let admitted = entry(1, "100", QueueStatus::Waiting, now);
    store.admit(&plan_for(admitted.clone(), now)).await.expect("admit");
    let pending = store.claim_due(now, 10).await.expect("claim");
    store
        .mark_processed(&[pending[0].id], now)
        .await
        .expect("settle");

    let deleted = store
        .delete_by_id_or_original(admitted.id.as_uuid())
        .await
        .expect("delete");
    assert_eq!(deleted, 1);

    let intents = store.claim_due(now, 10).await.expect("claim");
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].operation, OutboxOperation::Delete);
}

#[rstest]
#[tokio::test]
async fn failed_intents_wait_for_retry_or_park(store: InMemoryStore, now: DateTime<Utc>) {
    store
        .admit(&plan_for(entry(1, "100", QueueStatus::Waiting, now), now))
        .await
        .expect("admit");
    let intent = store.claim_due(now, 10).await.expect("claim").remove(0);

    store
        .record_failure(&OutboxFailure {
            id: intent.id,
            attempts: 1,
            last_error: "unreachable".to_owned(),
            retry_at: Some(now + Duration::seconds(10)),
        })
        .await
        .expect("reschedule");
    assert!(store.claim_due(now, 10).await.expect("claim").is_empty());
    let retried = store
        .claim_due(now + Duration::seconds(10), 10)
        .await
        .expect("claim");
    assert_eq!(retried[0].attempts, 1);

    store
        .record_failure(&OutboxFailure {
            id: intent.id,
            attempts: 8,
            last_error: "unreachable".to_owned(),
            retry_at: None,
        })
        .await
        .expect("park");
    assert_eq!(store.pending_count().await.expect("pending"), 0);
}

#[rstest]
#[tokio::test]
async fn deleting_employee_clears_entry_reference(store: InMemoryStore, now: DateTime<Utc>) {
    let employee = Employee {
        id: EmployeeId::random(),
        full_name: "B. Serikova".to_owned(),
        desk: None,
        status: EmployeeStatus::Available,
        created_at: now,
    };
    EmployeeRepository::insert(&store, &employee)
        .await
        .expect("employee");
    let mut assigned = entry(1, "100", QueueStatus::Waiting, now);
    assigned.assigned_employee_id = Some(employee.id);
    assigned.assigned_employee_name = Some(employee.full_name.clone());
    store.admit(&plan_for(assigned, now)).await.expect("admit");

    assert!(
        EmployeeRepository::delete(&store, &employee.id)
            .await
            .expect("delete")
    );
    let listed = store.list_all().await.expect("list");
    assert_eq!(listed[0].assigned_employee_id, None);
    assert_eq!(listed[0].assigned_employee_name.as_deref(), Some("B. Serikova"));
}
