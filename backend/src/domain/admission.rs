//! Planning of queue admissions and compactions.
//!
//! The lifecycle service reads the current queue, builds a plan here, and
//! hands it to the queue repository which commits it in one transaction.
//! Planning is pure so the ceiling, eviction, and renumbering rules are
//! testable without storage.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::archive::{ArchiveReason, ArchivedQueueEntry};
use super::queue::{ACTIVE_QUEUE_CEILING, QueueEntry, QueueEntryId, QueueStatus};

/// New queue number for an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renumbering {
    pub id: QueueEntryId,
    pub queue_number: i32,
}

/// Removal of completed entries followed by dense renumbering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compaction {
    /// Completed entries removed from the queue, oldest update first.
    pub removed: Vec<QueueEntryId>,
    /// Shadows written for removed entries that had none.
    pub shadows: Vec<ArchivedQueueEntry>,
    /// Number changes for surviving entries, in creation order.
    pub renumbered: Vec<Renumbering>,
    /// Entries left after removal.
    pub survivors: usize,
}

impl Compaction {
    /// Whether committing this compaction changes anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.shadows.is_empty() && self.renumbered.is_empty()
    }
}

/// Everything committed when an applicant joins the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionPlan {
    pub compaction: Compaction,
    pub entry: QueueEntry,
    pub shadow: ArchivedQueueEntry,
}

/// The queue is at its ceiling and holds nothing evictable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("queue is full: {size} entries and none completed")]
pub struct QueueFull {
    pub size: usize,
}

/// Remove every completed entry and renumber the rest densely by creation
/// time.
///
/// `shadowed` lists the entries that already have an archive row; removed
/// entries outside it receive a shadow labelled `reason`.
#[must_use]
pub fn compact(
    queue: &[QueueEntry],
    shadowed: &HashSet<QueueEntryId>,
    reason: &ArchiveReason,
    now: DateTime<Utc>,
) -> Compaction {
    let mut completed: Vec<&QueueEntry> = queue
        .iter()
        .filter(|entry| entry.status == QueueStatus::Completed)
        .collect();
    completed.sort_by_key(|entry| (entry.updated_at, entry.queue_number));

    let shadows = completed
        .iter()
        .filter(|entry| !shadowed.contains(&entry.id))
        .map(|entry| ArchivedQueueEntry::shadow_of(entry, reason.clone(), now))
        .collect();

    let mut survivors: Vec<&QueueEntry> = queue
        .iter()
        .filter(|entry| entry.status != QueueStatus::Completed)
        .collect();
    survivors.sort_by_key(|entry| (entry.created_at, entry.queue_number));

    let renumbered = survivors
        .iter()
        .zip(1..)
        .filter(|(entry, number)| entry.queue_number != *number)
        .map(|(entry, queue_number)| Renumbering {
            id: entry.id,
            queue_number,
        })
        .collect();

    Compaction {
        removed: completed.iter().map(|entry| entry.id).collect(),
        shadows,
        renumbered,
        survivors: survivors.len(),
    }
}

/// Next sequential number after `queue` (one past the maximum).
#[must_use]
pub fn next_queue_number(queue: &[QueueEntry]) -> i32 {
    queue
        .iter()
        .map(|entry| entry.queue_number)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Plan the admission of `entry` into `queue`.
///
/// At or above [`ACTIVE_QUEUE_CEILING`] completed entries are evicted first;
/// when none exist the admission is refused. The entry's `queue_number` is
/// overwritten with the next number after any renumbering.
///
/// # Errors
/// Returns [`QueueFull`] when the ceiling is reached and nothing is
/// evictable.
pub fn plan_admission(
    queue: &[QueueEntry],
    shadowed: &HashSet<QueueEntryId>,
    mut entry: QueueEntry,
    now: DateTime<Utc>,
) -> Result<AdmissionPlan, QueueFull> {
    let compaction = if queue.len() >= ACTIVE_QUEUE_CEILING {
        let compaction = compact(queue, shadowed, &ArchiveReason::AutoCleanup, now);
        if compaction.removed.is_empty() {
            return Err(QueueFull { size: queue.len() });
        }
        compaction
    } else {
        Compaction {
            survivors: queue.len(),
            ..Compaction::default()
        }
    };

    entry.queue_number = if compaction.removed.is_empty() {
        next_queue_number(queue)
    } else {
        i32::try_from(compaction.survivors)
            .unwrap_or(i32::MAX)
            .saturating_add(1)
    };
    let shadow = ArchivedQueueEntry::shadow_of(&entry, ArchiveReason::AutoBackup, now);

    Ok(AdmissionPlan {
        compaction,
        entry,
        shadow,
    })
}
