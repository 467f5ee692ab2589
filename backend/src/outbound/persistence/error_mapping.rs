//! Shared Diesel error mapping for the repositories.
//!
//! Each repository passes the constructors of its own port error; only the
//! queue adapter needs to look at constraint names.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use crate::domain::QueueEntryId;
use crate::domain::ports::QueueRepositoryError;

use super::pool::PoolError;

/// Deferred unique constraint on `queue_entries.queue_number`.
pub(crate) const QUEUE_NUMBER_CONSTRAINT: &str = "queue_entries_queue_number_key";
/// Partial unique index on the phone of waiting and in-progress entries.
pub(crate) const ACTIVE_PHONE_CONSTRAINT: &str = "queue_entries_active_phone_key";

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    connection(error.into_message())
}

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => debug!(
            ?kind,
            message = info.message(),
            constraint = ?info.constraint_name(),
            "diesel operation failed"
        ),
        _ => debug!(%error, "diesel operation failed"),
    }
}

/// Map Diesel errors into query/connection constructors.
pub(crate) fn map_diesel_error<E>(
    error: DieselError,
    query: impl Fn(&'static str) -> E,
    connection: impl Fn(&'static str) -> E,
) -> E {
    log_diesel_error(&error);
    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DeserializationError(_) => query("unreadable database row"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            query("transaction conflict")
        }
        _ => query("database error"),
    }
}

/// Map Diesel errors raised while writing the queue, recognising the
/// uniqueness guards the lifecycle service retries on.
pub(crate) fn map_queue_error(error: DieselError) -> QueueRepositoryError {
    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &error {
        let constraint = info.constraint_name().unwrap_or_default();
        if constraint == QUEUE_NUMBER_CONSTRAINT {
            debug!(constraint, "queue number collision");
            return QueueRepositoryError::queue_number_taken(info.message().to_owned());
        }
        if constraint == ACTIVE_PHONE_CONSTRAINT {
            debug!(constraint, "phone already queued");
            return QueueRepositoryError::phone_already_queued(info.message().to_owned());
        }
        warn!(
            constraint,
            message = info.message(),
            "unrecognised unique violation on the queue"
        );
    }
    map_diesel_error(
        error,
        QueueRepositoryError::query,
        QueueRepositoryError::connection,
    )
}

/// Map errors from an entry update; a row gone before the write is
/// [`QueueRepositoryError::EntryMissing`].
pub(crate) fn map_update_error(error: DieselError, id: &QueueEntryId) -> QueueRepositoryError {
    match error {
        DieselError::NotFound => {
            debug!(entry_id = %id, "queue entry vanished before update");
            QueueRepositoryError::entry_missing(id.to_string())
        }
        other => map_queue_error(other),
    }
}

/// Convert a `COUNT(*)` result.
pub(crate) fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

/// Convert an affected-row count.
pub(crate) fn affected(rows: usize) -> u64 {
    u64::try_from(rows).unwrap_or(u64::MAX)
}

/// Escape `%`, `_`, and `\` for use inside an `ILIKE` pattern.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use diesel::result::DatabaseErrorInformation;
    use rstest::rstest;

    use super::*;

    struct Info {
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("queue_entries")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn unique_violation(constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(Info { constraint }),
        )
    }

    #[rstest]
    fn number_collision_is_recognised() {
        assert!(matches!(
            map_queue_error(unique_violation(Some(QUEUE_NUMBER_CONSTRAINT))),
            QueueRepositoryError::QueueNumberTaken { .. }
        ));
    }

    #[rstest]
    fn phone_collision_is_recognised() {
        assert!(matches!(
            map_queue_error(unique_violation(Some(ACTIVE_PHONE_CONSTRAINT))),
            QueueRepositoryError::PhoneAlreadyQueued { .. }
        ));
    }

    #[rstest]
    #[case(unique_violation(None))]
    #[case(DieselError::NotFound)]
    fn other_failures_are_query_errors(#[case] error: DieselError) {
        assert!(matches!(
            map_queue_error(error),
            QueueRepositoryError::Query { .. }
        ));
    }

    #[rstest]
    fn vanished_row_during_update_is_entry_missing() {
        let id = QueueEntryId::random();
        assert_eq!(
            map_update_error(DieselError::NotFound, &id),
            QueueRepositoryError::entry_missing(id.to_string())
        );
    }

    #[rstest]
    fn update_keeps_constraint_mapping() {
        let id = QueueEntryId::random();
        assert!(matches!(
            map_update_error(unique_violation(Some(QUEUE_NUMBER_CONSTRAINT)), &id),
            QueueRepositoryError::QueueNumberTaken { .. }
        ));
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let err = map_pool_error(
            PoolError::checkout("timed out"),
            QueueRepositoryError::connection,
        );
        assert_eq!(err, QueueRepositoryError::connection("timed out"));
    }

    #[rstest]
    #[case("Law", "%Law%")]
    #[case("50%_off", "%50\\%\\_off%")]
    fn like_patterns_escape_wildcards(#[case] needle: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(needle), expected);
    }
}
