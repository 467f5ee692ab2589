//! Round-robin selection of the employee who receives a new applicant.
//!
//! The pick is a pure function of the candidate set and the number of
//! entries ever admitted, so callers fix both to get a reproducible answer.

use super::employee::Employee;

/// Choose an employee for the next applicant.
///
/// Candidates are employees that are available or busy; paused and offline
/// staff never rotate in. Candidates are ordered by desk rank (ties keep a
/// stable order by name then id) and the pick is
/// `historical_count % candidates`.
///
/// Returns `None` when nobody is working.
///
/// # Examples
/// ```
/// use admission_queue::domain::{Employee, EmployeeId, EmployeeStatus, select_assignee};
/// use chrono::Utc;
///
/// let staff = vec![
///     Employee {
///         id: EmployeeId::random(),
///         full_name: "B".to_owned(),
///         desk: Some("Desk 2".to_owned()),
///         status: EmployeeStatus::Available,
///         created_at: Utc::now(),
///     },
///     Employee {
///         id: EmployeeId::random(),
///         full_name: "A".to_owned(),
///         desk: Some("Desk 1".to_owned()),
///         status: EmployeeStatus::Busy,
///         created_at: Utc::now(),
///     },
/// ];
/// let chosen = select_assignee(&staff, 3).expect("someone is working");
/// assert_eq!(chosen.full_name, "B");
/// ```
#[must_use]
pub fn select_assignee(staff: &[Employee], historical_count: u64) -> Option<&Employee> {
    let mut candidates: Vec<&Employee> = staff
        .iter()
        .filter(|employee| employee.status.takes_assignments())
        .collect();
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by(|a, b| {
        a.desk_rank()
            .cmp(&b.desk_rank())
            .then_with(|| a.full_name.cmp(&b.full_name))
            .then_with(|| a.id.cmp(&b.id))
    });

    let len = u64::try_from(candidates.len()).ok()?;
    let index = usize::try_from(historical_count % len).ok()?;
    candidates.get(index).copied()
}
