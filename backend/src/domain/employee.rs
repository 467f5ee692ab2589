//! Admission staff members and their desk availability.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stable identifier of an admission employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(Uuid);

impl EmployeeId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Self-managed working status of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Not working.
    Offline,
    /// At the desk, ready to call the next applicant.
    Available,
    /// Serving an applicant.
    Busy,
    /// On a break; excluded from automatic assignment.
    Paused,
}

impl EmployeeStatus {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Available => "available",
            Self::Busy => "busy",
            Self::Paused => "paused",
        }
    }

    /// Whether new applicants may be routed to this employee.
    #[must_use]
    pub const fn takes_assignments(self) -> bool {
        matches!(self, Self::Available | Self::Busy)
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown employee status label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown employee status: {0}")]
pub struct EmployeeStatusParseError(pub String);

impl FromStr for EmployeeStatus {
    type Err = EmployeeStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offline" => Ok(Self::Offline),
            "available" => Ok(Self::Available),
            "busy" => Ok(Self::Busy),
            "paused" => Ok(Self::Paused),
            other => Err(EmployeeStatusParseError(other.to_owned())),
        }
    }
}

/// Desk rank used for employees whose desk has no number.
pub const UNRANKED_DESK: u32 = 9999;

/// An admission staff member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: EmployeeId,
    pub full_name: String,
    /// Free-text desk label such as "Desk 3" or "каб. 12".
    pub desk: Option<String>,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Numeric rank of the desk: the first run of digits in the label.
    ///
    /// # Examples
    /// ```
    /// use admission_queue::domain::desk_rank;
    ///
    /// assert_eq!(desk_rank(Some("Desk 12b")), 12);
    /// assert_eq!(desk_rank(Some("reception")), 9999);
    /// assert_eq!(desk_rank(None), 9999);
    /// ```
    #[must_use]
    pub fn desk_rank(&self) -> u32 {
        desk_rank(self.desk.as_deref())
    }
}

/// Rank a free-text desk label; see [`Employee::desk_rank`].
#[must_use]
pub fn desk_rank(desk: Option<&str>) -> u32 {
    let Some(desk) = desk else {
        return UNRANKED_DESK;
    };
    let digits: String = desk
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(UNRANKED_DESK)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("3"), 3)]
    #[case(Some("Desk 7"), 7)]
    #[case(Some("room 12, desk 4"), 12)]
    #[case(Some("окно 05"), 5)]
    #[case(Some("front"), UNRANKED_DESK)]
    #[case(Some(""), UNRANKED_DESK)]
    #[case(None, UNRANKED_DESK)]
    #[case(Some("99999999999999"), UNRANKED_DESK)]
    fn ranks_desks_by_first_number(#[case] desk: Option<&str>, #[case] expected: u32) {
        assert_eq!(desk_rank(desk), expected);
    }

    #[rstest]
    #[case(EmployeeStatus::Available, true)]
    #[case(EmployeeStatus::Busy, true)]
    #[case(EmployeeStatus::Paused, false)]
    #[case(EmployeeStatus::Offline, false)]
    fn only_working_staff_take_assignments(#[case] status: EmployeeStatus, #[case] expected: bool) {
        assert_eq!(status.takes_assignments(), expected);
    }
}
