//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use crate::domain::{EmployeeId, EmployeeStatus, Error, QueueEntryId, QueueStatus};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    BlankField,
    InvalidUuid,
    InvalidDate,
    InvalidStatus,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::BlankField => "blank_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidStatus => "invalid_status",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: Option<&str>) -> Error {
    let mut details = json!({
        "field": field.as_str(),
        "code": code.as_str(),
    });
    if let Some(value) = value {
        details["value"] = json!(value);
    }
    Error::invalid_request(message).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("missing required field: {name}"),
        ErrorCode::MissingField,
        None,
    )
}

/// Trim `value`, rejecting blank text.
pub(crate) fn require_text(value: String, field: FieldName) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        let name = field.as_str();
        return Err(field_error(
            field,
            format!("{name} must not be blank"),
            ErrorCode::BlankField,
            None,
        ));
    }
    Ok(trimmed.to_owned())
}

/// Trim optional text; blank becomes `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Trim program names, dropping blanks, and require at least one.
pub(crate) fn require_programs(values: Vec<String>, field: FieldName) -> Result<Vec<String>, Error> {
    let programs: Vec<String> = values
        .into_iter()
        .map(|program| program.trim().to_owned())
        .filter(|program| !program.is_empty())
        .collect();
    if programs.is_empty() {
        let name = field.as_str();
        return Err(field_error(
            field,
            format!("{name} must list at least one program"),
            ErrorCode::MissingField,
            None,
        ));
    }
    Ok(programs)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            format!("{name} must be a valid UUID"),
            ErrorCode::InvalidUuid,
            Some(value),
        )
    })
}

pub(crate) fn parse_uuid_list(values: &[String], field: FieldName) -> Result<Vec<Uuid>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Uuid::parse_str(value.trim()).map_err(|_| {
                let name = field.as_str();
                Error::invalid_request(format!("{name} must contain valid UUIDs")).with_details(
                    json!({
                        "field": name,
                        "index": index,
                        "value": value,
                        "code": ErrorCode::InvalidUuid.as_str(),
                    }),
                )
            })
        })
        .collect()
}

pub(crate) fn parse_entry_id(value: &str) -> Result<QueueEntryId, Error> {
    parse_uuid(value, FieldName::new("id")).map(QueueEntryId::from_uuid)
}

pub(crate) fn parse_employee_id(value: &str, field: FieldName) -> Result<EmployeeId, Error> {
    parse_uuid(value, field).map(EmployeeId::from_uuid)
}

pub(crate) fn parse_optional_employee_id(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<EmployeeId>, Error> {
    optional_text(value)
        .map(|raw| parse_employee_id(&raw, field))
        .transpose()
}

/// Parse a `YYYY-MM-DD` calendar date.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            format!("{name} must be a YYYY-MM-DD date"),
            ErrorCode::InvalidDate,
            Some(value),
        )
    })
}

fn parse_label<T: FromStr>(value: &str, field: FieldName, allowed: &str) -> Result<T, Error> {
    T::from_str(value.trim()).map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            format!("{name} must be one of {allowed}"),
            ErrorCode::InvalidStatus,
            Some(value),
        )
    })
}

pub(crate) fn parse_queue_status(value: &str, field: FieldName) -> Result<QueueStatus, Error> {
    parse_label(value, field, "waiting, in_progress, paused, completed")
}

pub(crate) fn parse_optional_queue_status(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<QueueStatus>, Error> {
    optional_text(value)
        .map(|raw| parse_queue_status(&raw, field))
        .transpose()
}

pub(crate) fn parse_employee_status(value: &str, field: FieldName) -> Result<EmployeeStatus, Error> {
    parse_label(value, field, "offline, available, busy, paused")
}
