//! Spreadsheet row layout for archived queue entries.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::ArchivedQueueEntry;

/// Number of mirrored columns (A..P).
pub const COLUMN_COUNT: usize = 16;

/// Last mirrored column letter.
pub const LAST_COLUMN: char = 'P';

/// Header row written at the top of the sheet.
pub const HEADER: [&str; COLUMN_COUNT] = [
    "ID",
    "Original ID",
    "Queue Number",
    "Full Name",
    "Phone",
    "Programs",
    "Status",
    "Notes",
    "Assigned Employee",
    "Created At",
    "Updated At",
    "Completed At",
    "Processing Time",
    "Form Language",
    "Archived At",
    "Archive Reason",
];

/// Human-readable label for a stored status; unknown labels pass through.
#[must_use]
pub fn translate_status(status: &str) -> &str {
    match status {
        "waiting" => "Ожидание",
        "in_progress" => "В процессе",
        "completed" => "Завершено",
        "paused" => "Приостановлено",
        "cancelled" => "Отменено",
        other => other,
    }
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(String::new, |at| {
        at.to_rfc3339_opts(SecondsFormat::Micros, true)
    })
}

/// Header row as owned cells.
#[must_use]
pub fn header_row() -> Vec<String> {
    HEADER.iter().map(|cell| (*cell).to_owned()).collect()
}

/// Render `entry` as one sheet row in [`HEADER`] order.
#[must_use]
pub fn sheet_row(entry: &ArchivedQueueEntry) -> Vec<String> {
    let programs = serde_json::to_string(&entry.programs).unwrap_or_else(|_| "[]".to_owned());
    vec![
        entry.id.to_string(),
        entry.original_id.to_string(),
        entry.queue_number.to_string(),
        entry.full_name.clone(),
        entry.phone.clone(),
        programs,
        translate_status(entry.status.as_str()).to_owned(),
        entry.notes.clone().unwrap_or_default(),
        entry.assigned_employee_name.clone().unwrap_or_default(),
        timestamp(Some(entry.created_at)),
        timestamp(Some(entry.updated_at)),
        timestamp(entry.completed_at),
        entry
            .processing_time
            .map_or_else(String::new, |seconds| seconds.to_string()),
        entry.form_language.clone().unwrap_or_default(),
        timestamp(Some(entry.archived_at)),
        entry.archive_reason.to_string(),
    ]
}

/// A1 range covering the full width of sheet row `row` (one-based).
#[must_use]
pub fn row_range(sheet_name: &str, row: usize) -> String {
    format!("{}!A{row}:{LAST_COLUMN}{row}", quote_sheet_name(sheet_name))
}

/// A1 range of the identifier column.
#[must_use]
pub fn id_column_range(sheet_name: &str) -> String {
    format!("{}!A:A", quote_sheet_name(sheet_name))
}

/// Sheet names with spaces or punctuation must be single-quoted in A1
/// notation, with embedded quotes doubled.
#[must_use]
pub fn quote_sheet_name(sheet_name: &str) -> String {
    if sheet_name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        sheet_name.to_owned()
    } else {
        format!("'{}'", sheet_name.replace('\'', "''"))
    }
}
