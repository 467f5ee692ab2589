//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! Regenerate them with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Admission staff.
    employees (id) {
        id -> Uuid,
        full_name -> Varchar,
        /// Free-text desk label; its first digit run orders assignment.
        desk -> Nullable<Varchar>,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Live queue. `queue_number` is unique, checked at commit.
    queue_entries (id) {
        id -> Uuid,
        queue_number -> Int4,
        full_name -> Varchar,
        phone -> Varchar,
        programs -> Array<Text>,
        status -> Varchar,
        notes -> Nullable<Text>,
        assigned_employee_id -> Nullable<Uuid>,
        assigned_employee_name -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        /// Seconds spent at the desk, set on completion.
        processing_time -> Nullable<Int8>,
        form_language -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Shadow copies of queue entries. Writes fire the outbox trigger.
    archived_queue_entries (id) {
        id -> Uuid,
        original_id -> Uuid,
        queue_number -> Int4,
        full_name -> Varchar,
        phone -> Varchar,
        programs -> Array<Text>,
        status -> Varchar,
        notes -> Nullable<Text>,
        assigned_employee_name -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        completed_at -> Nullable<Timestamptz>,
        processing_time -> Nullable<Int8>,
        form_language -> Nullable<Varchar>,
        archived_at -> Timestamptz,
        archive_reason -> Varchar,
    }
}

diesel::table! {
    /// Single-row mirror configuration (`id` is always 1).
    sync_settings (id) {
        id -> Int2,
        spreadsheet_id -> Nullable<Varchar>,
        sheet_name -> Varchar,
        enabled -> Bool,
        sync_mode -> Varchar,
        last_sync_at -> Nullable<Timestamptz>,
        last_sync_status -> Nullable<Varchar>,
        last_sync_message -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail of mirror operations.
    sync_logs (id) {
        id -> Int8,
        operation -> Varchar,
        entry_id -> Nullable<Uuid>,
        status -> Varchar,
        message -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Pending spreadsheet changes written by the archive trigger.
    mirror_outbox (id) {
        id -> Int8,
        operation -> Varchar,
        archive_entry_id -> Uuid,
        attempts -> Int4,
        last_error -> Nullable<Text>,
        next_attempt_at -> Timestamptz,
        processed_at -> Nullable<Timestamptz>,
        failed -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Single-row display board video settings (`id` is always 1).
    display_settings (id) {
        id -> Int2,
        youtube_url -> Varchar,
        is_enabled -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(queue_entries -> employees (assigned_employee_id));

diesel::allow_tables_to_appear_in_same_query!(
    employees,
    queue_entries,
    archived_queue_entries,
    sync_settings,
    sync_logs,
    mirror_outbox,
    display_settings,
);
