//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer. Request and
//! response bodies referenced by the handlers are collected automatically;
//! the domain [`crate::domain::Error`] envelope is registered explicitly so
//! clients can share one error model across endpoints.
//!
//! The document is served by Swagger UI in debug builds and exported by
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Admission queue API",
        description = "Visitor queue, admission desks, archive, and spreadsheet mirror administration."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::public::join_queue,
        crate::inbound::http::public::check_queue,
        crate::inbound::http::public::cancel_entry,
        crate::inbound::http::public::move_back,
        crate::inbound::http::public::queue_count,
        crate::inbound::http::public::display_queue,
        crate::inbound::http::public::list_employees,
        crate::inbound::http::admission::start_work,
        crate::inbound::http::admission::pause_work,
        crate::inbound::http::admission::resume_work,
        crate::inbound::http::admission::finish_work,
        crate::inbound::http::admission::complete_current,
        crate::inbound::http::admission::call_next,
        crate::inbound::http::admission::desk_status,
        crate::inbound::http::admission::assigned_queue,
        crate::inbound::http::admission::update_entry,
        crate::inbound::http::admission::delete_entry,
        crate::inbound::http::admin::list_employees,
        crate::inbound::http::admin::create_employee,
        crate::inbound::http::admin::update_employee,
        crate::inbound::http::admin::delete_employee,
        crate::inbound::http::admin::list_queue,
        crate::inbound::http::admin::delete_queue_entry,
        crate::inbound::http::admin::bulk_delete_queue,
        crate::inbound::http::admin::reset_numbering,
        crate::inbound::http::archive::list_archive,
        crate::inbound::http::archive::cleanup_archive,
        crate::inbound::http::archive::preview_cleanup,
        crate::inbound::http::archive::delete_archive_entry,
        crate::inbound::http::archive::bulk_delete_archive,
        crate::inbound::http::display::get_video_settings,
        crate::inbound::http::display::update_video_settings,
        crate::inbound::http::sync::get_settings,
        crate::inbound::http::sync::update_settings,
        crate::inbound::http::sync::sync_status,
        crate::inbound::http::sync::full_sync,
        crate::inbound::http::sync::manual_sync,
        crate::inbound::http::sync::test_connection,
        crate::inbound::http::sync::sync_stats,
        crate::inbound::http::sync::sync_health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode)),
    tags(
        (name = "public", description = "Visitor-facing queue operations"),
        (name = "admission", description = "Admission desk workflow"),
        (name = "admin", description = "Staff directory, queue, and display board administration"),
        (name = "archive", description = "Archive browsing and cleanup"),
        (name = "sync", description = "Spreadsheet mirror administration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    fn error_schema_fields() -> Vec<String> {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        let schema = components
            .schemas
            .iter()
            .find(|(name, _)| name.as_str() == "Error" || name.ends_with(".Error"))
            .map(|(_, schema)| schema.clone())
            .expect("Error schema");
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_exposes_code_and_message() {
        let fields = error_schema_fields();
        assert!(fields.iter().any(|field| field == "code"));
        assert!(fields.iter().any(|field| field == "message"));
    }

    #[rstest]
    #[case("/api/v1/public/queue")]
    #[case("/api/v1/public/queue/check")]
    #[case("/api/v1/admission/{employeeId}/call-next")]
    #[case("/api/v1/admin/queue/reset-numbering")]
    #[case("/api/v1/admin/archive/cleanup/preview")]
    #[case("/api/v1/admin/sync/health")]
    #[case("/api/v1/admin/video-settings")]
    #[case("/health/ready")]
    fn document_lists_endpoint(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(
            doc.paths.paths.contains_key(path),
            "missing path {path}"
        );
    }

    #[test]
    fn document_serializes_to_json() {
        let json = ApiDoc::openapi().to_json().expect("serialize document");
        assert!(json.contains("Admission queue API"));
    }
}
