//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers live in one module per audience: `public` for visitors and the
//! display board, `admission` for staff at their desks, and `admin`,
//! `archive`, `display`, and `sync` for the back office. [`configure_api`] registers
//! all of them relative to the `/api/v1` scope.

use actix_web::web;

pub mod admin;
pub mod admission;
pub mod archive;
pub mod display;
pub mod dto;
pub mod error;
pub mod health;
pub mod public;
pub mod state;
pub mod sync;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

/// Register every API handler and the extractor error handlers.
///
/// Literal paths are registered ahead of parameterised siblings so that,
/// for example, `/public/queue/count` never resolves as an entry id.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use admission_queue::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config());

    cfg.service(public::join_queue)
        .service(public::check_queue)
        .service(public::queue_count)
        .service(public::cancel_entry)
        .service(public::move_back)
        .service(public::display_queue)
        .service(public::list_employees);

    cfg.service(admission::start_work)
        .service(admission::pause_work)
        .service(admission::resume_work)
        .service(admission::finish_work)
        .service(admission::complete_current)
        .service(admission::call_next)
        .service(admission::desk_status)
        .service(admission::assigned_queue)
        .service(admission::update_entry)
        .service(admission::delete_entry);

    cfg.service(admin::list_employees)
        .service(admin::create_employee)
        .service(admin::update_employee)
        .service(admin::delete_employee)
        .service(admin::list_queue)
        .service(admin::bulk_delete_queue)
        .service(admin::reset_numbering)
        .service(admin::delete_queue_entry);

    cfg.service(archive::list_archive)
        .service(archive::cleanup_archive)
        .service(archive::preview_cleanup)
        .service(archive::bulk_delete_archive)
        .service(archive::delete_archive_entry);

    cfg.service(display::get_video_settings)
        .service(display::update_video_settings);

    cfg.service(sync::get_settings)
        .service(sync::update_settings)
        .service(sync::sync_status)
        .service(sync::full_sync)
        .service(sync::manual_sync)
        .service(sync::test_connection)
        .service(sync::sync_stats)
        .service(sync::sync_health);
}
