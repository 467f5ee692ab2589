//! Display board administration endpoints.
//!
//! ```text
//! GET /api/v1/admin/video-settings
//! PUT /api/v1/admin/video-settings
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DisplayVideoSettings, DisplayVideoUpdate};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Video looped on the public display board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoSettingsBody {
    /// Empty when no video is set.
    pub youtube_url: String,
    pub is_enabled: bool,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<DisplayVideoSettings> for VideoSettingsBody {
    fn from(settings: DisplayVideoSettings) -> Self {
        Self {
            youtube_url: settings.youtube_url,
            is_enabled: settings.enabled,
            updated_at: settings.updated_at.to_rfc3339(),
        }
    }
}

/// Video settings update; absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoSettingsRequestBody {
    pub youtube_url: Option<String>,
    pub is_enabled: Option<bool>,
}

impl From<UpdateVideoSettingsRequestBody> for DisplayVideoUpdate {
    fn from(body: UpdateVideoSettingsRequestBody) -> Self {
        Self {
            youtube_url: body.youtube_url,
            enabled: body.is_enabled,
        }
    }
}

/// Current display video settings.
#[utoipa::path(
    get,
    path = "/api/v1/admin/video-settings",
    responses((status = 200, description = "Display video settings", body = VideoSettingsBody)),
    tags = ["admin"],
    operation_id = "getVideoSettings"
)]
#[get("/admin/video-settings")]
pub async fn get_video_settings(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<VideoSettingsBody>> {
    let settings = state.display.video_settings().await?;
    Ok(web::Json(settings.into()))
}

/// Update the display video settings.
#[utoipa::path(
    put,
    path = "/api/v1/admin/video-settings",
    request_body = UpdateVideoSettingsRequestBody,
    responses(
        (status = 200, description = "Saved settings", body = VideoSettingsBody),
        (status = 400, description = "Invalid request", body = crate::domain::Error)
    ),
    tags = ["admin"],
    operation_id = "updateVideoSettings"
)]
#[put("/admin/video-settings")]
pub async fn update_video_settings(
    state: web::Data<HttpState>,
    payload: web::Json<UpdateVideoSettingsRequestBody>,
) -> ApiResult<web::Json<VideoSettingsBody>> {
    let settings = state
        .display
        .update_video_settings(payload.into_inner().into())
        .await?;
    Ok(web::Json(settings.into()))
}

#[cfg(test)]
mod tests {
    //! Tests for the display video handlers.

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    use crate::domain::{DisplayVideoSettings, Error};
    use crate::inbound::http::test_utils::{MockPorts, fixed_now};

    #[actix_web::test]
    async fn get_returns_camel_case_settings() {
        let mut ports = MockPorts::default();
        ports.display.expect_video_settings().return_once(|| {
            let mut settings = DisplayVideoSettings::defaults(fixed_now());
            settings.youtube_url = "https://youtu.be/campus".to_owned();
            settings.enabled = true;
            Ok(settings)
        });
        let app = actix_test::init_service(ports.into_app()).await;

        let body: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/video-settings")
                .to_request(),
        )
        .await;

        assert_eq!(body["youtubeUrl"], "https://youtu.be/campus");
        assert_eq!(body["isEnabled"], true);
        assert_eq!(body["updatedAt"], fixed_now().to_rfc3339());
    }

    #[actix_web::test]
    async fn put_forwards_only_present_fields() {
        let mut ports = MockPorts::default();
        ports
            .display
            .expect_update_video_settings()
            .withf(|update| update.enabled == Some(false) && update.youtube_url.is_none())
            .times(1)
            .returning(|update| {
                let mut settings = DisplayVideoSettings::defaults(fixed_now());
                settings.enabled = true;
                update.apply(&mut settings, fixed_now());
                Ok(settings)
            });
        let app = actix_test::init_service(ports.into_app()).await;

        let body: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::put()
                .uri("/api/v1/admin/video-settings")
                .set_json(json!({ "isEnabled": false }))
                .to_request(),
        )
        .await;

        assert_eq!(body["isEnabled"], false);
        assert_eq!(body["youtubeUrl"], "");
    }

    #[actix_web::test]
    async fn repository_outage_is_service_unavailable() {
        let mut ports = MockPorts::default();
        ports
            .display
            .expect_video_settings()
            .return_once(|| Err(Error::service_unavailable("database down")));
        let app = actix_test::init_service(ports.into_app()).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/admin/video-settings")
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
