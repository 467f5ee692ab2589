//! Display board settings service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    DisplayAdministration, DisplaySettingsRepository, DisplaySettingsRepositoryError,
};
use crate::domain::{DisplayVideoSettings, DisplayVideoUpdate, Error};

fn map_display_error(error: DisplaySettingsRepositoryError) -> Error {
    match error {
        DisplaySettingsRepositoryError::Connection { message } => Error::service_unavailable(
            format!("display settings repository unavailable: {message}"),
        ),
        DisplaySettingsRepositoryError::Query { message } => {
            Error::internal(format!("display settings repository error: {message}"))
        }
    }
}

/// Service implementing [`DisplayAdministration`].
#[derive(Clone)]
pub struct DisplaySettingsService<R: ?Sized> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> DisplaySettingsService<R> {
    /// Create the service over the display settings repository.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

impl<R> DisplaySettingsService<R>
where
    R: DisplaySettingsRepository + ?Sized,
{
    async fn load_or_create(&self) -> Result<DisplayVideoSettings, Error> {
        if let Some(settings) = self.repo.load_video().await.map_err(map_display_error)? {
            return Ok(settings);
        }
        let defaults = DisplayVideoSettings::defaults(self.clock.utc());
        self.repo
            .save_video(&defaults)
            .await
            .map_err(map_display_error)?;
        Ok(defaults)
    }
}

#[async_trait]
impl<R> DisplayAdministration for DisplaySettingsService<R>
where
    R: DisplaySettingsRepository + ?Sized,
{
    async fn video_settings(&self) -> Result<DisplayVideoSettings, Error> {
        self.load_or_create().await
    }

    async fn update_video_settings(
        &self,
        update: DisplayVideoUpdate,
    ) -> Result<DisplayVideoSettings, Error> {
        let mut settings = self.load_or_create().await?;
        update.apply(&mut settings, self.clock.utc());
        self.repo
            .save_video(&settings)
            .await
            .map_err(map_display_error)?;
        info!(enabled = settings.enabled, "display video updated");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockDisplaySettingsRepository;
    use crate::test_support::MutableClock;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn service(
        repo: MockDisplaySettingsRepository,
    ) -> DisplaySettingsService<MockDisplaySettingsRepository> {
        DisplaySettingsService::new(Arc::new(repo), Arc::new(MutableClock::new(now())))
    }

    #[rstest]
    #[tokio::test]
    async fn first_read_saves_defaults() {
        let mut repo = MockDisplaySettingsRepository::new();
        repo.expect_load_video().return_once(|| Ok(None));
        repo.expect_save_video()
            .withf(|settings| settings.youtube_url.is_empty() && !settings.enabled)
            .times(1)
            .return_once(|_| Ok(()));

        let settings = service(repo).video_settings().await.expect("read succeeds");
        assert_eq!(settings, DisplayVideoSettings::defaults(now()));
    }

    #[rstest]
    #[tokio::test]
    async fn saved_record_is_returned_untouched() {
        let mut stored = DisplayVideoSettings::defaults(now());
        stored.youtube_url = "https://youtu.be/tour".to_owned();
        let expected = stored.clone();
        let mut repo = MockDisplaySettingsRepository::new();
        repo.expect_load_video().return_once(move || Ok(Some(stored)));
        repo.expect_save_video().never();

        let settings = service(repo).video_settings().await.expect("read succeeds");
        assert_eq!(settings, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn update_persists_present_fields() {
        let mut repo = MockDisplaySettingsRepository::new();
        repo.expect_load_video()
            .return_once(|| Ok(Some(DisplayVideoSettings::defaults(now()))));
        repo.expect_save_video()
            .withf(|settings| settings.enabled && settings.youtube_url.is_empty())
            .times(1)
            .return_once(|_| Ok(()));

        let settings = service(repo)
            .update_video_settings(DisplayVideoUpdate {
                youtube_url: None,
                enabled: Some(true),
            })
            .await
            .expect("update succeeds");
        assert!(settings.enabled);
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failure_is_service_unavailable() {
        let mut repo = MockDisplaySettingsRepository::new();
        repo.expect_load_video()
            .return_once(|| Err(DisplaySettingsRepositoryError::connection("refused")));

        let err = service(repo)
            .video_settings()
            .await
            .expect_err("repository down");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
