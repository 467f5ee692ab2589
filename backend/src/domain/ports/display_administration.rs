//! Driving port for the display board settings.

use async_trait::async_trait;

use crate::domain::{DisplayVideoSettings, DisplayVideoUpdate, Error};

/// Display board administration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DisplayAdministration: Send + Sync {
    /// Current video settings, created with defaults on first read.
    async fn video_settings(&self) -> Result<DisplayVideoSettings, Error>;

    /// Apply a partial update and return the saved settings.
    async fn update_video_settings(
        &self,
        update: DisplayVideoUpdate,
    ) -> Result<DisplayVideoSettings, Error>;
}
