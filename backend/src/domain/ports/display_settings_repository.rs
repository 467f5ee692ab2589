//! Port for the display board video record.

use async_trait::async_trait;

use crate::domain::DisplayVideoSettings;

use super::define_port_error;

define_port_error! {
    /// Errors raised by display settings adapters.
    pub enum DisplaySettingsRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "display settings repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "display settings repository query failed: {message}",
    }
}

/// Port for the single display video record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DisplaySettingsRepository: Send + Sync {
    /// Saved record, if one exists.
    async fn load_video(&self)
    -> Result<Option<DisplayVideoSettings>, DisplaySettingsRepositoryError>;

    /// Insert or replace the record.
    async fn save_video(
        &self,
        settings: &DisplayVideoSettings,
    ) -> Result<(), DisplaySettingsRepositoryError>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn query_error_formats_message() {
        let err = DisplaySettingsRepositoryError::query("relation missing");
        assert!(err.to_string().contains("query failed: relation missing"));
    }
}
