//! Video shown on the public display board between calls.

use chrono::{DateTime, Utc};

/// The single display video record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayVideoSettings {
    /// YouTube link; empty when none is set.
    pub youtube_url: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DisplayVideoSettings {
    /// Record created on first read: no link, switched off.
    #[must_use]
    pub fn defaults(now: DateTime<Utc>) -> Self {
        Self {
            youtube_url: String::new(),
            enabled: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Administrator changes to the display video; absent fields stay as they
/// are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayVideoUpdate {
    pub youtube_url: Option<String>,
    pub enabled: Option<bool>,
}

impl DisplayVideoUpdate {
    /// Apply the present fields onto `settings`.
    pub fn apply(self, settings: &mut DisplayVideoSettings, now: DateTime<Utc>) {
        if let Some(url) = self.youtube_url {
            url.trim().clone_into(&mut settings.youtube_url);
        }
        if let Some(enabled) = self.enabled {
            settings.enabled = enabled;
        }
        settings.updated_at = now;
    }
}
