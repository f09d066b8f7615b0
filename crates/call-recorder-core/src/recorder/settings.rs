use crate::RecordingQuality;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

pub(crate) const DEFAULT_AUTO_RECORD: bool = true;
pub(crate) const DEFAULT_SHOW_NOTIFICATION: bool = true;

fn default_auto_record() -> bool {
    DEFAULT_AUTO_RECORD
}

fn default_show_notification() -> bool {
    DEFAULT_SHOW_NOTIFICATION
}

/// User-facing recording preferences, read once per recording start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSettings {
    /// Record every call automatically.
    #[serde(default = "default_auto_record")]
    pub auto_record: bool,
    /// Quality preset for new recordings.
    #[serde(default, deserialize_with = "RecordingQuality::deserialize_lenient")]
    pub quality: RecordingQuality,
    /// Show a notification while a recording is running.
    #[serde(default = "default_show_notification")]
    pub show_notification: bool,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            auto_record: DEFAULT_AUTO_RECORD,
            quality: RecordingQuality::default(),
            show_notification: DEFAULT_SHOW_NOTIFICATION,
        }
    }
}

/// Source of the current [`RecordingSettings`].
///
/// The value may change at any time; the recorder samples it once per start.
pub trait SettingsProvider: Send {
    /// Current settings.
    fn current(&self) -> RecordingSettings;
}

impl SettingsProvider for RecordingSettings {
    fn current(&self) -> RecordingSettings {
        *self
    }
}

impl SettingsProvider for watch::Receiver<RecordingSettings> {
    fn current(&self) -> RecordingSettings {
        *self.borrow()
    }
}
