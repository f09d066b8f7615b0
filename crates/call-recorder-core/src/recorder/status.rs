use crate::{CallDirection, CaptureSource};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Externally observable recorder state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecorderStatus {
    /// Nothing is being recorded.
    #[default]
    Idle,
    /// A call is being recorded.
    Recording {
        /// Contact name or number of the other party.
        label: String,
        /// Direction of the call.
        direction: CallDirection,
        /// Capture source that is writing the file.
        source: CaptureSource,
        /// When the capture started.
        started_at: DateTime<Utc>,
    },
}

impl RecorderStatus {
    /// Whether a recording is in progress.
    pub fn is_recording(&self) -> bool {
        matches!(self, RecorderStatus::Recording { .. })
    }
}
