use crate::{CallDirection, RecordingQuality};

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counterpart number stored when the platform never reported one.
pub const UNKNOWN_NUMBER: &str = "Unknown";

/// Whether the backing file of a session is still on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// The recording file exists.
    Present,
    /// The row points at a file that is gone.
    Lost,
}

/// One completed call recording, as persisted in the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSession {
    /// Store-assigned identifier, monotonic and never reused.
    pub id: u64,
    /// Remote party number.
    pub counterpart_number: String,
    /// Contact display name resolved when the recording stopped.
    pub contact_name: Option<String>,
    /// Direction of the call.
    pub direction: CallDirection,
    /// When the capture started.
    pub started_at: DateTime<Utc>,
    /// Length of the capture.
    pub duration_millis: u64,
    /// Location of the audio file.
    pub file_path: PathBuf,
    /// Size of the audio file when it was finalized.
    pub file_size_bytes: u64,
    /// Quality preset the session was recorded at.
    #[serde(deserialize_with = "RecordingQuality::deserialize_lenient")]
    pub quality: RecordingQuality,
}

impl RecordingSession {
    /// Check the backing file on disk.
    pub fn file_status(&self) -> FileStatus {
        if self.file_path.is_file() {
            FileStatus::Present
        } else {
            FileStatus::Lost
        }
    }
}

/// A finished session waiting for the store to assign its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecordingSession {
    /// Remote party number.
    pub counterpart_number: String,
    /// Contact display name, if the lookup resolved.
    pub contact_name: Option<String>,
    /// Direction of the call.
    pub direction: CallDirection,
    /// When the capture started.
    pub started_at: DateTime<Utc>,
    /// Length of the capture.
    pub duration_millis: u64,
    /// Location of the audio file.
    pub file_path: PathBuf,
    /// Size of the finalized file.
    pub file_size_bytes: u64,
    /// Quality preset used for the capture.
    pub quality: RecordingQuality,
}

impl NewRecordingSession {
    pub(crate) fn with_id(self, id: u64) -> RecordingSession {
        RecordingSession {
            id,
            counterpart_number: self.counterpart_number,
            contact_name: self.contact_name,
            direction: self.direction,
            started_at: self.started_at,
            duration_millis: self.duration_millis,
            file_path: self.file_path,
            file_size_bytes: self.file_size_bytes,
            quality: self.quality,
        }
    }
}
