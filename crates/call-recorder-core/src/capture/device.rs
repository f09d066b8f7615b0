use crate::{CoreResult, RecordingQuality};

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which capture path a device represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    /// Preferred call-audio path.
    Primary,
    /// Lower-guarantee path used only when the primary cannot be acquired.
    Fallback,
}

impl fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureSource::Primary => f.write_str("primary"),
            CaptureSource::Fallback => f.write_str("fallback"),
        }
    }
}

/// Proof of an open capture, returned by [`CaptureDevice::acquire`].
///
/// Only the device that issued the handle can release it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureHandle {
    /// Unique identifier for log correlation and ownership checks.
    pub id: Uuid,
    /// Source of the device that issued the handle.
    pub source: CaptureSource,
    /// File being written.
    pub path: PathBuf,
}

impl CaptureHandle {
    /// Issue a new handle for `path`.
    pub fn new(source: CaptureSource, path: &Path) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            path: path.to_path_buf(),
        }
    }
}

/// A capture file that has been flushed and closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedFile {
    /// Location of the file.
    pub path: PathBuf,
    /// Size on disk after finalization.
    pub size_bytes: u64,
}

/// Exclusive audio-capture resource.
///
/// A device owns at most one open capture. `acquire` while a handle is open
/// fails with [`CoreError::CaptureBusy`](crate::CoreError::CaptureBusy).
/// `release` must leave the destination file readable, possibly truncated,
/// even when the capture was interrupted.
pub trait CaptureDevice: Send {
    /// Source this device stands for.
    fn source(&self) -> CaptureSource;

    /// File extension (without dot) of the files this device writes.
    fn file_extension(&self) -> &'static str;

    /// Open the device and start writing audio to `destination`.
    fn acquire(&mut self, quality: RecordingQuality, destination: &Path)
    -> CoreResult<CaptureHandle>;

    /// Stop capturing, flush and close the file behind `handle`.
    fn release(&mut self, handle: CaptureHandle) -> CoreResult<FinalizedFile>;
}
