use crate::CaptureSource;

use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use thiserror::Error;

/// Call recording errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The capture device already has an open handle, or the OS reports it busy.
    #[error("Capture device busy ({source_kind}): {reason} {location}")]
    CaptureBusy {
        /// Which capture source reported the condition.
        source_kind: CaptureSource,
        /// Description of the busy condition.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture device cannot satisfy the requested quality or does not exist.
    #[error("Capture unsupported ({source_kind}): {reason} {location}")]
    CaptureUnsupported {
        /// Which capture source reported the condition.
        source_kind: CaptureSource,
        /// Description of what is unsupported.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Opening or writing the destination file failed.
    #[error("Capture I/O failure ({source_kind}) for {path:?}: {reason} {location}")]
    CaptureIo {
        /// Which capture source reported the condition.
        source_kind: CaptureSource,
        /// Destination file of the capture.
        path: PathBuf,
        /// Description of the I/O failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture could not be flushed and closed cleanly.
    #[error("Failed to finalize {path:?}: {reason} {location}")]
    FlushFailed {
        /// File that could not be finalized.
        path: PathBuf,
        /// Description of the flush failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Converting captured audio to the preset's rate failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingFailed {
        /// Description of the resampling failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A handle was released on a device that does not own it.
    #[error("Capture handle {handle_id} is not open on this device {location}")]
    InvalidHandle {
        /// Identifier of the rejected handle.
        handle_id: uuid::Uuid,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Session store file operation failed.
    #[error("Session store I/O error: {source} {location}")]
    StoreIo {
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Session store index could not be encoded or decoded.
    #[error("Session store format error: {reason} {location}")]
    StoreFormat {
        /// Description of the format problem.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Contact lookup failed.
    #[error("Contact lookup failed: {reason} {location}")]
    ContactLookupFailed {
        /// Description of the lookup failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The status sink could not deliver a signal.
    #[error("Status sink failed: {reason} {location}")]
    StatusSinkFailed {
        /// Description of the delivery failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recorder worker is no longer accepting commands.
    #[error("Channel closed: {message} {location}")]
    ChannelClosed {
        /// Human-readable error message.
        message: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for CoreError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        CoreError::StoreIo {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
