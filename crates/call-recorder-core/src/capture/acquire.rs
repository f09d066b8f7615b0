use crate::{CaptureDevice, CaptureHandle, CoreError, RecordingQuality};

use std::path::Path;

use tracing::{info, instrument, warn};

/// Result of the two-attempt acquisition chain.
#[derive(Debug)]
pub enum AcquireOutcome {
    /// One of the two sources is now capturing.
    Acquired(CaptureHandle),
    /// Both sources failed; nothing is capturing.
    Exhausted {
        /// Why the primary source failed.
        primary: CoreError,
        /// Why the fallback source failed.
        fallback: CoreError,
    },
}

/// Acquire `primary`, retrying exactly once on `fallback` with the same
/// quality and destination.
///
/// There is no timeout and no backoff: the capture hardware is contended and
/// a call cannot wait, so two attempts is the whole budget.
#[instrument(skip(primary, fallback))]
pub fn acquire_with_fallback(
    primary: &mut dyn CaptureDevice,
    fallback: &mut dyn CaptureDevice,
    quality: RecordingQuality,
    destination: &Path,
) -> AcquireOutcome {
    let primary_error = match primary.acquire(quality, destination) {
        Ok(handle) => {
            info!(handle_id = %handle.id, "Capture acquired on primary source");
            return AcquireOutcome::Acquired(handle);
        }
        Err(e) => e,
    };

    warn!(error = %primary_error, "Primary capture source failed, trying fallback");

    match fallback.acquire(quality, destination) {
        Ok(handle) => {
            info!(handle_id = %handle.id, "Capture acquired on fallback source");
            AcquireOutcome::Acquired(handle)
        }
        Err(fallback_error) => AcquireOutcome::Exhausted {
            primary: primary_error,
            fallback: fallback_error,
        },
    }
}
