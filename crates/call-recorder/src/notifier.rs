use call_recorder_core::{CoreError, CoreResult, StatusSink};

use std::panic::Location;

use error_location::ErrorLocation;
use notify_rust::Notification;
use tracing::debug;

const APP_NAME: &str = "call-recorder";

/// Desktop notifications for recording start and stop.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    #[track_caller]
    fn show(&self, summary: &str, body: &str) -> CoreResult<()> {
        Notification::new()
            .appname(APP_NAME)
            .summary(summary)
            .body(body)
            .show()
            .map_err(|e| CoreError::StatusSinkFailed {
                reason: format!("Failed to show notification: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(summary, "Notification shown");
        Ok(())
    }
}

impl StatusSink for DesktopNotifier {
    fn recording_started(&self, label: &str) -> CoreResult<()> {
        self.show("Recording call", label)
    }

    fn recording_stopped(&self) -> CoreResult<()> {
        self.show("Recording stopped", "The call recording has ended")
    }
}
