use crate::{AppCommand, AppResult};

use call_recorder_core::{CallMonitor, CoreError, RecorderHandle};

use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument, warn};

/// Main application state.
///
/// Owns the [`CallMonitor`], so line notifications are applied to the call
/// state machine one at a time, in the order they were received.
pub struct App {
    pub(crate) monitor: CallMonitor,
    pub(crate) recorder: RecorderHandle,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Call recorder starting");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                AppCommand::Line(notification) => {
                    match self.monitor.on_notification(notification) {
                        Ok(_) => {}
                        Err(e @ CoreError::ChannelClosed { .. }) => {
                            error!(error = %e, "Recorder worker is gone, shutting down");
                            break;
                        }
                        Err(e) => error!(error = %e, "Failed to handle line notification"),
                    }
                }
                AppCommand::Shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        // The worker may already have exited on its own.
        if let Err(e) = self.recorder.shutdown() {
            warn!(error = %e, "Recorder worker already stopped");
        }

        let _ = self.shutdown_tx.send(true);
        info!("Call recorder shut down");

        Ok(())
    }
}
