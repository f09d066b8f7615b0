//! Single-consumer command queue in front of the orchestrator.
//!
//! Notification delivery must never wait on disk or device latency, so
//! start/stop requests are queued and executed one at a time, in arrival
//! order, on a dedicated thread that exclusively owns the
//! [`RecordingOrchestrator`].

use crate::{
    CallContext, CoreError, CoreResult, RecorderStatus, RecordingOrchestrator, StartOutcome,
};

use std::{panic::Location, thread::JoinHandle};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Commands accepted by the recorder worker.
#[derive(Debug, Clone)]
pub enum RecorderCommand {
    /// Start recording a call.
    Start(CallContext),
    /// Stop the active recording.
    Stop,
    /// Finish any active recording and exit the worker.
    Shutdown,
}

/// Why the worker loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// A [`RecorderCommand::Shutdown`] was processed.
    Shutdown,
    /// Every [`RecorderHandle`] was dropped.
    Disconnected,
    /// Both capture sources failed and the worker was told to give up.
    CaptureExhausted,
}

/// Cheap, cloneable sender of recorder commands.
///
/// Sending never blocks, so it is safe to call from notification callbacks.
#[derive(Debug, Clone)]
pub struct RecorderHandle {
    tx: mpsc::UnboundedSender<RecorderCommand>,
}

impl RecorderHandle {
    /// Queue a start request.
    #[track_caller]
    pub fn start(&self, context: CallContext) -> CoreResult<()> {
        self.send(RecorderCommand::Start(context))
    }

    /// Queue a stop request.
    #[track_caller]
    pub fn stop(&self) -> CoreResult<()> {
        self.send(RecorderCommand::Stop)
    }

    /// Ask the worker to finish and exit.
    #[track_caller]
    pub fn shutdown(&self) -> CoreResult<()> {
        self.send(RecorderCommand::Shutdown)
    }

    #[track_caller]
    fn send(&self, command: RecorderCommand) -> CoreResult<()> {
        self.tx
            .send(command)
            .map_err(|e| CoreError::ChannelClosed {
                message: format!("Recorder worker stopped, dropped {:?}", e.0),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// Owns the orchestrator and drains the command queue.
pub struct RecorderWorker {
    orchestrator: RecordingOrchestrator,
    rx: mpsc::UnboundedReceiver<RecorderCommand>,
    exit_on_exhausted: bool,
}

impl RecorderWorker {
    /// Create a worker and the handle that feeds it.
    pub fn new(orchestrator: RecordingOrchestrator) -> (Self, RecorderHandle) {
        let (tx, rx) = mpsc::unbounded_channel();

        let worker = Self {
            orchestrator,
            rx,
            exit_on_exhausted: false,
        };

        (worker, RecorderHandle { tx })
    }

    /// Exit with [`WorkerExit::CaptureExhausted`] when both capture sources fail.
    pub fn exit_on_capture_exhausted(mut self, enabled: bool) -> Self {
        self.exit_on_exhausted = enabled;
        self
    }

    /// Observe the recorder status.
    pub fn subscribe_status(&self) -> watch::Receiver<RecorderStatus> {
        self.orchestrator.subscribe_status()
    }

    /// Run the worker on a dedicated thread.
    #[track_caller]
    pub fn spawn(self) -> CoreResult<JoinHandle<WorkerExit>> {
        std::thread::Builder::new()
            .name("recorder".to_string())
            .spawn(move || self.run())
            .map_err(|e| CoreError::ChannelClosed {
                message: format!("Failed to spawn recorder thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Process commands until shutdown. Blocks the calling thread.
    ///
    /// Must not be called from inside an async runtime.
    #[instrument(skip(self))]
    pub fn run(mut self) -> WorkerExit {
        info!("Recorder worker started");

        let exit = loop {
            let Some(command) = self.rx.blocking_recv() else {
                info!("All recorder handles dropped");
                break WorkerExit::Disconnected;
            };

            debug!(command = ?command, "Recorder command received");

            match command {
                RecorderCommand::Start(context) => {
                    let outcome = self.orchestrator.start(context);
                    if outcome == StartOutcome::Exhausted && self.exit_on_exhausted {
                        warn!("No capture source available, recorder worker exiting");
                        break WorkerExit::CaptureExhausted;
                    }
                }
                RecorderCommand::Stop => {
                    self.orchestrator.stop();
                }
                RecorderCommand::Shutdown => {
                    info!("Recorder shutdown requested");
                    break WorkerExit::Shutdown;
                }
            }
        };

        // Commit whatever is still running before the thread ends.
        self.orchestrator.stop();

        info!(exit = ?exit, "Recorder worker stopped");
        exit
    }
}
