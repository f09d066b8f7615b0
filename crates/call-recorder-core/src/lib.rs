//! Call-recorder Core Library
//!
//! Turns telephony line-state notifications into call recordings: a pure
//! state machine decides when a call is active, a single recorder worker
//! drives an exclusive capture device (primary source, one fallback retry),
//! and finished recordings are committed to a durable session store.
//!
//! # Example
//!
//! ```no_run
//! use call_recorder_core::{
//!     CallMonitor, CaptureSource, CoreResult, FileSessionStore, LineNotification, LineState,
//!     RecorderWorker, RecordingOrchestrator, RecordingSettings, WavCaptureDevice,
//! };
//!
//! use std::{path::PathBuf, sync::Arc};
//!
//! fn main() -> CoreResult<()> {
//!     let store = Arc::new(FileSessionStore::open(&PathBuf::from("data/recordings.json"))?);
//!
//!     let orchestrator = RecordingOrchestrator::new(
//!         Box::new(WavCaptureDevice::new(CaptureSource::Primary, Some("Call Audio".into()))),
//!         Box::new(WavCaptureDevice::new(CaptureSource::Fallback, None)),
//!         store,
//!         Box::new(RecordingSettings::default()),
//!         PathBuf::from("data/CallRecordings"),
//!     );
//!
//!     let (worker, recorder) = RecorderWorker::new(orchestrator);
//!     let worker_thread = worker.spawn()?;
//!
//!     let mut monitor = CallMonitor::new(recorder.clone());
//!     monitor.on_notification(LineNotification::state(LineState::Ringing, Some("+1555")))?;
//!     monitor.on_notification(LineNotification::state(LineState::Offhook, None))?;
//!     monitor.on_notification(LineNotification::state(LineState::Idle, None))?;
//!
//!     recorder.shutdown()?;
//!     let _ = worker_thread.join();
//!     Ok(())
//! }
//! ```

mod call;
mod capture;
mod error;
mod recorder;
mod store;

pub use {
    call::{
        CallContext, CallDirection, CallEvent, CallMonitor, CallStateMachine, LineNotification,
        LineState,
    },
    capture::{
        AcquireOutcome, CaptureDevice, CaptureHandle, CaptureSource, FinalizedFile,
        RecordingQuality, WavCaptureDevice, acquire_with_fallback,
    },
    error::{CoreError, Result as CoreResult},
    recorder::{
        ContactLookup, RecorderCommand, RecorderHandle, RecorderStatus, RecorderWorker,
        RecordingOrchestrator, RecordingSettings, SettingsProvider, StartOutcome, StatusSink,
        StopOutcome, UNKNOWN_LABEL, UNKNOWN_NUMBER_SLUG, WorkerExit, recording_file_name,
        sanitize_number, unique_recording_path,
    },
    store::{
        FileSessionStore, FileStatus, NewRecordingSession, RecordingSession, SessionStore,
        UNKNOWN_NUMBER,
    },
};

#[cfg(test)]
mod tests;
