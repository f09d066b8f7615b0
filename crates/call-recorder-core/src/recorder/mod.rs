mod collaborators;
pub(crate) mod naming;
mod orchestrator;
mod settings;
mod status;
mod worker;

pub use {
    collaborators::{ContactLookup, StatusSink},
    naming::{UNKNOWN_NUMBER_SLUG, recording_file_name, sanitize_number, unique_recording_path},
    orchestrator::{RecordingOrchestrator, StartOutcome, StopOutcome, UNKNOWN_LABEL},
    settings::{RecordingSettings, SettingsProvider},
    status::RecorderStatus,
    worker::{RecorderCommand, RecorderHandle, RecorderWorker, WorkerExit},
};
