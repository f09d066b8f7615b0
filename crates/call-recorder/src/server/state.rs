use crate::{AppCommand, config::Config, server::ApiError};

use call_recorder_core::{RecorderStatus, RecordingSettings, SessionStore};

use std::{path::PathBuf, sync::Arc};

use tokio::sync::{Mutex, mpsc, watch};

/// Shared handles the API handlers work with.
#[derive(Clone)]
pub(crate) struct ServerState {
    pub(crate) store: Arc<dyn SessionStore>,
    pub(crate) commands: mpsc::Sender<AppCommand>,
    pub(crate) status: watch::Receiver<RecorderStatus>,
    pub(crate) settings: Arc<watch::Sender<RecordingSettings>>,
    pub(crate) config: Arc<Mutex<Config>>,
    pub(crate) config_path: Arc<PathBuf>,
}

impl ServerState {
    /// Hand a command to the application loop.
    pub(crate) async fn enqueue(&self, command: AppCommand) -> Result<(), ApiError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ApiError::unavailable("Application is shutting down"))
    }
}
