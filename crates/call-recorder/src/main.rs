//! Call-Recorder: records phone calls driven by line-state notifications.

mod app;
mod app_command;
mod config;
mod contact_book;
mod error;
mod logging;
mod notifier;
mod server;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    contact_book::ContactBook,
    error::{AppError, Result as AppResult},
    notifier::DesktopNotifier,
};

use crate::{config::Config, server::ServerState};

use call_recorder_core::{
    CallMonitor, CaptureSource, FileSessionStore, RecorderWorker, RecordingOrchestrator,
    SessionStore, WavCaptureDevice, WorkerExit,
};

use std::{path::PathBuf, sync::Arc};

use tokio::sync::{Mutex, mpsc, watch};
use tracing::{error, info, warn};

/// Bounded so a flood of notifications cannot grow memory without limit.
const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Application entry point.
fn main() {
    let data_dir = match Config::data_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to resolve data directory: {}", e);
            std::process::exit(1);
        }
    };

    // Flushes buffered log lines on exit.
    let _log_guard = match logging::init(&data_dir.join("logs")) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    let config_path = match Config::config_path() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to resolve config path: {:?}", e);
            std::process::exit(1);
        }
    };

    let config = match Config::load_from(&config_path, &data_dir) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    check_capture_devices(&config);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(config, config_path)) {
        error!(error = ?e, "Call recorder failed");
        std::process::exit(1);
    }
}

/// Wire the recorder, the application loop and the HTTP API, and run until
/// shutdown.
async fn run(config: Config, config_path: PathBuf) -> AppResult<()> {
    let store: Arc<dyn SessionStore> =
        Arc::new(FileSessionStore::open(&config.storage.index_path)?);

    let contacts = ContactBook::load(&Config::contacts_path()?)?;

    let (settings_tx, settings_rx) = watch::channel(config.recording);

    let orchestrator = RecordingOrchestrator::new(
        Box::new(WavCaptureDevice::new(
            CaptureSource::Primary,
            config.capture.primary_device.clone(),
        )),
        Box::new(WavCaptureDevice::new(
            CaptureSource::Fallback,
            config.capture.fallback_device.clone(),
        )),
        Arc::clone(&store),
        Box::new(settings_rx),
        config.storage.recordings_dir.clone(),
    )
    .with_contacts(Box::new(contacts))
    .with_status_sink(Box::new(DesktopNotifier));

    let (worker, recorder) = RecorderWorker::new(orchestrator);
    let status_rx = worker.subscribe_status();
    let worker_thread = worker
        .exit_on_capture_exhausted(config.behaviour.shutdown_on_capture_failure)
        .spawn()?;

    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Worker exit (requested or not) ends the application.
    let worker_watch = {
        let command_tx = command_tx.clone();
        tokio::task::spawn_blocking(move || {
            let exit = match worker_thread.join() {
                Ok(exit) => exit,
                Err(_) => {
                    error!("Recorder worker panicked");
                    WorkerExit::Disconnected
                }
            };
            if exit == WorkerExit::CaptureExhausted {
                warn!("No capture source available, shutting down");
            }
            let _ = command_tx.blocking_send(AppCommand::Shutdown);
            exit
        })
    };

    {
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received");
                let _ = command_tx.send(AppCommand::Shutdown).await;
            }
        });
    }

    let port = config.server.port;
    let server_command_tx = command_tx.clone();
    info!(url = %config.server_url(), "Starting call recorder");

    let state = ServerState {
        store,
        commands: command_tx,
        status: status_rx,
        settings: Arc::new(settings_tx),
        config: Arc::new(Mutex::new(config)),
        config_path: Arc::new(config_path),
    };

    let app = App {
        monitor: CallMonitor::new(recorder.clone()),
        recorder,
        command_rx,
        shutdown_tx,
    };

    let (server_result, app_result) = tokio::join!(
        async {
            let result = server::serve(state, port, shutdown_rx).await;
            if let Err(e) = &result {
                error!(error = ?e, "HTTP API error");
                let _ = server_command_tx.send(AppCommand::Shutdown).await;
            }
            result
        },
        app.run()
    );

    match worker_watch.await {
        Ok(exit) => info!(exit = ?exit, "Recorder worker finished"),
        Err(e) => error!(error = ?e, "Worker watcher task failed"),
    }

    app_result?;
    server_result
}

/// Warn about configured input devices the audio host does not report.
///
/// Capture still falls back at record time; this only surfaces typos early.
fn check_capture_devices(config: &Config) {
    match WavCaptureDevice::input_device_names() {
        Ok(available) => {
            info!(devices = ?available, "Input devices available");
            for name in config.capture.missing_devices(&available) {
                warn!(device = name, "Configured input device not found");
            }
        }
        Err(e) => warn!(error = %e, "Failed to list input devices"),
    }
}
