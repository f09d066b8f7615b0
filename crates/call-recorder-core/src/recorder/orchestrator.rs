use crate::{
    AcquireOutcome, CallContext, CaptureDevice, CaptureHandle, CaptureSource, ContactLookup,
    FinalizedFile, NewRecordingSession, RecorderStatus, RecordingQuality, RecordingSession,
    SessionStore, SettingsProvider, StatusSink, UNKNOWN_NUMBER, acquire_with_fallback,
    recorder::naming::unique_recording_path,
};

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use chrono::{DateTime, Local, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Label used when neither a contact name nor a number is known.
pub const UNKNOWN_LABEL: &str = "Unknown number";

/// What [`RecordingOrchestrator::start`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A capture is running.
    Started {
        /// File being written.
        path: PathBuf,
        /// Source that was acquired.
        source: CaptureSource,
    },
    /// A recording was already active; the request was ignored.
    AlreadyActive,
    /// Auto-record is switched off.
    AutoRecordDisabled,
    /// The recordings directory could not be created.
    DestinationUnavailable,
    /// Both capture sources failed; nothing is recording.
    Exhausted,
}

/// What [`RecordingOrchestrator::stop`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// No recording was active.
    NotRecording,
    /// The file was finalized and its session stored.
    Persisted(RecordingSession),
    /// The file was finalized but the session row could not be written.
    PersistFailed {
        /// File left on disk without a row.
        path: PathBuf,
    },
    /// Nothing usable was written; no row was created.
    FinalizeFailed,
}

/// The single in-flight recording.
struct ActiveSession {
    context: CallContext,
    handle: CaptureHandle,
    quality: RecordingQuality,
    started_at: DateTime<Utc>,
    started: Instant,
    notify: bool,
}

/// Owns the active recording and drives capture devices and the session store.
///
/// # Thread Safety
///
/// Not shared. A single [`RecorderWorker`](crate::RecorderWorker) owns the
/// orchestrator and feeds it start/stop commands in arrival order, which is
/// what keeps at most one capture alive.
pub struct RecordingOrchestrator {
    primary: Box<dyn CaptureDevice>,
    fallback: Box<dyn CaptureDevice>,
    store: Arc<dyn SessionStore>,
    settings: Box<dyn SettingsProvider>,
    contacts: Option<Box<dyn ContactLookup>>,
    status_sink: Option<Box<dyn StatusSink>>,
    status_tx: watch::Sender<RecorderStatus>,
    recordings_dir: PathBuf,
    active: Option<ActiveSession>,
}

impl RecordingOrchestrator {
    /// Create an orchestrator with no contact lookup and no status sink.
    pub fn new(
        primary: Box<dyn CaptureDevice>,
        fallback: Box<dyn CaptureDevice>,
        store: Arc<dyn SessionStore>,
        settings: Box<dyn SettingsProvider>,
        recordings_dir: PathBuf,
    ) -> Self {
        let (status_tx, _) = watch::channel(RecorderStatus::Idle);

        Self {
            primary,
            fallback,
            store,
            settings,
            contacts: None,
            status_sink: None,
            status_tx,
            recordings_dir,
            active: None,
        }
    }

    /// Resolve contact names through `contacts`.
    pub fn with_contacts(mut self, contacts: Box<dyn ContactLookup>) -> Self {
        self.contacts = Some(contacts);
        self
    }

    /// Send start/stop signals to `sink` when notifications are enabled.
    pub fn with_status_sink(mut self, sink: Box<dyn StatusSink>) -> Self {
        self.status_sink = Some(sink);
        self
    }

    /// Observe the recorder status.
    pub fn subscribe_status(&self) -> watch::Receiver<RecorderStatus> {
        self.status_tx.subscribe()
    }

    /// Whether a recording is active.
    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Directory new recordings are written to.
    pub fn recordings_dir(&self) -> &Path {
        &self.recordings_dir
    }

    /// Begin recording the call described by `context`.
    #[instrument(skip(self, context), fields(direction = %context.direction, number = ?context.counterpart_number))]
    pub fn start(&mut self, context: CallContext) -> StartOutcome {
        if let Some(active) = &self.active {
            warn!(handle_id = %active.handle.id, "Already recording, ignoring start request");
            return StartOutcome::AlreadyActive;
        }

        let settings = self.settings.current();
        if !settings.auto_record {
            info!("Auto-record is disabled");
            return StartOutcome::AutoRecordDisabled;
        }

        if let Err(e) = fs::create_dir_all(&self.recordings_dir) {
            error!(
                recordings_dir = ?self.recordings_dir,
                error = %e,
                "Failed to create recordings directory"
            );
            return StartOutcome::DestinationUnavailable;
        }

        let path = unique_recording_path(
            &self.recordings_dir,
            context.counterpart_number.as_deref(),
            Local::now().naive_local(),
            self.primary.file_extension(),
        );

        let handle = match acquire_with_fallback(
            self.primary.as_mut(),
            self.fallback.as_mut(),
            settings.quality,
            &path,
        ) {
            AcquireOutcome::Acquired(handle) => handle,
            AcquireOutcome::Exhausted { primary, fallback } => {
                error!(
                    primary_error = %primary,
                    fallback_error = %fallback,
                    "Both capture sources failed, abandoning recording"
                );
                remove_if_present(&path);
                return StartOutcome::Exhausted;
            }
        };

        let label = self.display_label(context.counterpart_number.as_deref());
        let started_at = Utc::now();
        let source = handle.source;

        self.status_tx.send_replace(RecorderStatus::Recording {
            label: label.clone(),
            direction: context.direction,
            source,
            started_at,
        });

        if settings.show_notification
            && let Some(sink) = &self.status_sink
            && let Err(e) = sink.recording_started(&label)
        {
            warn!(error = %e, "Status sink failed on recording start");
        }

        info!(
            handle_id = %handle.id,
            path = ?handle.path,
            source = %source,
            quality = %settings.quality,
            "Recording started"
        );

        self.active = Some(ActiveSession {
            context,
            handle,
            quality: settings.quality,
            started_at,
            started: Instant::now(),
            notify: settings.show_notification,
        });

        StartOutcome::Started { path, source }
    }

    /// Finish the active recording and store its session.
    ///
    /// The active slot is cleared on every path, so a second call is a no-op.
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> StopOutcome {
        let Some(active) = self.active.take() else {
            debug!("No active recording, ignoring stop request");
            return StopOutcome::NotRecording;
        };

        let notify = active.notify;
        let outcome = self.finish(active);

        self.status_tx.send_replace(RecorderStatus::Idle);

        if notify
            && let Some(sink) = &self.status_sink
            && let Err(e) = sink.recording_stopped()
        {
            warn!(error = %e, "Status sink failed on recording stop");
        }

        outcome
    }

    fn finish(&mut self, active: ActiveSession) -> StopOutcome {
        let ActiveSession {
            context,
            handle,
            quality,
            started_at,
            started,
            ..
        } = active;

        let path = handle.path.clone();
        let device = match handle.source {
            CaptureSource::Primary => self.primary.as_mut(),
            CaptureSource::Fallback => self.fallback.as_mut(),
        };

        let finalized = match device.release(handle) {
            Ok(finalized) => finalized,
            Err(e) => match salvage_partial(&path) {
                Some(partial) => {
                    warn!(
                        error = %e,
                        path = ?path,
                        size_bytes = partial.size_bytes,
                        "Capture finalization failed, keeping partially written file"
                    );
                    partial
                }
                None => {
                    error!(error = %e, path = ?path, "Capture finalization failed, nothing to keep");
                    return StopOutcome::FinalizeFailed;
                }
            },
        };

        let duration_millis = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let contact_name = context
            .counterpart_number
            .as_deref()
            .and_then(|number| self.lookup_contact(number));

        let session = NewRecordingSession {
            counterpart_number: context
                .counterpart_number
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_NUMBER.to_string()),
            contact_name,
            direction: context.direction,
            started_at,
            duration_millis,
            file_path: finalized.path.clone(),
            file_size_bytes: finalized.size_bytes,
            quality,
        };

        match self.store.create(session) {
            Ok(session) => {
                info!(
                    id = session.id,
                    duration_ms = duration_millis,
                    size_bytes = session.file_size_bytes,
                    "Recording stopped and saved"
                );
                StopOutcome::Persisted(session)
            }
            Err(e) => {
                error!(
                    error = %e,
                    path = ?finalized.path,
                    "Failed to save recording session, file kept on disk"
                );
                StopOutcome::PersistFailed {
                    path: finalized.path,
                }
            }
        }
    }

    fn lookup_contact(&self, number: &str) -> Option<String> {
        let contacts = self.contacts.as_ref()?;
        match contacts.lookup(number) {
            Ok(name) => name,
            Err(e) => {
                warn!(error = %e, "Contact lookup failed");
                None
            }
        }
    }

    fn display_label(&self, number: Option<&str>) -> String {
        let number = number.filter(|n| !n.is_empty());
        number
            .and_then(|n| self.lookup_contact(n))
            .or_else(|| number.map(str::to_string))
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
    }
}

impl Drop for RecordingOrchestrator {
    fn drop(&mut self) {
        if self.active.is_some() {
            warn!("Recorder dropped with an active recording, finalizing");
            let _ = self.stop();
        }
    }
}

/// Keep a file that failed to finalize if any bytes reached the disk.
fn salvage_partial(path: &Path) -> Option<FinalizedFile> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Some(FinalizedFile {
            path: path.to_path_buf(),
            size_bytes: meta.len(),
        }),
        Ok(_) => {
            remove_if_present(path);
            None
        }
        Err(_) => None,
    }
}

fn remove_if_present(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = ?path, "Removed unused recording file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = ?path, error = %e, "Failed to remove unused recording file"),
    }
}
