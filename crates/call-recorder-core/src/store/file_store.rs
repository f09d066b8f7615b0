//! JSON-file session store.
//!
//! The whole index (next id plus every row) lives in one JSON file that is
//! rewritten atomically on each change. Rows are few and small, and a
//! rename-based write means a crash leaves either the old or the new index,
//! never a torn one.

use crate::{CoreError, CoreResult, NewRecordingSession, RecordingSession, SessionStore};

use std::{
    fs,
    io::{ErrorKind, Write},
    panic::Location,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, RwLock},
};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreIndex {
    next_id: u64,
    sessions: Vec<RecordingSession>,
}

impl Default for StoreIndex {
    fn default() -> Self {
        Self {
            next_id: 1,
            sessions: Vec::new(),
        }
    }
}

/// Session store backed by an atomically rewritten JSON index.
///
/// Readers only take the read lock on the in-memory index, so UI queries are
/// never blocked by disk I/O. Writers are serialized by a separate gate, build
/// the next index from a snapshot, persist it, and only then swap it in.
#[derive(Debug)]
pub struct FileSessionStore {
    index_path: PathBuf,
    index: RwLock<StoreIndex>,
    write_gate: Mutex<()>,
}

impl FileSessionStore {
    /// Open the store at `index_path`, creating an empty one if absent.
    #[track_caller]
    #[instrument]
    pub fn open(index_path: &Path) -> CoreResult<Self> {
        if let Some(parent) = index_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let index = match fs::read_to_string(index_path) {
            Ok(contents) => {
                let mut index: StoreIndex =
                    serde_json::from_str(&contents).map_err(|e| CoreError::StoreFormat {
                        reason: format!("Failed to parse {:?}: {}", index_path, e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

                // Ids must stay monotonic even if the file was edited by hand.
                let max_id = index.sessions.iter().map(|s| s.id).max().unwrap_or(0);
                if index.next_id <= max_id {
                    warn!(next_id = index.next_id, max_id, "Repairing session id counter");
                    index.next_id = max_id + 1;
                }

                info!(
                    index_path = ?index_path,
                    session_count = index.sessions.len(),
                    "Session store loaded"
                );
                index
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(index_path = ?index_path, "No session index found, starting empty");
                StoreIndex::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            index_path: index_path.to_path_buf(),
            index: RwLock::new(index),
            write_gate: Mutex::new(()),
        })
    }

    /// Location of the JSON index.
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.write_gate.lock().unwrap_or_else(|e| {
            error!("Session store write gate poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn snapshot(&self) -> StoreIndex {
        self.index
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn read_sessions<T>(&self, f: impl FnOnce(&[RecordingSession]) -> T) -> T {
        let index = self.index.read().unwrap_or_else(|e| e.into_inner());
        f(&index.sessions)
    }

    /// Persist `next` and make it the visible index.
    #[track_caller]
    fn commit(&self, next: StoreIndex) -> CoreResult<()> {
        self.persist(&next)?;
        *self.index.write().unwrap_or_else(|e| e.into_inner()) = next;
        Ok(())
    }

    /// Atomic write: temp file, fsync, rename.
    #[track_caller]
    fn persist(&self, index: &StoreIndex) -> CoreResult<()> {
        let contents = serde_json::to_string_pretty(index).map_err(|e| CoreError::StoreFormat {
            reason: format!("Failed to serialize session index: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = self.index_path.with_extension("json.tmp");

        let mut temp_file = fs::File::create(&temp_path)?;
        temp_file.write_all(contents.as_bytes())?;
        temp_file.sync_all()?;
        fs::rename(&temp_path, &self.index_path)?;

        debug!(
            index_path = ?self.index_path,
            session_count = index.sessions.len(),
            "Session index saved (atomic write)"
        );

        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    #[track_caller]
    #[instrument(skip(self, session), fields(number = %session.counterpart_number))]
    fn create(&self, session: NewRecordingSession) -> CoreResult<RecordingSession> {
        let _gate = self.lock_writer();

        let mut next = self.snapshot();
        let id = next.next_id;
        next.next_id += 1;

        let session = session.with_id(id);
        next.sessions.push(session.clone());
        self.commit(next)?;

        info!(id, file_path = ?session.file_path, "Recording session created");

        Ok(session)
    }

    fn list(&self) -> Vec<RecordingSession> {
        self.read_sessions(|sessions| newest_first(sessions.iter()))
    }

    fn list_for(&self, number: &str) -> Vec<RecordingSession> {
        self.read_sessions(|sessions| {
            newest_first(sessions.iter().filter(|s| s.counterpart_number == number))
        })
    }

    fn get(&self, id: u64) -> Option<RecordingSession> {
        self.read_sessions(|sessions| sessions.iter().find(|s| s.id == id).cloned())
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn delete(&self, id: u64) -> CoreResult<bool> {
        let _gate = self.lock_writer();

        let Some(session) = self.get(id) else {
            debug!(id, "Delete requested for unknown session");
            return Ok(false);
        };

        remove_backing_file(&session.file_path)?;

        let mut next = self.snapshot();
        next.sessions.retain(|s| s.id != id);
        self.commit(next)?;

        info!(id, file_path = ?session.file_path, "Recording session deleted");

        Ok(true)
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn delete_all(&self) -> CoreResult<usize> {
        let _gate = self.lock_writer();

        let mut next = self.snapshot();
        let before = next.sessions.len();

        next.sessions
            .retain(|session| match remove_backing_file(&session.file_path) {
                Ok(()) => false,
                Err(e) => {
                    warn!(
                        id = session.id,
                        error = %e,
                        "Keeping session whose file could not be removed"
                    );
                    true
                }
            });

        let removed = before - next.sessions.len();
        self.commit(next)?;

        info!(removed, "Recording sessions deleted");

        Ok(removed)
    }

    fn count(&self) -> usize {
        self.read_sessions(|sessions| sessions.len())
    }

    fn total_size_bytes(&self) -> u64 {
        self.read_sessions(|sessions| sessions.iter().map(|s| s.file_size_bytes).sum())
    }
}

fn newest_first<'a>(sessions: impl Iterator<Item = &'a RecordingSession>) -> Vec<RecordingSession> {
    let mut sorted: Vec<RecordingSession> = sessions.cloned().collect();
    sorted.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
    sorted
}

/// Remove a recording file; a file that is already gone counts as removed.
#[track_caller]
fn remove_backing_file(path: &Path) -> CoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = ?path, "Recording file already missing");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
