use crate::{CoreResult, NewRecordingSession, RecordingSession};

/// Durable collection of recording sessions.
///
/// `create` is the only write path the recorder uses. Deletions remove the
/// backing file before the row, so an interrupted delete leaves at worst a
/// row pointing at a missing file, never a file without a row.
pub trait SessionStore: Send + Sync {
    /// Persist a finished session and return it with its assigned id.
    fn create(&self, session: NewRecordingSession) -> CoreResult<RecordingSession>;

    /// All sessions, newest first.
    fn list(&self) -> Vec<RecordingSession>;

    /// Sessions with the given counterpart number, newest first.
    fn list_for(&self, number: &str) -> Vec<RecordingSession>;

    /// Look up one session.
    fn get(&self, id: u64) -> Option<RecordingSession>;

    /// Delete the file, then the row. Returns `false` if no such session.
    fn delete(&self, id: u64) -> CoreResult<bool>;

    /// Delete every session whose file could be removed. Returns the count removed.
    fn delete_all(&self) -> CoreResult<usize>;

    /// Number of sessions.
    fn count(&self) -> usize;

    /// Sum of the recorded file sizes.
    fn total_size_bytes(&self) -> u64;
}
