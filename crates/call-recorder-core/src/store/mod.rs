mod file_store;
mod session;
mod session_store;

pub use {
    file_store::FileSessionStore,
    session::{FileStatus, NewRecordingSession, RecordingSession, UNKNOWN_NUMBER},
    session_store::SessionStore,
};
