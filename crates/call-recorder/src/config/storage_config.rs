use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where recordings and their index live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory audio files are written to.
    pub recordings_dir: PathBuf,
    /// JSON index of recorded sessions.
    pub index_path: PathBuf,
}

impl StorageConfig {
    /// Default layout under `data_dir`.
    pub fn under(data_dir: &Path) -> Self {
        Self {
            recordings_dir: data_dir.join("CallRecordings"),
            index_path: data_dir.join("recordings.json"),
        }
    }
}
