use crate::config::default_shutdown_on_capture_failure;

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Stop the application when neither capture source can be opened.
    #[serde(default = "default_shutdown_on_capture_failure")]
    pub shutdown_on_capture_failure: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            shutdown_on_capture_failure: default_shutdown_on_capture_failure(),
        }
    }
}
