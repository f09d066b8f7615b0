use serde::{Deserialize, Serialize};

/// Capture device selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Input device carrying call audio (None = default input device).
    #[serde(default)]
    pub primary_device: Option<String>,
    /// Input device used when the primary cannot be opened (None = default input device).
    #[serde(default)]
    pub fallback_device: Option<String>,
}

impl CaptureConfig {
    /// Configured device names that are not among `available`.
    pub fn missing_devices<'a>(&'a self, available: &[String]) -> Vec<&'a str> {
        [&self.primary_device, &self.fallback_device]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .filter(|name| !available.iter().any(|a| a == name))
            .collect()
    }
}
