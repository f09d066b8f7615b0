use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Platform-reported phone-line status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineState {
    /// No call on the line.
    #[default]
    Idle,
    /// An incoming call is ringing.
    Ringing,
    /// A call is connected or being dialed.
    Offhook,
}

impl LineState {
    /// Parse a raw platform state string.
    ///
    /// Unrecognized values map to [`LineState::Idle`] so a garbled
    /// notification ends a call instead of leaving a capture running.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "IDLE" => LineState::Idle,
            "RINGING" => LineState::Ringing,
            "OFFHOOK" | "OFF_HOOK" => LineState::Offhook,
            other => {
                warn!(raw_state = other, "Unrecognized line state, treating as IDLE");
                LineState::Idle
            }
        }
    }
}

impl fmt::Display for LineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LineState::Idle => "IDLE",
            LineState::Ringing => "RINGING",
            LineState::Offhook => "OFFHOOK",
        };
        f.write_str(s)
    }
}
