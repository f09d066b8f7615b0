use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who placed the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallDirection {
    /// The call rang on this device and was answered.
    Incoming,
    /// The call was dialed from this device.
    Outgoing,
}

impl fmt::Display for CallDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallDirection::Incoming => f.write_str("INCOMING"),
            CallDirection::Outgoing => f.write_str("OUTGOING"),
        }
    }
}

/// A call that has just become active.
///
/// Built by the state machine at OFFHOOK and handed by value to the recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Direction of the call.
    pub direction: CallDirection,
    /// Remote party number as reported by the platform, if any.
    pub counterpart_number: Option<String>,
    /// When the transition that started the call was observed.
    pub observed_at: DateTime<Utc>,
}
