use crate::{CallContext, CallDirection, LineState};

/// Raw notification delivered by the line-state notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineNotification {
    /// The user dialed a number on this device.
    OutgoingCallInitiated {
        /// Number being dialed.
        number: String,
    },
    /// The platform reported a new line state.
    LineStateChanged {
        /// Reported state.
        state: LineState,
        /// Number attached to the notification, usually only on RINGING.
        number: Option<String>,
        /// Explicit call direction, when the platform exposes one.
        direction: Option<CallDirection>,
    },
}

impl LineNotification {
    /// Convenience constructor for a state change without explicit direction.
    pub fn state(state: LineState, number: Option<&str>) -> Self {
        LineNotification::LineStateChanged {
            state,
            number: number.map(str::to_string),
            direction: None,
        }
    }

    /// Convenience constructor for an outgoing call notification.
    pub fn outgoing(number: &str) -> Self {
        LineNotification::OutgoingCallInitiated {
            number: number.to_string(),
        }
    }
}

/// Clean call lifecycle event emitted by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    /// A call became active and should be recorded.
    CallStarted(CallContext),
    /// The active call ended.
    CallEnded,
    /// A ringing call went back to idle without being answered.
    CallMissed {
        /// Number that rang, if known.
        number: Option<String>,
    },
}
