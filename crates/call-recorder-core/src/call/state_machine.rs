//! Line-state transition logic.
//!
//! Turns the raw, redelivered and interleaved notifications of the platform
//! into a clean sequence of [`CallEvent`]s. Pure state transitions: no I/O,
//! no clock reads beyond the timestamp handed in by the caller.

use crate::{CallContext, CallDirection, CallEvent, LineNotification, LineState};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Tracks the last stable line state and the numbers waiting to be bound to a call.
#[derive(Debug, Clone, Default)]
pub struct CallStateMachine {
    last_state: LineState,
    pending_outgoing_number: Option<String>,
    pending_incoming_number: Option<String>,
    direction_guess: Option<CallDirection>,
    /// Set once OFFHOOK has been seen since the last IDLE.
    in_call: bool,
}

impl CallStateMachine {
    /// Create a machine in the IDLE state with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last line state accepted by the machine.
    pub fn last_state(&self) -> LineState {
        self.last_state
    }

    /// Direction implied by the notifications seen since the last IDLE.
    pub fn direction_guess(&self) -> Option<CallDirection> {
        self.direction_guess
    }

    /// Whether a call is currently connected.
    pub fn in_call(&self) -> bool {
        self.in_call
    }

    /// Apply a notification observed now.
    pub fn handle(&mut self, notification: LineNotification) -> Option<CallEvent> {
        self.handle_at(notification, Utc::now())
    }

    /// Apply a notification observed at `observed_at`.
    pub fn handle_at(
        &mut self,
        notification: LineNotification,
        observed_at: DateTime<Utc>,
    ) -> Option<CallEvent> {
        match notification {
            LineNotification::OutgoingCallInitiated { number } => {
                debug!(number = %number, last_state = %self.last_state, "Outgoing call initiated");
                if self.last_state == LineState::Idle {
                    self.direction_guess = Some(CallDirection::Outgoing);
                }
                self.pending_outgoing_number = Some(number);
                None
            }
            LineNotification::LineStateChanged {
                state,
                number,
                direction,
            } => self.on_state_changed(state, number, direction, observed_at),
        }
    }

    fn on_state_changed(
        &mut self,
        state: LineState,
        number: Option<String>,
        direction: Option<CallDirection>,
        observed_at: DateTime<Utc>,
    ) -> Option<CallEvent> {
        // The platform redelivers states; a repeat carries no new information.
        if state == self.last_state {
            debug!(state = %state, "Duplicate line state ignored");
            return None;
        }

        let previous = self.last_state;
        self.last_state = state;

        match state {
            LineState::Ringing => {
                self.pending_incoming_number = number;
                self.direction_guess = Some(CallDirection::Incoming);
                debug!(number = ?self.pending_incoming_number, "Line ringing");
                None
            }
            LineState::Offhook => {
                if self.in_call {
                    // Second call answered while the first is still up.
                    debug!("OFFHOOK within an active call, no new call started");
                    return None;
                }
                self.in_call = true;

                let direction = direction.unwrap_or(match previous {
                    LineState::Ringing => CallDirection::Incoming,
                    _ => CallDirection::Outgoing,
                });
                let pending = match direction {
                    CallDirection::Incoming => self.pending_incoming_number.clone(),
                    CallDirection::Outgoing => self.pending_outgoing_number.clone(),
                };
                let counterpart_number = pending.or(number);

                info!(
                    direction = %direction,
                    number = ?counterpart_number,
                    "Call started"
                );

                Some(CallEvent::CallStarted(CallContext {
                    direction,
                    counterpart_number,
                    observed_at,
                }))
            }
            LineState::Idle => {
                let event = if self.in_call {
                    info!("Call ended");
                    Some(CallEvent::CallEnded)
                } else if previous == LineState::Ringing {
                    info!(number = ?self.pending_incoming_number, "Missed call");
                    Some(CallEvent::CallMissed {
                        number: self.pending_incoming_number.clone(),
                    })
                } else {
                    None
                };

                self.pending_outgoing_number = None;
                self.pending_incoming_number = None;
                self.direction_guess = None;
                self.in_call = false;

                event
            }
        }
    }
}
