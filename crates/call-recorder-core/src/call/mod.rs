mod call_context;
mod call_event;
mod line_state;
mod monitor;
mod state_machine;

pub use {
    call_context::{CallContext, CallDirection},
    call_event::{CallEvent, LineNotification},
    line_state::LineState,
    monitor::CallMonitor,
    state_machine::CallStateMachine,
};
