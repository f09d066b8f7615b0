use crate::{CallEvent, CallStateMachine, CoreResult, LineNotification, RecorderHandle};

use tracing::{debug, instrument};

/// Feeds line notifications through the state machine and forwards the
/// resulting intents to the recorder.
///
/// Owns the [`CallStateMachine`]; exactly one event-processing loop should
/// own the monitor. Never blocks: recorder commands are queued.
pub struct CallMonitor {
    machine: CallStateMachine,
    recorder: RecorderHandle,
}

impl CallMonitor {
    /// Create a monitor with a fresh state machine.
    pub fn new(recorder: RecorderHandle) -> Self {
        Self {
            machine: CallStateMachine::new(),
            recorder,
        }
    }

    /// Current state machine.
    pub fn machine(&self) -> &CallStateMachine {
        &self.machine
    }

    /// Apply one notification and dispatch the event it produces, if any.
    #[instrument(skip(self))]
    pub fn on_notification(
        &mut self,
        notification: LineNotification,
    ) -> CoreResult<Option<CallEvent>> {
        let event = self.machine.handle(notification);

        match &event {
            Some(CallEvent::CallStarted(context)) => self.recorder.start(context.clone())?,
            Some(CallEvent::CallEnded) => self.recorder.stop()?,
            Some(CallEvent::CallMissed { .. }) => debug!("Missed call, nothing to record"),
            None => {}
        }

        Ok(event)
    }
}
