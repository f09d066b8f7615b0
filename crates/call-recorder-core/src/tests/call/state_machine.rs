use crate::{
    CallContext, CallDirection, CallEvent, CallStateMachine, LineNotification, LineState,
};

use chrono::{DateTime, TimeZone, Utc};

#[allow(clippy::panic)]
fn started(event: Option<CallEvent>) -> CallContext {
    match event {
        Some(CallEvent::CallStarted(context)) => context,
        other => panic!("expected CallStarted, got {:?}", other),
    }
}

/// WHAT: Ringing then off-hook starts an incoming call with the ringing number
/// WHY: The answered number is only delivered with RINGING
#[test]
fn given_ringing_with_number_when_offhook_then_incoming_call_started_with_number() {
    // Given: A ringing line
    let mut machine = CallStateMachine::new();
    assert_eq!(
        machine.handle(LineNotification::state(LineState::Ringing, Some("+1555"))),
        None
    );

    // When: The call is answered
    let context = started(machine.handle(LineNotification::state(LineState::Offhook, None)));

    // Then: Incoming call bound to the ringing number
    assert_eq!(context.direction, CallDirection::Incoming);
    assert_eq!(context.counterpart_number.as_deref(), Some("+1555"));
    assert!(machine.in_call());
}

/// WHAT: A dialed number is bound to the next off-hook
/// WHY: Outgoing calls never pass through RINGING
#[test]
fn given_outgoing_initiated_when_offhook_then_outgoing_call_started_with_dialed_number() {
    // Given: The user dialed a number from idle
    let mut machine = CallStateMachine::new();
    assert_eq!(machine.handle(LineNotification::outgoing("0123")), None);
    assert_eq!(machine.direction_guess(), Some(CallDirection::Outgoing));

    // When: The line goes off-hook
    let context = started(machine.handle(LineNotification::state(LineState::Offhook, None)));

    // Then: Outgoing call with the dialed number
    assert_eq!(context.direction, CallDirection::Outgoing);
    assert_eq!(context.counterpart_number.as_deref(), Some("0123"));
}

/// WHAT: Off-hook from idle without any prior notification still starts a call
/// WHY: Some platforms never report the dialed number
#[test]
fn given_idle_when_offhook_without_number_then_outgoing_call_with_unknown_number() {
    // Given: A fresh machine
    let mut machine = CallStateMachine::new();

    // When: Off-hook arrives with no number anywhere
    let context = started(machine.handle(LineNotification::state(LineState::Offhook, None)));

    // Then: Outgoing with no number
    assert_eq!(context.direction, CallDirection::Outgoing);
    assert_eq!(context.counterpart_number, None);
}

/// WHAT: Ringing straight back to idle is a missed call
/// WHY: A missed call must never start a recording
#[test]
fn given_ringing_when_idle_then_call_missed_with_number() {
    // Given: A ringing line
    let mut machine = CallStateMachine::new();
    machine.handle(LineNotification::state(LineState::Ringing, Some("+1555")));

    // When: It stops ringing
    let event = machine.handle(LineNotification::state(LineState::Idle, None));

    // Then: Missed, not ended
    assert_eq!(
        event,
        Some(CallEvent::CallMissed {
            number: Some("+1555".to_string())
        })
    );
    assert!(!machine.in_call());
}

/// WHAT: Idle after an active call ends it
/// WHY: Every started call must be matched by exactly one end
#[test]
fn given_active_call_when_idle_then_call_ended() {
    // Given: An answered call
    let mut machine = CallStateMachine::new();
    machine.handle(LineNotification::state(LineState::Ringing, Some("+1555")));
    machine.handle(LineNotification::state(LineState::Offhook, None));

    // When: Line goes idle
    let event = machine.handle(LineNotification::state(LineState::Idle, None));

    // Then: Call ended and pending data cleared
    assert_eq!(event, Some(CallEvent::CallEnded));
    assert_eq!(machine.last_state(), LineState::Idle);
    assert_eq!(machine.direction_guess(), None);
}

/// WHAT: Redelivered states produce no events
/// WHY: Duplicate OFFHOOK must not start a second recording
#[test]
fn given_repeated_state_when_handled_then_no_event() {
    // Given: A call in progress
    let mut machine = CallStateMachine::new();
    machine.handle(LineNotification::state(LineState::Offhook, None));

    // When: OFFHOOK is delivered again, then IDLE twice
    let duplicate = machine.handle(LineNotification::state(LineState::Offhook, None));
    let ended = machine.handle(LineNotification::state(LineState::Idle, None));
    let duplicate_idle = machine.handle(LineNotification::state(LineState::Idle, None));

    // Then: Only one end event
    assert_eq!(duplicate, None);
    assert_eq!(ended, Some(CallEvent::CallEnded));
    assert_eq!(duplicate_idle, None);
}

/// WHAT: A second call ringing during an active call does not start anything
/// WHY: Call waiting must not disturb the running recording
#[test]
fn given_active_call_when_second_call_rings_and_is_answered_then_no_new_start() {
    // Given: An active call
    let mut machine = CallStateMachine::new();
    machine.handle(LineNotification::state(LineState::Offhook, None));

    // When: A waiting call rings and is then answered
    let ringing = machine.handle(LineNotification::state(LineState::Ringing, Some("999")));
    let answered = machine.handle(LineNotification::state(LineState::Offhook, None));

    // Then: Neither produces an event, the call is still up
    assert_eq!(ringing, None);
    assert_eq!(answered, None);
    assert!(machine.in_call());

    // And: The final idle ends the one call
    assert_eq!(
        machine.handle(LineNotification::state(LineState::Idle, None)),
        Some(CallEvent::CallEnded)
    );
}

/// WHAT: A waiting call that stops ringing ends the active call, not a miss
/// WHY: Once a call is up, IDLE always closes it
#[test]
fn given_active_call_when_waiting_call_rings_then_idle_then_call_ended() {
    // Given: An active call with a waiting call ringing
    let mut machine = CallStateMachine::new();
    machine.handle(LineNotification::state(LineState::Offhook, None));
    machine.handle(LineNotification::state(LineState::Ringing, Some("999")));

    // When: The line goes idle
    let event = machine.handle(LineNotification::state(LineState::Idle, None));

    // Then: The active call is ended
    assert_eq!(event, Some(CallEvent::CallEnded));
}

/// WHAT: An explicit direction on the notification overrides inference
/// WHY: Platforms that expose direction are more reliable than guessing
#[test]
fn given_explicit_direction_when_offhook_then_explicit_direction_used() {
    // Given: A ringing line
    let mut machine = CallStateMachine::new();
    machine.handle(LineNotification::state(LineState::Ringing, Some("+1555")));

    // When: OFFHOOK arrives marked as outgoing with its own number
    let context = started(machine.handle(LineNotification::LineStateChanged {
        state: LineState::Offhook,
        number: Some("0777".to_string()),
        direction: Some(CallDirection::Outgoing),
    }));

    // Then: Direction and fallback number follow the notification
    assert_eq!(context.direction, CallDirection::Outgoing);
    assert_eq!(context.counterpart_number.as_deref(), Some("0777"));
}

/// WHAT: Outgoing notification during ringing does not flip the guess
/// WHY: Direction is only guessed from idle
#[test]
fn given_ringing_when_outgoing_initiated_then_direction_guess_stays_incoming() {
    // Given: A ringing line
    let mut machine = CallStateMachine::new();
    machine.handle(LineNotification::state(LineState::Ringing, Some("+1555")));

    // When: An outgoing notification arrives
    machine.handle(LineNotification::outgoing("0123"));

    // Then: The guess remains incoming
    assert_eq!(machine.direction_guess(), Some(CallDirection::Incoming));
}

/// WHAT: Pending numbers do not leak across calls
/// WHY: A stale dialed number must not label the next incoming call
#[test]
fn given_previous_outgoing_call_when_next_call_has_no_number_then_number_unknown() {
    // Given: A completed outgoing call
    let mut machine = CallStateMachine::new();
    machine.handle(LineNotification::outgoing("0123"));
    machine.handle(LineNotification::state(LineState::Offhook, None));
    machine.handle(LineNotification::state(LineState::Idle, None));

    // When: A new off-hook arrives with nothing pending
    let context = started(machine.handle(LineNotification::state(LineState::Offhook, None)));

    // Then: No number carried over
    assert_eq!(context.counterpart_number, None);
}

/// WHAT: The observation time is stamped on the context
/// WHY: Replay and tests feed their own clock
#[test]
#[allow(clippy::unwrap_used)]
fn given_explicit_timestamp_when_offhook_then_context_carries_it() {
    // Given: A fixed instant
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    let mut machine = CallStateMachine::new();

    // When: Handling with that instant
    let context = started(machine.handle_at(LineNotification::state(LineState::Offhook, None), at));

    // Then: It is preserved
    assert_eq!(context.observed_at, at);
}

const REDELIVERY_MAX_LEN: u32 = 5;

fn notification_alphabet() -> [LineNotification; 4] {
    [
        LineNotification::state(LineState::Idle, None),
        LineNotification::state(LineState::Ringing, Some("+1555")),
        LineNotification::state(LineState::Offhook, None),
        LineNotification::outgoing("+1777"),
    ]
}

fn events_for(sequence: &[LineNotification], at: DateTime<Utc>) -> Vec<CallEvent> {
    let mut machine = CallStateMachine::new();
    sequence
        .iter()
        .filter_map(|n| machine.handle_at(n.clone(), at))
        .collect()
}

/// WHAT: Every short notification sequence emits the same events when any of its
/// notifications are delivered twice in a row
/// WHY: The platform delivers at least once; redelivery must never add or lose a call
#[test]
#[allow(clippy::unwrap_used)]
fn given_any_sequence_when_notifications_redelivered_then_same_events() {
    // Given: All sequences up to the maximum length over the alphabet
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    let alphabet = notification_alphabet();

    for len in 1..=REDELIVERY_MAX_LEN {
        for index in 0..alphabet.len().pow(len) {
            let sequence: Vec<LineNotification> = (0..len)
                .map(|pos| alphabet[(index / alphabet.len().pow(pos)) % alphabet.len()].clone())
                .collect();
            let expected = events_for(&sequence, at);

            // When: Each subset of positions is delivered twice
            for mask in 0..(1u32 << len) {
                let redelivered: Vec<LineNotification> = sequence
                    .iter()
                    .enumerate()
                    .flat_map(|(pos, n)| {
                        let copies = if mask & (1 << pos) != 0 { 2 } else { 1 };
                        std::iter::repeat_n(n.clone(), copies)
                    })
                    .collect();

                // Then: Same events as the sequence delivered once
                assert_eq!(
                    events_for(&redelivered, at),
                    expected,
                    "sequence {:?} redelivered as {:?}",
                    sequence,
                    redelivered
                );
            }
        }
    }
}
