use crate::{
    CallContext, CallDirection, CaptureSource, RecorderStatus, RecorderWorker, RecordingSettings,
    SessionStore, WorkerExit,
    tests::fakes::{FakeCaptureDevice, Workspace},
};

use std::sync::{Arc, Barrier};

use chrono::Utc;

fn outgoing(number: &str) -> CallContext {
    CallContext {
        direction: CallDirection::Outgoing,
        counterpart_number: Some(number.to_string()),
        observed_at: Utc::now(),
    }
}

/// WHAT: Simultaneous start requests from many threads acquire the device once
/// WHY: Two captures for the same call would corrupt the recording
#[test]
#[allow(clippy::unwrap_used)]
fn given_concurrent_start_requests_when_processed_then_single_acquire() {
    // Given
    let workspace = Workspace::new();
    let (primary, tally) = FakeCaptureDevice::new(CaptureSource::Primary);
    let (fallback, fallback_tally) = FakeCaptureDevice::new(CaptureSource::Fallback);
    let orchestrator = workspace.orchestrator(primary, fallback, RecordingSettings::default());
    let (worker, recorder) = RecorderWorker::new(orchestrator);
    let worker_thread = worker.spawn().unwrap();

    // When: 8 threads start at once
    let barrier = Arc::new(Barrier::new(8));
    let senders: Vec<_> = (0..8)
        .map(|i| {
            let recorder = recorder.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                recorder.start(outgoing(&i.to_string())).unwrap();
            })
        })
        .collect();
    for sender in senders {
        sender.join().unwrap();
    }
    recorder.stop().unwrap();
    recorder.shutdown().unwrap();
    let exit = worker_thread.join().unwrap();

    // Then
    assert_eq!(exit, WorkerExit::Shutdown);
    assert_eq!(tally.acquires(), 1);
    assert_eq!(fallback_tally.acquires(), 0);
    assert_eq!(workspace.store.count(), 1);
}

/// WHAT: Commands run in arrival order
/// WHY: A stop queued after a start must close that start's recording
#[test]
#[allow(clippy::unwrap_used)]
fn given_alternating_start_stop_when_processed_then_one_session_per_pair() {
    // Given
    let workspace = Workspace::new();
    let (primary, tally) = FakeCaptureDevice::new(CaptureSource::Primary);
    let (fallback, _) = FakeCaptureDevice::new(CaptureSource::Fallback);
    let orchestrator = workspace.orchestrator(primary, fallback, RecordingSettings::default());
    let (worker, recorder) = RecorderWorker::new(orchestrator);
    let worker_thread = worker.spawn().unwrap();

    // When
    for number in ["1", "2", "3"] {
        recorder.start(outgoing(number)).unwrap();
        recorder.stop().unwrap();
        recorder.stop().unwrap();
    }
    recorder.shutdown().unwrap();
    worker_thread.join().unwrap();

    // Then
    assert_eq!(tally.acquires(), 3);
    assert_eq!(tally.releases(), 3);
    let mut numbers: Vec<String> = workspace
        .store
        .list()
        .into_iter()
        .map(|s| s.counterpart_number)
        .collect();
    numbers.sort();
    assert_eq!(numbers, vec!["1", "2", "3"]);
}

/// WHAT: Shutdown during a call finalizes and stores the recording
/// WHY: Closing the app mid-call must not lose audio
#[test]
#[allow(clippy::unwrap_used)]
fn given_active_recording_when_shutdown_then_session_committed() {
    // Given
    let workspace = Workspace::new();
    let (primary, tally) = FakeCaptureDevice::new(CaptureSource::Primary);
    let (fallback, _) = FakeCaptureDevice::new(CaptureSource::Fallback);
    let orchestrator = workspace.orchestrator(primary, fallback, RecordingSettings::default());
    let (worker, recorder) = RecorderWorker::new(orchestrator);
    let status = worker.subscribe_status();
    let worker_thread = worker.spawn().unwrap();

    // When
    recorder.start(outgoing("1")).unwrap();
    recorder.shutdown().unwrap();
    let exit = worker_thread.join().unwrap();

    // Then
    assert_eq!(exit, WorkerExit::Shutdown);
    assert_eq!(tally.releases(), 1);
    assert_eq!(workspace.store.count(), 1);
    assert_eq!(*status.borrow(), RecorderStatus::Idle);
}

/// WHAT: Dropping every handle stops the worker and commits the recording
/// WHY: The worker must not outlive the app that feeds it
#[test]
#[allow(clippy::unwrap_used)]
fn given_all_handles_dropped_when_recording_then_disconnected_and_committed() {
    // Given
    let workspace = Workspace::new();
    let (primary, fallback) = (
        FakeCaptureDevice::new(CaptureSource::Primary).0,
        FakeCaptureDevice::new(CaptureSource::Fallback).0,
    );
    let orchestrator = workspace.orchestrator(primary, fallback, RecordingSettings::default());
    let (worker, recorder) = RecorderWorker::new(orchestrator);
    let worker_thread = worker.spawn().unwrap();

    // When
    recorder.start(outgoing("1")).unwrap();
    drop(recorder);
    let exit = worker_thread.join().unwrap();

    // Then
    assert_eq!(exit, WorkerExit::Disconnected);
    assert_eq!(workspace.store.count(), 1);
}

/// WHAT: With exit-on-exhausted set, a total capture failure ends the worker
/// WHY: The app may choose to shut down when recording is impossible
#[test]
#[allow(clippy::unwrap_used)]
fn given_exit_on_exhausted_when_both_sources_fail_then_worker_exits() {
    // Given
    let workspace = Workspace::new();
    let (primary, _) = FakeCaptureDevice::new(CaptureSource::Primary);
    let (fallback, _) = FakeCaptureDevice::new(CaptureSource::Fallback);
    let orchestrator = workspace.orchestrator(
        primary.failing_acquire(),
        fallback.failing_acquire(),
        RecordingSettings::default(),
    );
    let (worker, recorder) = RecorderWorker::new(orchestrator);
    let worker_thread = worker.exit_on_capture_exhausted(true).spawn().unwrap();

    // When
    recorder.start(outgoing("1")).unwrap();
    let exit = worker_thread.join().unwrap();

    // Then
    assert_eq!(exit, WorkerExit::CaptureExhausted);
    assert!(recorder.stop().is_err());
    assert_eq!(workspace.store.count(), 0);
}

/// WHAT: Without exit-on-exhausted the worker keeps serving after a total failure
/// WHY: The next call may find a free device
#[test]
#[allow(clippy::unwrap_used)]
fn given_default_worker_when_both_sources_fail_then_worker_keeps_running() {
    // Given
    let workspace = Workspace::new();
    let (primary, tally) = FakeCaptureDevice::new(CaptureSource::Primary);
    let (fallback, _) = FakeCaptureDevice::new(CaptureSource::Fallback);
    let orchestrator = workspace.orchestrator(
        primary.failing_acquire(),
        fallback.failing_acquire(),
        RecordingSettings::default(),
    );
    let (worker, recorder) = RecorderWorker::new(orchestrator);
    let worker_thread = worker.spawn().unwrap();

    // When
    recorder.start(outgoing("1")).unwrap();
    recorder.start(outgoing("2")).unwrap();
    recorder.shutdown().unwrap();
    let exit = worker_thread.join().unwrap();

    // Then
    assert_eq!(exit, WorkerExit::Shutdown);
    assert_eq!(tally.acquires(), 2);
}
