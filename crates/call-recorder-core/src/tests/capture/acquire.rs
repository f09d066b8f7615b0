use crate::{
    AcquireOutcome, CaptureSource, CoreError, RecordingQuality, acquire_with_fallback,
    tests::fakes::FakeCaptureDevice,
};

use tempfile::TempDir;

/// WHAT: A healthy primary is used and the fallback is never touched
/// WHY: The fallback path records with weaker guarantees
#[test]
#[allow(clippy::unwrap_used)]
fn given_primary_available_when_acquiring_then_primary_handle_and_no_fallback_attempt() {
    // Given
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("call.wav");
    let (mut primary, primary_tally) = FakeCaptureDevice::new(CaptureSource::Primary);
    let (mut fallback, fallback_tally) = FakeCaptureDevice::new(CaptureSource::Fallback);

    // When
    let outcome = acquire_with_fallback(
        &mut primary,
        &mut fallback,
        RecordingQuality::High,
        &destination,
    );

    // Then
    let AcquireOutcome::Acquired(handle) = outcome else {
        unreachable!("primary should have been acquired");
    };
    assert_eq!(handle.source, CaptureSource::Primary);
    assert_eq!(handle.path, destination);
    assert_eq!(primary_tally.acquires(), 1);
    assert_eq!(fallback_tally.acquires(), 0);
}

/// WHAT: A failing primary is retried exactly once on the fallback with identical arguments
/// WHY: The file must carry the same quality and name whichever source records it
#[test]
#[allow(clippy::unwrap_used)]
fn given_primary_busy_when_acquiring_then_fallback_gets_same_quality_and_destination() {
    // Given
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("call.wav");
    let (primary, primary_tally) = FakeCaptureDevice::new(CaptureSource::Primary);
    let mut primary = primary.failing_acquire();
    let (mut fallback, fallback_tally) = FakeCaptureDevice::new(CaptureSource::Fallback);

    // When
    let outcome = acquire_with_fallback(
        &mut primary,
        &mut fallback,
        RecordingQuality::Low,
        &destination,
    );

    // Then
    assert!(matches!(
        outcome,
        AcquireOutcome::Acquired(ref handle) if handle.source == CaptureSource::Fallback
    ));
    assert_eq!(primary_tally.acquires(), 1);
    assert_eq!(fallback_tally.acquires(), 1);
    assert_eq!(primary_tally.qualities(), fallback_tally.qualities());
    assert_eq!(primary_tally.destinations(), fallback_tally.destinations());
}

/// WHAT: Both sources failing reports both errors
/// WHY: The caller logs both reasons and gives up without a third attempt
#[test]
#[allow(clippy::unwrap_used)]
fn given_both_sources_fail_when_acquiring_then_exhausted_with_both_errors() {
    // Given
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("call.wav");
    let (primary, primary_tally) = FakeCaptureDevice::new(CaptureSource::Primary);
    let (fallback, fallback_tally) = FakeCaptureDevice::new(CaptureSource::Fallback);
    let mut primary = primary.failing_acquire();
    let mut fallback = fallback.failing_acquire();

    // When
    let outcome = acquire_with_fallback(
        &mut primary,
        &mut fallback,
        RecordingQuality::Medium,
        &destination,
    );

    // Then
    let AcquireOutcome::Exhausted { primary, fallback } = outcome else {
        unreachable!("both sources should have failed");
    };
    assert!(matches!(
        primary,
        CoreError::CaptureBusy {
            source_kind: CaptureSource::Primary,
            ..
        }
    ));
    assert!(matches!(
        fallback,
        CoreError::CaptureBusy {
            source_kind: CaptureSource::Fallback,
            ..
        }
    ));
    assert_eq!(primary_tally.acquires(), 1);
    assert_eq!(fallback_tally.acquires(), 1);
}
