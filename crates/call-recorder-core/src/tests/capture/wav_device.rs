use crate::{
    CaptureDevice, CaptureHandle, CaptureSource, CoreError, RecordingQuality, WavCaptureDevice,
    capture::wav_device::{MAX_PENDING_SAMPLES, append_bounded, to_pcm16},
};

use tempfile::TempDir;

/// WHAT: Float samples are clamped and scaled to 16-bit PCM
/// WHY: Out-of-range input must not wrap around into loud clicks
#[test]
fn given_float_samples_when_converting_then_clamped_pcm16() {
    assert_eq!(to_pcm16(0.0), 0);
    assert_eq!(to_pcm16(1.0), i16::MAX);
    assert_eq!(to_pcm16(2.5), i16::MAX);
    assert_eq!(to_pcm16(-1.0), -i16::MAX);
    assert_eq!(to_pcm16(-3.0), -i16::MAX);
    assert_eq!(to_pcm16(f32::NAN), 0);
    assert_eq!(to_pcm16(f32::INFINITY), 0);
}

/// WHAT: Integer callback blocks are normalized into the pending buffer
/// WHY: Devices whose default format is 16-bit must feed the same pipeline as float ones
#[test]
fn given_i16_block_when_appending_then_normalized_floats() {
    // Given
    let mut pending = Vec::new();

    // When
    let kept = append_bounded(&mut pending, &[0i16, i16::MIN]);

    // Then
    assert!(kept);
    assert_eq!(pending, vec![0.0, -1.0]);
}

/// WHAT: A block that would overflow the pending buffer is dropped whole
/// WHY: Memory stays bounded and interleaved frames stay aligned if the writer stalls
#[test]
fn given_full_buffer_when_appending_then_block_dropped() {
    // Given
    let mut pending = vec![0.0f32; MAX_PENDING_SAMPLES - 1];

    // When
    let kept = append_bounded(&mut pending, &[0.5f32, 0.5]);

    // Then
    assert!(!kept);
    assert_eq!(pending.len(), MAX_PENDING_SAMPLES - 1);
}

/// WHAT: Releasing a handle the device never issued is rejected
/// WHY: Only the issuing device may close a capture
#[test]
fn given_foreign_handle_when_releasing_then_invalid_handle() {
    // Given: A device with nothing open
    let mut device = WavCaptureDevice::new(CaptureSource::Primary, None);
    let handle = CaptureHandle::new(CaptureSource::Primary, std::path::Path::new("x.wav"));

    // When
    let result = device.release(handle);

    // Then
    assert!(matches!(result, Err(CoreError::InvalidHandle { .. })));
}

/// WHAT: A named device that does not exist fails as unsupported and leaves no file
/// WHY: The orchestrator moves on to the fallback without litter on disk
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
fn given_missing_input_device_when_acquiring_then_unsupported_and_no_file() {
    // Given
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("call.wav");
    let mut device =
        WavCaptureDevice::new(CaptureSource::Primary, Some("no-such-device-xyz".to_string()));

    // When
    let result = device.acquire(RecordingQuality::Medium, &destination);

    // Then
    assert!(matches!(result, Err(CoreError::CaptureUnsupported { .. })));
    assert!(!destination.exists());
}

/// WHAT: A real capture produces a readable WAV with the preset's format
/// WHY: Finalized files must be playable even when short
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
fn given_default_input_when_capturing_then_finalized_wav_matches_preset() {
    // Given
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("call.wav");
    let mut device = WavCaptureDevice::new(CaptureSource::Primary, None);

    // When
    let handle = device
        .acquire(RecordingQuality::Medium, &destination)
        .unwrap();
    let busy = device.acquire(RecordingQuality::Medium, &dir.path().join("other.wav"));
    std::thread::sleep(std::time::Duration::from_millis(200));
    let finalized = device.release(handle).unwrap();

    // Then
    assert!(matches!(busy, Err(CoreError::CaptureBusy { .. })));
    let reader = hound::WavReader::open(&finalized.path).unwrap();
    assert_eq!(reader.spec().sample_rate, 16_000);
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(
        finalized.size_bytes,
        std::fs::metadata(&finalized.path).unwrap().len()
    );
}
