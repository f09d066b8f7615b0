use crate::{
    RecordingQuality,
    capture::converter::{AudioConverter, remix},
};

/// WHAT: Stereo input is averaged down to mono
/// WHY: LOW and MEDIUM presets are mono while most devices deliver stereo
#[test]
fn given_stereo_frames_when_remixing_to_mono_then_channels_averaged() {
    // Given
    let stereo = [0.2, 0.4, -1.0, 1.0, 0.5, 0.5];

    // When
    let mono = remix(&stereo, 2, 1);

    // Then
    assert_eq!(mono.len(), 3);
    assert!((mono[0] - 0.3).abs() < 1e-6);
    assert_eq!(mono[1], 0.0);
    assert_eq!(mono[2], 0.5);
}

/// WHAT: Mono input is duplicated into both stereo channels
/// WHY: The HIGH preset is stereo and mono-only microphones must still record
#[test]
fn given_mono_frames_when_remixing_to_stereo_then_duplicated() {
    assert_eq!(remix(&[0.1, -0.2], 1, 2), vec![0.1, 0.1, -0.2, -0.2]);
}

/// WHAT: Wider layouts keep their leading channels and partial frames are dropped
/// WHY: Multi-channel interfaces carry the call on the first channels
#[test]
fn given_four_channel_frames_when_remixing_to_stereo_then_leading_channels_kept() {
    // Given: Two full frames and a dangling sample
    let quad = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];

    // When
    let stereo = remix(&quad, 4, 2);

    // Then
    assert_eq!(stereo, vec![1.0, 2.0, 5.0, 6.0]);
}

/// WHAT: Audio already at the preset's rate and layout passes through unchanged
/// WHY: No resampler should be involved when the device matches the preset
#[test]
#[allow(clippy::unwrap_used)]
fn given_matching_device_format_when_converting_then_passthrough() {
    // Given
    let mut converter = AudioConverter::new(16_000, 1, RecordingQuality::Medium).unwrap();
    let samples = [0.1, 0.2, 0.3];

    // When
    let converted = converter.process(&samples).unwrap();
    let tail = converter.finish().unwrap();

    // Then
    assert_eq!(converted, samples.to_vec());
    assert!(tail.is_empty());
}

/// WHAT: A 48 kHz stereo device is converted to 16 kHz mono for MEDIUM
/// WHY: Shared-mode devices only offer their mix format, so capture must adapt
#[test]
#[allow(clippy::unwrap_used)]
fn given_48khz_stereo_device_when_converting_for_medium_then_16khz_mono() {
    // Given: One second of stereo audio
    let mut converter = AudioConverter::new(48_000, 2, RecordingQuality::Medium).unwrap();
    let block = vec![0.25f32; 960 * 2];

    // When
    let mut output = Vec::new();
    for _ in 0..50 {
        output.extend(converter.process(&block).unwrap());
    }
    output.extend(converter.finish().unwrap());

    // Then
    assert_eq!(output.len(), 16_000);
}
