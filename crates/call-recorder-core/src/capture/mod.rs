mod acquire;
pub(crate) mod converter;
mod device;
mod quality;
pub(crate) mod resampler;
pub(crate) mod wav_device;

pub use {
    acquire::{AcquireOutcome, acquire_with_fallback},
    device::{CaptureDevice, CaptureHandle, CaptureSource, FinalizedFile},
    quality::RecordingQuality,
    wav_device::WavCaptureDevice,
};
