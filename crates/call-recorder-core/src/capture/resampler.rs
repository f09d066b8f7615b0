use crate::{CoreError, CoreResult};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

const CHUNK_FRAMES: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Streaming sample-rate converter for interleaved audio.
///
/// Input arrives in arbitrary slices from the capture thread; whole chunks are
/// resampled as soon as they are available and the remainder waits for more
/// input or for [`Resampler::finish`].
pub(crate) struct Resampler {
    resampler: Fft<f32>,
    channels: usize,
    input_rate: u32,
    output_rate: u32,
    pending: Vec<f32>,
    frames_in: u64,
    frames_out: u64,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub(crate) fn new(input_rate: u32, output_rate: u32, channels: u16) -> CoreResult<Self> {
        let channels = usize::from(channels.max(1));

        let resampler = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            CHUNK_FRAMES,
            SUB_CHUNKS,
            channels,
            FixedSync::Input,
        )
        .map_err(|e| CoreError::ResamplingFailed {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(input_rate, output_rate, channels, "Resampler initialized");

        Ok(Self {
            resampler,
            channels,
            input_rate,
            output_rate,
            pending: Vec::new(),
            frames_in: 0,
            frames_out: 0,
        })
    }

    /// Feed interleaved samples, returning whatever output is ready.
    #[track_caller]
    pub(crate) fn process(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        self.pending.extend_from_slice(samples);
        self.frames_in += (samples.len() / self.channels) as u64;

        let mut output = Vec::new();
        loop {
            let chunk_len = self.resampler.input_frames_next() * self.channels;
            if self.pending.len() < chunk_len {
                break;
            }
            let chunk: Vec<f32> = self.pending.drain(..chunk_len).collect();
            self.process_chunk(&chunk, &mut output)?;
        }

        Ok(output)
    }

    /// Flush buffered input, padding with silence, and trim the output to
    /// exactly the duration that was fed in.
    #[track_caller]
    pub(crate) fn finish(&mut self) -> CoreResult<Vec<f32>> {
        let expected = self.frames_in * u64::from(self.output_rate) / u64::from(self.input_rate);

        let mut output = Vec::new();
        while self.frames_out < expected {
            let chunk_len = self.resampler.input_frames_next() * self.channels;
            let mut chunk = std::mem::take(&mut self.pending);
            chunk.resize(chunk_len, 0.0);
            if self.process_chunk(&chunk, &mut output)? == 0 {
                break;
            }
        }

        let excess = self.frames_out.saturating_sub(expected) as usize * self.channels;
        output.truncate(output.len().saturating_sub(excess));
        self.frames_out = self.frames_out.min(expected);

        debug!(
            frames_in = self.frames_in,
            frames_out = self.frames_out,
            input_rate = self.input_rate,
            output_rate = self.output_rate,
            "Resampler flushed"
        );

        Ok(output)
    }

    #[track_caller]
    fn process_chunk(&mut self, chunk: &[f32], output: &mut Vec<f32>) -> CoreResult<usize> {
        let frames = chunk.len() / self.channels;
        let input = InterleavedSlice::new(chunk, self.channels, frames).map_err(|e| {
            CoreError::ResamplingFailed {
                reason: format!("Failed to create input adapter: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let max_frames = self.resampler.output_frames_max();
        let mut buffer = vec![0.0f32; max_frames * self.channels];

        let written = {
            let mut adapter = InterleavedSlice::new_mut(&mut buffer, self.channels, max_frames)
                .map_err(|e| CoreError::ResamplingFailed {
                    reason: format!("Failed to create output adapter: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            let (_, written) = self
                .resampler
                .process_into_buffer(&input, &mut adapter, None)
                .map_err(|e| CoreError::ResamplingFailed {
                    reason: format!("Resampling failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            written
        };

        output.extend_from_slice(&buffer[..written * self.channels]);
        self.frames_out += written as u64;

        Ok(written)
    }
}
