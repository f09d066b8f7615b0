use crate::{CoreResult, RecordingQuality, capture::resampler::Resampler};

use tracing::debug;

/// Converts audio in the device's native layout into the layout of a
/// [`RecordingQuality`] preset: channel count first, then sample rate.
pub(crate) struct AudioConverter {
    input_channels: usize,
    output_channels: usize,
    resampler: Option<Resampler>,
}

impl AudioConverter {
    #[track_caller]
    pub(crate) fn new(
        input_rate: u32,
        input_channels: u16,
        quality: RecordingQuality,
    ) -> CoreResult<Self> {
        let resampler = if input_rate == quality.sample_rate() {
            None
        } else {
            Some(Resampler::new(
                input_rate,
                quality.sample_rate(),
                quality.channels(),
            )?)
        };

        debug!(
            input_rate,
            input_channels,
            output_rate = quality.sample_rate(),
            output_channels = quality.channels(),
            resampling = resampler.is_some(),
            "Audio converter initialized"
        );

        Ok(Self {
            input_channels: usize::from(input_channels.max(1)),
            output_channels: usize::from(quality.channels().max(1)),
            resampler,
        })
    }

    /// Convert a block of interleaved device samples.
    #[track_caller]
    pub(crate) fn process(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        let remixed = remix(samples, self.input_channels, self.output_channels);
        match &mut self.resampler {
            Some(resampler) => resampler.process(&remixed),
            None => Ok(remixed),
        }
    }

    /// Emit whatever the resampler still holds.
    #[track_caller]
    pub(crate) fn finish(&mut self) -> CoreResult<Vec<f32>> {
        match &mut self.resampler {
            Some(resampler) => resampler.finish(),
            None => Ok(Vec::new()),
        }
    }
}

/// Change the channel count of interleaved audio.
///
/// Mono output averages every input channel, mono input is copied to every
/// output channel, anything else keeps the leading channels and repeats the
/// last one when widening. A trailing partial frame is dropped.
pub(crate) fn remix(samples: &[f32], input_channels: usize, output_channels: usize) -> Vec<f32> {
    if input_channels == output_channels {
        return samples.to_vec();
    }

    let frames = samples.chunks_exact(input_channels);
    let mut output = Vec::with_capacity(frames.len() * output_channels);

    for frame in frames {
        if output_channels == 1 {
            output.push(frame.iter().sum::<f32>() / input_channels as f32);
        } else {
            for channel in 0..output_channels {
                output.push(frame[channel.min(input_channels - 1)]);
            }
        }
    }

    output
}
