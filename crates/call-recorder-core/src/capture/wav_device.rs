use crate::{
    CaptureDevice, CaptureHandle, CaptureSource, CoreError, CoreResult, FinalizedFile,
    RecordingQuality, capture::converter::AudioConverter,
};

use std::{
    fs::{self, File},
    io::BufWriter,
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError},
    },
    thread::JoinHandle,
    time::Duration,
};

use cpal::{
    BuildStreamError, Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use hound::{WavSpec, WavWriter};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// PCM bit depth of the WAV files written by [`WavCaptureDevice`].
pub(crate) const WAV_BITS_PER_SAMPLE: u16 = 16;

/// How often the capture thread drains the callback buffer into the file.
const DRAIN_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on samples waiting for the capture thread (10 s of 48 kHz stereo).
pub(crate) const MAX_PENDING_SAMPLES: usize = 48_000 * 2 * 10;

type SampleBuffer = Arc<Mutex<Vec<f32>>>;
type Wav = WavWriter<BufWriter<File>>;

/// Capture device that records a cpal input stream into a 16-bit PCM WAV file.
///
/// The input device is opened at its own default configuration. The audio
/// callback only appends samples to a buffer; a dedicated capture thread owns
/// the cpal stream, converts the buffered audio to the preset's channel count
/// and sample rate, and writes it to the file.
pub struct WavCaptureDevice {
    source: CaptureSource,
    /// Input device name to open; `None` selects the host default input.
    device_name: Option<String>,
    open: Option<OpenCapture>,
}

struct OpenCapture {
    handle_id: Uuid,
    path: PathBuf,
    stop_tx: mpsc::Sender<()>,
    thread: JoinHandle<CoreResult<()>>,
}

impl WavCaptureDevice {
    /// Create a device for `source` bound to the named input device.
    pub fn new(source: CaptureSource, device_name: Option<String>) -> Self {
        Self {
            source,
            device_name,
            open: None,
        }
    }

    /// Names of the input devices the default host exposes.
    #[track_caller]
    #[allow(deprecated)]
    pub fn input_device_names() -> CoreResult<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| CoreError::CaptureUnsupported {
                source_kind: CaptureSource::Primary,
                reason: format!("Failed to enumerate input devices: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(devices.filter_map(|d| d.name().ok()).collect())
    }
}

impl CaptureDevice for WavCaptureDevice {
    fn source(&self) -> CaptureSource {
        self.source
    }

    fn file_extension(&self) -> &'static str {
        "wav"
    }

    #[track_caller]
    #[instrument(skip(self), fields(source = %self.source))]
    fn acquire(
        &mut self,
        quality: RecordingQuality,
        destination: &Path,
    ) -> CoreResult<CaptureHandle> {
        if let Some(open) = &self.open {
            return Err(CoreError::CaptureBusy {
                source_kind: self.source,
                reason: format!("capture {} is still open", open.handle_id),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let spec = WavSpec {
            channels: quality.channels(),
            sample_rate: quality.sample_rate(),
            bits_per_sample: WAV_BITS_PER_SAMPLE,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = WavWriter::create(destination, spec).map_err(|e| CoreError::CaptureIo {
            source_kind: self.source,
            path: destination.to_path_buf(),
            reason: format!("Failed to create WAV file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let (ready_tx, ready_rx) = mpsc::channel::<CoreResult<()>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let task = CaptureTask {
            source: self.source,
            device_name: self.device_name.clone(),
            quality,
            path: destination.to_path_buf(),
        };

        let spawned = std::thread::Builder::new()
            .name(format!("capture-{}", self.source))
            .spawn(move || task.run(writer, ready_tx, stop_rx));

        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                remove_partial(destination);
                return Err(CoreError::CaptureIo {
                    source_kind: self.source,
                    path: destination.to_path_buf(),
                    reason: format!("Failed to spawn capture thread: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        let started = match ready_rx.recv() {
            Ok(result) => result,
            Err(_) => Err(CoreError::CaptureIo {
                source_kind: self.source,
                path: destination.to_path_buf(),
                reason: "Capture thread exited before reporting readiness".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        };

        if let Err(e) = started {
            // The thread drops its writer before exiting, so the file is closed here.
            if thread.join().is_err() {
                error!("Capture thread panicked during startup");
            }
            remove_partial(destination);
            return Err(e);
        }

        let handle = CaptureHandle::new(self.source, destination);

        self.open = Some(OpenCapture {
            handle_id: handle.id,
            path: destination.to_path_buf(),
            stop_tx,
            thread,
        });

        info!(
            handle_id = %handle.id,
            path = ?destination,
            sample_rate = quality.sample_rate(),
            channels = quality.channels(),
            "Audio capture started"
        );

        Ok(handle)
    }

    #[track_caller]
    #[instrument(skip(self), fields(source = %self.source, handle_id = %handle.id))]
    fn release(&mut self, handle: CaptureHandle) -> CoreResult<FinalizedFile> {
        let Some(open) = self.open.take_if(|open| open.handle_id == handle.id) else {
            return Err(CoreError::InvalidHandle {
                handle_id: handle.id,
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let finalized = open.finish()?;

        info!(
            path = ?finalized.path,
            size_bytes = finalized.size_bytes,
            "Audio capture stopped"
        );

        Ok(finalized)
    }
}

impl Drop for WavCaptureDevice {
    fn drop(&mut self) {
        if let Some(open) = self.open.take() {
            warn!(handle_id = %open.handle_id, "Capture device dropped while open, finalizing");
            if let Err(e) = open.finish() {
                error!(error = %e, "Failed to finalize capture on drop");
            }
        }
    }
}

impl OpenCapture {
    /// Stop the capture thread and wait for it to write out the file.
    #[track_caller]
    fn finish(self) -> CoreResult<FinalizedFile> {
        let _ = self.stop_tx.send(());

        let written = match self.thread.join() {
            Ok(result) => result,
            Err(_) => Err(CoreError::FlushFailed {
                path: self.path.clone(),
                reason: "Capture thread panicked".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        };
        written?;

        let size_bytes = fs::metadata(&self.path)
            .map_err(|e| CoreError::FlushFailed {
                path: self.path.clone(),
                reason: format!("Failed to stat finalized file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .len();

        Ok(FinalizedFile {
            path: self.path,
            size_bytes,
        })
    }
}

/// Everything the capture thread needs to open and run the stream.
struct CaptureTask {
    source: CaptureSource,
    device_name: Option<String>,
    quality: RecordingQuality,
    path: PathBuf,
}

impl CaptureTask {
    /// Body of the capture thread.
    ///
    /// Reports readiness once the stream plays, then drains the callback
    /// buffer into the file until `stop_rx` fires or its sender is dropped.
    /// The WAV header is always finalized, so the file stays readable even
    /// when a write failed midway.
    fn run(
        self,
        writer: Wav,
        ready_tx: mpsc::Sender<CoreResult<()>>,
        stop_rx: mpsc::Receiver<()>,
    ) -> CoreResult<()> {
        let buffer: SampleBuffer = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let (stream, converter) = match self.open_stream(&buffer, &shutdown) {
            Ok(opened) => opened,
            Err(e) => {
                drop(writer);
                let _ = ready_tx.send(Err(e));
                return Ok(());
            }
        };

        if ready_tx.send(Ok(())).is_err() {
            return Ok(());
        }

        let mut sink = WavSink {
            source: self.source,
            path: self.path.clone(),
            writer,
            converter,
            failed: None,
        };

        loop {
            let stop = !matches!(
                stop_rx.recv_timeout(DRAIN_INTERVAL),
                Err(RecvTimeoutError::Timeout)
            );

            if stop {
                // Callback must observe the flag before the stream is dropped.
                shutdown.store(true, Ordering::Release);
                drop(stream);
                debug!(source = %self.source, "Capture stream closed");
                sink.write(&take_pending(&buffer));
                break;
            }

            sink.write(&take_pending(&buffer));
        }

        sink.finish()
    }

    /// Open the device at its default configuration and start the stream.
    #[track_caller]
    fn open_stream(
        &self,
        buffer: &SampleBuffer,
        shutdown: &Arc<AtomicBool>,
    ) -> CoreResult<(Stream, AudioConverter)> {
        let device = self.resolve_device()?;

        let supported = device
            .default_input_config()
            .map_err(|e| CoreError::CaptureUnsupported {
                source_kind: self.source,
                reason: format!("Failed to get default input config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config: StreamConfig = supported.config();
        let converter = AudioConverter::new(config.sample_rate, config.channels, self.quality)?;

        info!(
            source = %self.source,
            device_rate = config.sample_rate,
            device_channels = config.channels,
            sample_format = ?supported.sample_format(),
            "Input device opened"
        );

        let stream = match supported.sample_format() {
            SampleFormat::F32 => self.build_stream::<f32>(&device, &config, buffer, shutdown),
            SampleFormat::I16 => self.build_stream::<i16>(&device, &config, buffer, shutdown),
            SampleFormat::U16 => self.build_stream::<u16>(&device, &config, buffer, shutdown),
            SampleFormat::I32 => self.build_stream::<i32>(&device, &config, buffer, shutdown),
            other => Err(CoreError::CaptureUnsupported {
                source_kind: self.source,
                reason: format!("Unsupported input sample format {:?}", other),
                location: ErrorLocation::from(Location::caller()),
            }),
        }?;

        stream.play().map_err(|e| CoreError::CaptureBusy {
            source_kind: self.source,
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok((stream, converter))
    }

    #[track_caller]
    fn build_stream<T>(
        &self,
        device: &Device,
        config: &StreamConfig,
        buffer: &SampleBuffer,
        shutdown: &Arc<AtomicBool>,
    ) -> CoreResult<Stream>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let buffer = Arc::clone(buffer);
        let shutdown = Arc::clone(shutdown);
        let overflowed = AtomicBool::new(false);

        device
            .build_input_stream(
                config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    let mut pending = buffer.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    let kept = append_bounded(&mut pending, data);
                    if !kept && !overflowed.swap(true, Ordering::Relaxed) {
                        warn!("Capture thread is falling behind, dropping audio");
                    }
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| self.build_error(e))
    }

    #[track_caller]
    #[allow(deprecated)]
    fn resolve_device(&self) -> CoreResult<Device> {
        let host = cpal::default_host();

        let device = match &self.device_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| CoreError::CaptureUnsupported {
                    source_kind: self.source,
                    reason: format!("Failed to enumerate input devices: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?
                .find(|d| d.name().map(|n| n == *name).unwrap_or(false)),
            None => host.default_input_device(),
        };

        device.ok_or_else(|| CoreError::CaptureUnsupported {
            source_kind: self.source,
            reason: match &self.device_name {
                Some(name) => format!("Input device '{}' not found", name),
                None => "No default input device".to_string(),
            },
            location: ErrorLocation::from(Location::caller()),
        })
    }

    #[track_caller]
    fn build_error(&self, e: BuildStreamError) -> CoreError {
        if matches!(e, BuildStreamError::DeviceNotAvailable) {
            CoreError::CaptureBusy {
                source_kind: self.source,
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        } else {
            CoreError::CaptureUnsupported {
                source_kind: self.source,
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        }
    }
}

/// Converted-audio writer owned by the capture thread.
struct WavSink {
    source: CaptureSource,
    path: PathBuf,
    writer: Wav,
    converter: AudioConverter,
    /// First write error; later audio is discarded once set.
    failed: Option<CoreError>,
}

impl WavSink {
    fn write(&mut self, samples: &[f32]) {
        if self.failed.is_some() || samples.is_empty() {
            return;
        }
        let result = self
            .converter
            .process(samples)
            .and_then(|converted| self.write_pcm(&converted));
        if let Err(e) = result {
            error!(error = %e, "Failed to write captured audio, keeping what was written");
            self.failed = Some(e);
        }
    }

    #[track_caller]
    fn write_pcm(&mut self, samples: &[f32]) -> CoreResult<()> {
        for &sample in samples {
            self.writer
                .write_sample(to_pcm16(sample))
                .map_err(|e| CoreError::CaptureIo {
                    source_kind: self.source,
                    path: self.path.clone(),
                    reason: format!("Failed to write audio sample: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
        }
        Ok(())
    }

    /// Flush the converter tail and finalize the WAV header.
    #[track_caller]
    fn finish(mut self) -> CoreResult<()> {
        if self.failed.is_none() {
            let tail = self.converter.finish();
            if let Err(e) = tail.and_then(|tail| self.write_pcm(&tail)) {
                error!(error = %e, "Failed to write final audio block");
                self.failed = Some(e);
            }
        }

        self.writer.finalize().map_err(|e| CoreError::FlushFailed {
            path: self.path.clone(),
            reason: format!("Failed to finalize WAV file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        match self.failed {
            Some(e) => Err(CoreError::FlushFailed {
                path: self.path,
                reason: format!("Capture ended early: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }),
            None => Ok(()),
        }
    }
}

/// Append a callback block unless that would exceed [`MAX_PENDING_SAMPLES`].
///
/// Whole blocks are dropped so interleaved frames stay aligned. Returns
/// whether the block was kept.
pub(crate) fn append_bounded<T>(pending: &mut Vec<f32>, data: &[T]) -> bool
where
    T: SizedSample,
    f32: FromSample<T>,
{
    if pending.len() + data.len() > MAX_PENDING_SAMPLES {
        return false;
    }
    pending.extend(data.iter().map(|&s| f32::from_sample(s)));
    true
}

fn take_pending(buffer: &SampleBuffer) -> Vec<f32> {
    let mut pending = buffer.lock().unwrap_or_else(|e| {
        error!("Sample buffer lock poisoned, recovering: {}", e);
        e.into_inner()
    });
    std::mem::take(&mut *pending)
}

/// Remove the file of an aborted capture.
fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = ?path, "Removed aborted capture file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = ?path, error = %e, "Failed to remove aborted capture file"),
    }
}

/// Convert a normalized f32 sample to 16-bit PCM.
pub(crate) fn to_pcm16(sample: f32) -> i16 {
    let clamped = if sample.is_finite() {
        sample.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    (clamped * f32::from(i16::MAX)) as i16
}
