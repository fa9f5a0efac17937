//! Hardware output through CPAL.
//!
//! `cpal::Stream` cannot leave the thread that built it, so every session
//! owns a small thread that builds the stream, reports the outcome back to
//! [`CpalBackend::open`], and then parks until the session is closed.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, Device, FromSample, Host, Sample, SampleFormat, SizedSample, StreamConfig,
    SupportedStreamConfigRange,
};
use crossbeam::channel::{self, Sender};
use parking_lot::Mutex;

use super::error::{PlaybackError, PlaybackResult};
use super::sink::Renderer;
use super::traits::{AudioBackend, OutputSession, SinkConfig};

/// Output channels written by the renderer.
const CHANNELS: u16 = 2;

/// Backend that plays through the host's audio device.
pub struct CpalBackend {
    host: Host,
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpalBackend {
    /// Use the platform's default audio host.
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// Names of the output devices the host currently reports.
    ///
    /// # Errors
    /// Returns [`PlaybackError::Backend`] if the host cannot enumerate devices.
    pub fn output_device_names(&self) -> PlaybackResult<Vec<String>> {
        Ok(self
            .host
            .output_devices()?
            .filter_map(|device| device.name().ok())
            .collect())
    }

    fn find_device(&self, name: Option<&str>) -> PlaybackResult<Device> {
        match name {
            None => self
                .host
                .default_output_device()
                .ok_or_else(|| PlaybackError::device_unavailable("no default output device")),
            Some(name) => self
                .host
                .output_devices()?
                .find(|device| device.name().is_ok_and(|n| n == name))
                .ok_or_else(|| PlaybackError::device_not_found(name)),
        }
    }
}

/// Sample formats the renderer can be converted to, in order of preference.
const FORMATS: [SampleFormat; 4] = [
    SampleFormat::F32,
    SampleFormat::I16,
    SampleFormat::I32,
    SampleFormat::F64,
];

/// Pick the best stereo sample format offered at `rate`.
fn pick_format<I>(ranges: I, rate: cpal::SampleRate) -> Option<SampleFormat>
where
    I: IntoIterator<Item = SupportedStreamConfigRange>,
{
    let offered: Vec<SampleFormat> = ranges
        .into_iter()
        .filter(|range| {
            range.channels() == CHANNELS
                && range.min_sample_rate() <= rate
                && rate <= range.max_sample_rate()
        })
        .map(|range| range.sample_format())
        .collect();
    FORMATS.into_iter().find(|format| offered.contains(format))
}

/// Find a stereo sample format `device` can play at the requested rate.
fn negotiate_format(device: &Device, config: &SinkConfig) -> PlaybackResult<SampleFormat> {
    let rate = cpal::SampleRate(config.sample_rate.hz());
    let ranges = device
        .supported_output_configs()
        .map_err(|e| PlaybackError::device_unavailable(format!("cannot query device: {e}")))?;
    pick_format(ranges, rate).ok_or_else(|| {
        PlaybackError::device_unavailable(format!(
            "device has no supported stereo output format at {}",
            config.sample_rate
        ))
    })
}

/// Convert rendered `f32` samples into the device's sample type.
fn write_converted<T>(out: &mut [T], rendered: &[f32])
where
    T: Sample + FromSample<f32>,
{
    for (dst, &src) in out.iter_mut().zip(rendered) {
        *dst = T::from_sample(src);
    }
}

fn build_typed<T>(
    device: &Device,
    stream_config: &StreamConfig,
    renderer: Arc<Mutex<Renderer>>,
    scratch_len: usize,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let mut scratch = vec![0.0f32; scratch_len];
    device.build_output_stream(
        stream_config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            if scratch.len() < data.len() {
                scratch.resize(data.len(), 0.0);
            }
            let rendered = &mut scratch[..data.len()];
            renderer.lock().render(rendered);
            write_converted(data, rendered);
        },
        |err| tracing::warn!(error = %err, "audio output stream error"),
        None,
    )
}

fn build_stream(
    device: &Device,
    config: &SinkConfig,
    format: SampleFormat,
    renderer: Renderer,
) -> PlaybackResult<cpal::Stream> {
    let fixed = StreamConfig {
        channels: CHANNELS,
        sample_rate: cpal::SampleRate(config.sample_rate.hz()),
        buffer_size: BufferSize::Fixed(config.buffer_frames as u32),
    };
    let scratch_len = config.buffer_frames * CHANNELS as usize;

    // The callback may be dropped by a failed attempt, so the renderer lives
    // in a shared slot and each attempt gets its own handle to it.
    let renderer = Arc::new(Mutex::new(renderer));
    let attempt = |stream_config: &StreamConfig| {
        let renderer = Arc::clone(&renderer);
        match format {
            SampleFormat::I16 => build_typed::<i16>(device, stream_config, renderer, scratch_len),
            SampleFormat::I32 => build_typed::<i32>(device, stream_config, renderer, scratch_len),
            SampleFormat::F64 => build_typed::<f64>(device, stream_config, renderer, scratch_len),
            _ => build_typed::<f32>(device, stream_config, renderer, scratch_len),
        }
    };

    match attempt(&fixed) {
        Ok(stream) => Ok(stream),
        Err(cpal::BuildStreamError::StreamConfigNotSupported) => {
            tracing::debug!(
                buffer_frames = config.buffer_frames,
                "fixed buffer size rejected, using the device default"
            );
            let flexible = StreamConfig {
                buffer_size: BufferSize::Default,
                ..fixed
            };
            Ok(attempt(&flexible)?)
        }
        Err(err) => Err(err.into()),
    }
}

/// Session returned by [`CpalBackend::open`].
pub struct CpalSession {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AudioBackend for CpalBackend {
    type Session = CpalSession;

    fn open(&mut self, config: &SinkConfig, renderer: Renderer) -> PlaybackResult<CpalSession> {
        let device = self.find_device(config.device.as_deref())?;
        let format = negotiate_format(&device, config)?;

        let (ready_tx, ready_rx) = channel::bounded::<PlaybackResult<()>>(1);
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);
        let stream_config = config.clone();

        let handle = thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                let stream = match build_stream(&device, &stream_config, format, renderer) {
                    Ok(stream) => stream,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                if let Err(err) = stream.play() {
                    let _ = ready_tx.send(Err(err.into()));
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                // Blocks until the session drops its sender.
                let _ = stop_rx.recv();
                drop(stream);
                tracing::trace!("audio output thread stopped");
            })
            .map_err(|e| {
                PlaybackError::device_unavailable(format!("failed to spawn output thread: {e}"))
            })?;

        let mut session = CpalSession {
            stop: Some(stop_tx),
            handle: Some(handle),
        };
        match ready_rx.recv() {
            Ok(Ok(())) => {
                tracing::debug!(
                    device = config.device.as_deref().unwrap_or("default"),
                    format = ?format,
                    "cpal output stream started"
                );
                Ok(session)
            }
            Ok(Err(err)) => {
                session.close();
                Err(err)
            }
            Err(_) => {
                session.close();
                Err(PlaybackError::device_unavailable(
                    "output thread exited during setup",
                ))
            }
        }
    }
}

impl OutputSession for CpalSession {
    fn close(&mut self) {
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("audio output thread panicked");
            }
        }
    }
}

impl Drop for CpalSession {
    fn drop(&mut self) {
        self.close();
    }
}
