//! Backend abstraction and configuration for output sinks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::error::{PlaybackError, PlaybackResult};
use super::sink::Renderer;
use crate::repr::SampleRate;

/// Something that can drive a [`Renderer`] in real time.
///
/// A backend owns (or simulates) the audio device. [`open`](Self::open) hands
/// it the renderer; from then on the backend calls
/// [`Renderer::render`] whenever it needs more output, on whatever thread it
/// likes, until the returned session is closed.
pub trait AudioBackend {
    /// Handle to a running output.
    type Session: OutputSession + 'static;

    /// Start producing output at the parameters in `config`.
    ///
    /// # Errors
    /// Returns [`PlaybackError::DeviceUnavailable`] or
    /// [`PlaybackError::DeviceNotFound`] if the output cannot be opened as
    /// requested.
    fn open(&mut self, config: &SinkConfig, renderer: Renderer) -> PlaybackResult<Self::Session>;
}

/// A running output started by an [`AudioBackend`].
pub trait OutputSession: Send {
    /// Stop calling the renderer and release the device.
    ///
    /// Must not return while a render call is still in progress, and must be
    /// safe to call more than once.
    fn close(&mut self);
}

/// Configuration for an [`OutputSink`](crate::OutputSink).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SinkConfig {
    /// Output sample rate
    pub sample_rate: SampleRate,

    /// Frames pulled from the root streamer per tick
    pub buffer_frames: usize,

    /// Preferred output device (None = use default)
    pub device: Option<String>,
}

impl Default for SinkConfig {
    /// CD sample rate with a 1/30 s tick (1470 frames).
    fn default() -> Self {
        let sample_rate = SampleRate::CD;
        Self {
            sample_rate,
            buffer_frames: sample_rate.n(Duration::from_secs(1) / 30),
            device: None,
        }
    }
}

impl SinkConfig {
    /// Create a configuration with an explicit tick size in frames.
    pub fn new(sample_rate: SampleRate, buffer_frames: usize) -> Self {
        Self {
            sample_rate,
            buffer_frames,
            device: None,
        }
    }

    /// Set the tick size from a duration at the configured sample rate.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.buffer_frames = self.sample_rate.n(period);
        self
    }

    /// Set buffer size in frames
    pub fn with_buffer_frames(mut self, buffer_frames: usize) -> Self {
        self.buffer_frames = buffer_frames;
        self
    }

    /// Set preferred device
    pub fn with_device(mut self, device_name: impl Into<String>) -> Self {
        self.device = Some(device_name.into());
        self
    }

    /// Wall-clock length of one tick.
    pub fn period(&self) -> Duration {
        self.sample_rate.d(self.buffer_frames)
    }

    /// Check that the configuration describes a usable output.
    ///
    /// # Errors
    /// Returns [`PlaybackError::InvalidConfig`] for a zero sample rate or a
    /// zero tick size.
    pub fn validate(&self) -> PlaybackResult<()> {
        if self.sample_rate.hz() == 0 {
            return Err(PlaybackError::InvalidConfig(
                "sample rate must be positive".to_string(),
            ));
        }
        if self.buffer_frames == 0 {
            return Err(PlaybackError::InvalidConfig(
                "buffer size must be at least one frame".to_string(),
            ));
        }
        Ok(())
    }
}

/// Counters describing what a sink has rendered so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkMetrics {
    /// Number of pulls from the root streamer
    pub ticks: u64,

    /// Total frames written to the output, silence included
    pub frames_rendered: u64,

    /// Frames the root failed to provide and that were filled with silence
    pub underrun_frames: u64,
}

impl SinkMetrics {
    /// Fraction of rendered frames that were underrun padding.
    pub fn underrun_ratio(&self) -> f64 {
        if self.frames_rendered > 0 {
            self.underrun_frames as f64 / self.frames_rendered as f64
        } else {
            0.0
        }
    }
}

/// Lock-free counters shared between a sink and its renderer.
#[derive(Debug, Default)]
pub(crate) struct MetricsCounters {
    ticks: AtomicU64,
    frames_rendered: AtomicU64,
    underrun_frames: AtomicU64,
}

impl MetricsCounters {
    pub(crate) fn record_tick(&self, rendered: usize, underrun: usize) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.frames_rendered
            .fetch_add(rendered as u64, Ordering::Relaxed);
        if underrun > 0 {
            self.underrun_frames
                .fetch_add(underrun as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self) -> SinkMetrics {
        SinkMetrics {
            ticks: self.ticks.load(Ordering::Relaxed),
            frames_rendered: self.frames_rendered.load(Ordering::Relaxed),
            underrun_frames: self.underrun_frames.load(Ordering::Relaxed),
        }
    }
}
