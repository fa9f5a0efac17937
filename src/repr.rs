//! Core data types moved through the pipeline: frames, sample rates and formats.

use std::ops::{Add, AddAssign, Mul};
use std::time::Duration;

use crate::error::{AudioStreamError, AudioStreamResult};

/// One stereo sample pair.
///
/// Amplitudes are nominally in `[-1.0, 1.0]` but the range is not enforced;
/// summing several sources may exceed it. Clamping only happens where frames
/// are converted into a device sample format.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// Left channel amplitude.
    pub left: f64,
    /// Right channel amplitude.
    pub right: f64,
}

impl Frame {
    /// A frame of silence.
    pub const SILENCE: Frame = Frame {
        left: 0.0,
        right: 0.0,
    };

    /// Create a frame from its two channels.
    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Create a frame carrying the same value on both channels.
    pub const fn mono(value: f64) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    /// Returns the frame with both channels clamped to `[-1.0, 1.0]`.
    pub fn clamped(self) -> Self {
        Self {
            left: self.left.clamp(-1.0, 1.0),
            right: self.right.clamp(-1.0, 1.0),
        }
    }

    /// Returns true if both channels are exactly zero.
    pub fn is_silent(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

impl From<[f64; 2]> for Frame {
    fn from([left, right]: [f64; 2]) -> Self {
        Self { left, right }
    }
}

impl From<Frame> for [f64; 2] {
    fn from(frame: Frame) -> Self {
        [frame.left, frame.right]
    }
}

impl Add for Frame {
    type Output = Frame;

    fn add(self, rhs: Frame) -> Frame {
        Frame {
            left: self.left + rhs.left,
            right: self.right + rhs.right,
        }
    }
}

impl AddAssign for Frame {
    fn add_assign(&mut self, rhs: Frame) {
        self.left += rhs.left;
        self.right += rhs.right;
    }
}

impl Mul<f64> for Frame {
    type Output = Frame;

    fn mul(self, rhs: f64) -> Frame {
        Frame {
            left: self.left * rhs,
            right: self.right * rhs,
        }
    }
}

/// Number of frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(transparent))]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// CD rate, 44.1 kHz.
    pub const CD: SampleRate = SampleRate(44_100);

    /// Create a sample rate, rejecting zero.
    pub fn new(hz: u32) -> AudioStreamResult<Self> {
        if hz == 0 {
            return Err(AudioStreamError::invalid_parameter(
                "sample rate must be greater than zero",
            ));
        }
        Ok(Self(hz))
    }

    /// The rate in Hz.
    pub const fn hz(self) -> u32 {
        self.0
    }

    /// Number of frames that span the given duration, rounded to the nearest frame.
    pub fn n(self, duration: Duration) -> usize {
        const NANOS_PER_SEC: u128 = 1_000_000_000;
        let scaled = duration.as_nanos() * self.0 as u128 + NANOS_PER_SEC / 2;
        (scaled / NANOS_PER_SEC) as usize
    }

    /// Duration spanned by `frames` frames.
    pub fn d(self, frames: usize) -> Duration {
        if self.0 == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(frames as f64 / self.0 as f64)
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self::CD
    }
}

impl std::fmt::Display for SampleRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// Native layout of a decoded source.
///
/// The pipeline itself always carries stereo `f64` frames; a `Format` only
/// describes where the data came from. Streamers handed to a sink are assumed
/// to already run at the sink's sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Format {
    /// Frames per second of the source.
    pub sample_rate: SampleRate,
    /// Channels in the source encoding.
    pub num_channels: u16,
    /// Bits per sample in the source encoding.
    pub bit_depth: u16,
}

impl Format {
    /// Create a new format descriptor
    pub const fn new(sample_rate: SampleRate, num_channels: u16, bit_depth: u16) -> Self {
        Self {
            sample_rate,
            num_channels,
            bit_depth,
        }
    }

    /// Bytes used by one sample of one channel.
    pub const fn bytes_per_sample(&self) -> usize {
        (self.bit_depth as usize).div_ceil(8)
    }

    /// Bytes used by one frame (all channels).
    pub const fn width(&self) -> usize {
        self.num_channels as usize * self.bytes_per_sample()
    }
}
