//! Signal generator source for streaming audio.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::repr::{Frame, SampleRate};
use crate::streaming::traits::Streamer;

/// Types of signals that can be generated.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalType {
    /// Pure sine wave
    Sine {
        /// Frequency in Hz
        frequency: f64,
    },
    /// Square wave
    Square {
        /// Frequency in Hz
        frequency: f64,
        /// Fraction of each period spent high, 0.0 to 1.0
        duty_cycle: f64,
    },
    /// Sawtooth wave
    Sawtooth {
        /// Frequency in Hz
        frequency: f64,
    },
    /// Triangle wave
    Triangle {
        /// Frequency in Hz
        frequency: f64,
    },
    /// White noise
    WhiteNoise,
    /// Silence (zeros)
    Silence,
}

/// Configuration for the signal generator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorConfig {
    /// Waveform to produce
    pub signal_type: SignalType,
    /// Peak amplitude
    pub amplitude: f64,
    /// Rate the phase advances at
    pub sample_rate: SampleRate,
    /// Length of the signal; `None` generates forever.
    pub duration: Option<Duration>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            signal_type: SignalType::Sine { frequency: 440.0 },
            amplitude: 0.5,
            sample_rate: SampleRate::CD,
            duration: None, // Infinite
        }
    }
}

/// A streamer that synthesizes a periodic signal or noise.
///
/// Both channels carry the same signal. With a `duration` the generator ends
/// after `sample_rate.n(duration)` frames; without one it never ends.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    phase: f64,
    current_frame: usize,
    total_frames: Option<usize>,
}

impl Generator {
    /// Create a new signal generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        let total_frames = config.duration.map(|d| config.sample_rate.n(d));
        Self {
            config,
            phase: 0.0,
            current_frame: 0,
            total_frames,
        }
    }

    /// Create an endless sine wave generator.
    pub fn sine(frequency: f64, sample_rate: SampleRate) -> Self {
        Self::new(GeneratorConfig {
            signal_type: SignalType::Sine { frequency },
            sample_rate,
            ..Default::default()
        })
    }

    /// Create an endless white noise generator.
    pub fn white_noise(sample_rate: SampleRate) -> Self {
        Self::new(GeneratorConfig {
            signal_type: SignalType::WhiteNoise,
            sample_rate,
            ..Default::default()
        })
    }

    /// Limit the generator to `duration`, measured from its current position.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.config.duration = Some(duration);
        self.total_frames = Some(self.current_frame + self.config.sample_rate.n(duration));
        self
    }

    /// Set the signal amplitude.
    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.config.amplitude = amplitude;
    }

    /// Get the current generated time.
    pub fn generated_time(&self) -> Duration {
        self.config.sample_rate.d(self.current_frame)
    }

    /// Total length in frames, if finite.
    pub fn len(&self) -> Option<usize> {
        self.total_frames
    }

    /// Returns true if a finite generator has produced all its frames.
    pub fn is_finished(&self) -> bool {
        self.total_frames
            .is_some_and(|total| self.current_frame >= total)
    }

    fn advance_phase(&mut self, frequency: f64) -> f64 {
        let phase = self.phase;
        self.phase += frequency / self.config.sample_rate.hz() as f64;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        phase
    }

    fn next_value(&mut self) -> f64 {
        let raw = match self.config.signal_type {
            SignalType::Sine { frequency } => {
                let phase = self.advance_phase(frequency);
                (2.0 * std::f64::consts::PI * phase).sin()
            }
            SignalType::Square {
                frequency,
                duty_cycle,
            } => {
                if self.advance_phase(frequency) < duty_cycle {
                    1.0
                } else {
                    -1.0
                }
            }
            SignalType::Sawtooth { frequency } => 2.0 * self.advance_phase(frequency) - 1.0,
            SignalType::Triangle { frequency } => {
                let phase = self.advance_phase(frequency);
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }
            SignalType::WhiteNoise => {
                let mut hasher = DefaultHasher::new();
                self.current_frame.hash(&mut hasher);
                // Map the hash onto -1.0..1.0
                (hasher.finish() as f64 / u64::MAX as f64) * 2.0 - 1.0
            }
            SignalType::Silence => 0.0,
        };
        raw * self.config.amplitude
    }
}

impl Streamer for Generator {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let n = match self.total_frames {
            Some(total) if self.current_frame >= total => return (0, false),
            Some(total) => frames.len().min(total - self.current_frame),
            None => frames.len(),
        };
        for frame in &mut frames[..n] {
            *frame = Frame::mono(self.next_value());
            self.current_frame += 1;
        }
        (n, true)
    }
}
