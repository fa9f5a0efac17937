// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)]
// Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::box_collection)] // Warns on boxed `Vec`, `String`, etc.
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::let_unit_value)] // Avoids binding `()` to variables
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_safety_doc)] // Docs for `unsafe` functions
#![warn(missing_docs)]

//! # AudioStreams
//!
//! Pull-based audio streaming: composable producers of stereo frames, a
//! dynamic mixer, and an output sink that drives them at the device's pace.
//!
//! ## Overview
//!
//! Every producer implements [`Streamer`]: the consumer owns a buffer of
//! [`Frame`]s and asks the streamer to fill it. Nothing is pushed; a sound
//! plays exactly as fast as something downstream pulls it.
//!
//! The [`OutputSink`] sits at the bottom of the graph. It owns a root
//! streamer, normally a [`Mixer`], and hands a real-time renderer to a
//! backend which pulls the root in fixed-size ticks.
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! audio_streams = "0.1"
//! ```
//!
//! ## Features
//!
//! - `wav` (default): WAV decoder adapter (using `hound` crate)
//! - `playback`: hardware output through `cpal`
//! - `serialization`: `serde` support for configuration types
//! - `testing`: helpers for checking third-party streamers
//!
//! ## Quick Start
//!
//! ```rust
//! use audio_streams::{Frame, Mixer, SampleRate, Streamer};
//! use audio_streams::streaming::{Generator, silence, take};
//!
//! let mut mixer = Mixer::new();
//! mixer.add(take(441, Generator::sine(440.0, SampleRate::CD)));
//! mixer.add(silence(100));
//!
//! let mut buf = vec![Frame::SILENCE; 256];
//! let (n, ok) = mixer.stream(&mut buf);
//! assert_eq!((n, ok), (256, true));
//! ```
//!
//! ## Playing Through a Sink
//!
//! ```rust
//! use audio_streams::{Mixer, OutputSink, SinkConfig};
//! use audio_streams::playback::OfflineBackend;
//! use audio_streams::streaming::silence;
//!
//! # fn main() -> Result<(), audio_streams::PlaybackError> {
//! let (mut backend, device) = OfflineBackend::new();
//! let sink = OutputSink::init(&mut backend, Mixer::new(), SinkConfig::default())?;
//!
//! sink.play(silence(1000))?;
//! let samples = device.tick()?; // one 1470-frame tick, interleaved stereo
//! assert_eq!(samples.len(), 2 * 1470);
//!
//! sink.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Streamers never return errors from [`Streamer::stream`]; a producer that
//! fails midway simply ends early. Errors appear only where something is
//! constructed or controlled:
//!
//! - [`AudioStreamError`] / [`DecodeError`] when building streamers and
//!   reading headers
//! - [`PlaybackError`] when opening a sink or using one after it was closed

mod error;
pub mod playback;
mod repr;
pub mod streaming;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::error::{AudioStreamError, AudioStreamResult, DecodeError};
pub use crate::playback::{
    AudioBackend, Mixer, OutputSink, PlaybackError, PlaybackResult, SinkConfig, SinkMetrics,
};
pub use crate::repr::{Format, Frame, SampleRate};
pub use crate::streaming::{Streamer, from_fn};

/// Left channel index.
pub const LEFT: usize = 0;
/// Right channel index.
pub const RIGHT: usize = 1;
