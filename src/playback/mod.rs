//! Real-time output: the mixer, the output sink and the backends that drive it.
//!
//! An [`OutputSink`] owns a root streamer (normally a [`Mixer`]) and hands a
//! [`Renderer`] to an [`AudioBackend`]. The backend pulls the root once per
//! tick of `buffer_frames` frames; the control side adds sounds through
//! [`OutputSink::play`] or locks the root directly.
//!
//! # Backends
//!
//! - [`OfflineBackend`]: no device, advanced one tick at a time by the caller
//! - [`ClockedBackend`]: renders on its own thread at real-time pace
//! - `CpalBackend` (feature `playback`): the host's audio device via cpal
//!
//! # Example
//!
//! ```rust
//! use audio_streams::playback::{ClockedBackend, Mixer, OutputSink, SinkConfig};
//! use audio_streams::streaming::silence;
//!
//! # fn main() -> Result<(), audio_streams::PlaybackError> {
//! let config = SinkConfig::default().with_buffer_frames(64);
//! let sink = OutputSink::init(&mut ClockedBackend::new(), Mixer::new(), config)?;
//! sink.play_and_wait(silence(256))?;
//! sink.close();
//! # Ok(())
//! # }
//! ```

pub mod clocked;
#[cfg(feature = "playback")]
pub mod devices;
pub mod error;
pub mod mixer;
pub mod offline;
pub mod sink;
pub mod traits;

// Re-export main types for convenience
pub use clocked::ClockedBackend;
#[cfg(feature = "playback")]
pub use devices::CpalBackend;
pub use error::{PlaybackError, PlaybackResult};
pub use mixer::Mixer;
pub use offline::{OfflineBackend, OfflineDevice};
pub use sink::{OutputSink, Renderer, RootGuard};
pub use traits::{AudioBackend, OutputSession, SinkConfig, SinkMetrics};
