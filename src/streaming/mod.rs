//! Pull-based streaming: the [`Streamer`] contract and the streamers built on it.
//!
//! Everything that produces audio in this crate is a [`Streamer`]. A consumer
//! owns a buffer of [`Frame`](crate::Frame)s and asks a streamer to fill it;
//! the streamer reports how many frames it wrote and whether it has more.
//! Because the contract is a single method, streamers nest freely: a
//! [`seq`] of [`Take`]s of decoders can be fed to a [`Mixer`](crate::Mixer)
//! alongside a [`Generator`].
//!
//! # Example
//!
//! ```rust
//! use audio_streams::{Frame, Streamer};
//! use audio_streams::streaming::{callback, seq, silence};
//!
//! let mut queue = seq([
//!     Box::new(silence(4)) as Box<dyn Streamer>,
//!     Box::new(callback(|| println!("finished"))),
//! ]);
//!
//! let mut buf = [Frame::SILENCE; 8];
//! assert_eq!(queue.stream(&mut buf), (4, true));
//! assert_eq!(queue.stream(&mut buf), (0, false));
//! ```

pub mod combinators;
pub mod notify;
pub mod sources;
pub mod traits;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use combinators::{
    Callback, Seq, Silence, Take, callback, seq, silence, silence_forever, take,
};
pub use notify::{Abandoned, Completion, Notify};
pub use sources::{Generator, GeneratorConfig, SignalType};
#[cfg(feature = "wav")]
pub use sources::wav::{self, WavStreamer};
pub use traits::{Streamer, StreamerFn, from_fn};
