//! Core trait for pull-based audio producers.

use crate::repr::Frame;

/// A pull-based producer of stereo frames.
///
/// Decoders, generators and combinators (including the [`Mixer`](crate::Mixer))
/// all implement this one operation, so any of them can be nested inside any
/// other.
///
/// # Contract
///
/// `stream` is asked to fill `frames`; its length is the requested count and
/// may be zero. It returns `(produced, non_terminal)`:
///
/// - `produced <= frames.len()` always. Only `frames[..produced]` holds valid
///   data; the remainder is left untouched unless the implementation says
///   otherwise.
/// - `non_terminal == false` means the streamer is exhausted. This is
///   monotonic: every later call must return `(0, false)`.
/// - `produced < frames.len()` with `non_terminal == true` is a transient
///   underrun. Callers must not treat it as the end of the stream.
///
/// Runtime failures inside a producer (a read error halfway through a file,
/// say) are reported by terminating early, never by panicking. Nothing here
/// bounds the cost of a call; streamers pulled from the real-time thread must
/// be cheap enough for its budget.
pub trait Streamer: Send {
    /// Pull up to `frames.len()` frames into `frames`.
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool);
}

impl<S: Streamer + ?Sized> Streamer for Box<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        (**self).stream(frames)
    }
}

impl<S: Streamer + ?Sized> Streamer for &mut S {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        (**self).stream(frames)
    }
}

/// A streamer backed by a closure.
///
/// Created by [`from_fn`].
pub struct StreamerFn<F> {
    f: F,
}

impl<F> Streamer for StreamerFn<F>
where
    F: FnMut(&mut [Frame]) -> (usize, bool) + Send,
{
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        (self.f)(frames)
    }
}

/// Wrap a closure as a [`Streamer`].
///
/// The closure is responsible for honoring the streamer contract.
///
/// ```
/// use audio_streams::{Frame, Streamer, from_fn};
///
/// let mut ones = from_fn(|frames: &mut [Frame]| {
///     frames.fill(Frame::mono(1.0));
///     (frames.len(), true)
/// });
/// let mut buf = [Frame::SILENCE; 4];
/// assert_eq!(ones.stream(&mut buf), (4, true));
/// ```
pub fn from_fn<F>(f: F) -> StreamerFn<F>
where
    F: FnMut(&mut [Frame]) -> (usize, bool) + Send,
{
    StreamerFn { f }
}
