//! Small streamers built on the [`Streamer`] contract: silence, sequencing,
//! truncation and one-shot callbacks.

use std::collections::VecDeque;

use super::traits::Streamer;
use crate::repr::Frame;

/// Zero-valued frames, for a fixed number of frames or forever.
///
/// Created by [`silence`] and [`silence_forever`].
#[derive(Debug, Clone)]
pub struct Silence {
    remaining: Option<usize>,
}

impl Streamer for Silence {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let n = match self.remaining {
            Some(0) => return (0, false),
            Some(remaining) => remaining.min(frames.len()),
            None => frames.len(),
        };
        frames[..n].fill(Frame::SILENCE);
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= n;
        }
        (n, true)
    }
}

/// `frames` frames of silence, then exhaustion.
pub const fn silence(frames: usize) -> Silence {
    Silence {
        remaining: Some(frames),
    }
}

/// Endless silence; never terminates.
pub const fn silence_forever() -> Silence {
    Silence { remaining: None }
}

/// Plays streamers one after another.
///
/// Created by [`seq`]. A child that returns no frames without terminating
/// ends the current pull early; the next child never starts before the
/// current one is exhausted.
pub struct Seq {
    streamers: VecDeque<Box<dyn Streamer>>,
}

impl Seq {
    /// Append another streamer to the end of the sequence.
    pub fn push<S: Streamer + 'static>(&mut self, streamer: S) {
        self.streamers.push_back(Box::new(streamer));
    }

    /// Number of streamers not yet finished, including the current one.
    pub fn len(&self) -> usize {
        self.streamers.len()
    }

    /// Returns true once every streamer has finished.
    pub fn is_empty(&self) -> bool {
        self.streamers.is_empty()
    }
}

impl Streamer for Seq {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let mut filled = 0;
        while filled < frames.len() {
            let Some(current) = self.streamers.front_mut() else {
                break;
            };
            let rest = &mut frames[filled..];
            let (n, ok) = current.stream(rest);
            filled += n.min(rest.len());
            if !ok {
                self.streamers.pop_front();
            } else if n == 0 {
                break;
            }
        }
        if filled == 0 && self.streamers.is_empty() {
            return (0, false);
        }
        (filled, true)
    }
}

/// Chain streamers so each starts when the previous one is exhausted.
pub fn seq<I>(streamers: I) -> Seq
where
    I: IntoIterator<Item = Box<dyn Streamer>>,
{
    Seq {
        streamers: streamers.into_iter().collect(),
    }
}

/// The first `n` frames of another streamer.
///
/// Created by [`take`].
pub struct Take<S> {
    inner: S,
    remaining: usize,
    done: bool,
}

impl<S: Streamer> Take<S> {
    /// Frames still to be delivered before this streamer ends.
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Unwrap the inner streamer.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Streamer> Streamer for Take<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        if self.done || self.remaining == 0 {
            self.done = true;
            return (0, false);
        }
        let wanted = self.remaining.min(frames.len());
        let (n, ok) = self.inner.stream(&mut frames[..wanted]);
        let n = n.min(wanted);
        self.remaining -= n;
        if !ok {
            self.done = true;
        }
        (n, ok)
    }
}

/// Limit `streamer` to its first `n` frames.
pub const fn take<S: Streamer>(n: usize, streamer: S) -> Take<S> {
    Take {
        inner: streamer,
        remaining: n,
        done: false,
    }
}

/// Runs a closure the first time it is pulled, then reports exhaustion.
///
/// Created by [`callback`]. Useful at the end of a [`seq`] to learn that
/// everything before it has played. The closure runs on whichever thread
/// pulls it, which is the real-time thread once the streamer is playing.
pub struct Callback<F> {
    f: Option<F>,
}

impl<F> Streamer for Callback<F>
where
    F: FnOnce() + Send,
{
    fn stream(&mut self, _frames: &mut [Frame]) -> (usize, bool) {
        if let Some(f) = self.f.take() {
            f();
        }
        (0, false)
    }
}

/// A streamer that produces nothing and calls `f` once.
pub const fn callback<F>(f: F) -> Callback<F>
where
    F: FnOnce() + Send,
{
    Callback { f: Some(f) }
}
