//! Dynamic mixer combining any number of streamers into one.

use crate::repr::Frame;
use crate::streaming::Streamer;

/// Sums a changing set of streamers sample by sample.
///
/// The mixer itself never ends: every pull is filled completely and reported
/// as non-terminal. With nothing to play it produces silence, which makes it
/// suitable as the long-lived root of an [`OutputSink`](crate::OutputSink).
///
/// Children that report exhaustion are dropped right after the pull in which
/// they did so; whatever they produced in that pull is still mixed in. A child
/// that under-delivers without ending contributes only the frames it produced,
/// the rest of its span stays at the zero baseline.
///
/// Summation is plain addition with no rescaling, so the output may exceed
/// `[-1.0, 1.0]`. The mixer is not synchronized on its own; when it is a
/// sink's root, go through [`OutputSink::lock`](crate::OutputSink::lock).
#[derive(Default)]
pub struct Mixer {
    streamers: Vec<Box<dyn Streamer>>,
    scratch: Vec<Frame>,
    retired: Vec<bool>,
}

impl Mixer {
    /// Create an empty mixer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mixer with room for `children` streamers and pulls of
    /// up to `frames` frames before it needs to allocate.
    pub fn with_capacity(children: usize, frames: usize) -> Self {
        Self {
            streamers: Vec::with_capacity(children),
            scratch: vec![Frame::SILENCE; frames],
            retired: Vec::with_capacity(children),
        }
    }

    /// Add a streamer to the end of the active set. It is first pulled on the
    /// next call to [`stream`](Streamer::stream).
    pub fn add<S: Streamer + 'static>(&mut self, streamer: S) {
        self.add_boxed(Box::new(streamer));
    }

    /// Add an already boxed streamer.
    pub fn add_boxed(&mut self, streamer: Box<dyn Streamer>) {
        self.streamers.push(streamer);
    }

    /// Number of streamers still playing.
    pub fn len(&self) -> usize {
        self.streamers.len()
    }

    /// Returns true if no streamers are playing.
    pub fn is_empty(&self) -> bool {
        self.streamers.is_empty()
    }

    /// Drop every streamer; the mixer goes back to producing silence.
    pub fn clear(&mut self) {
        self.streamers.clear();
    }
}

impl AsMut<Mixer> for Mixer {
    fn as_mut(&mut self) -> &mut Mixer {
        self
    }
}

impl Streamer for Mixer {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let len = frames.len();
        frames.fill(Frame::SILENCE);
        if self.scratch.len() < len {
            self.scratch.resize(len, Frame::SILENCE);
        }

        self.retired.clear();
        for streamer in &mut self.streamers {
            let scratch = &mut self.scratch[..len];
            let (n, ok) = streamer.stream(scratch);
            let n = n.min(len);
            for (out, frame) in frames.iter_mut().zip(&scratch[..n]) {
                *out += *frame;
            }
            self.retired.push(!ok);
        }

        // Compact after the loop so indices stay valid while iterating.
        if self.retired.iter().any(|&done| done) {
            let mut flags = self.retired.iter();
            self.streamers
                .retain(|_| !flags.next().copied().unwrap_or(false));
            tracing::trace!(remaining = self.streamers.len(), "retired drained streamers");
        }

        (len, true)
    }
}
