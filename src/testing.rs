//! Helpers for testing streamers.
//!
//! Available in this crate's own tests and, for downstream decoder authors,
//! behind the `testing` feature.

use rand::Rng;

use crate::repr::Frame;
use crate::streaming::Streamer;

/// Chunk size used by [`collect`] and [`collect_num`].
pub const COLLECT_CHUNK: usize = 512;

/// A finite streamer replaying fixed data.
///
/// Returned by [`random_data_streamer`] and [`data_streamer`].
#[derive(Debug, Clone)]
pub struct DataStreamer {
    data: Vec<Frame>,
    pos: usize,
}

impl Streamer for DataStreamer {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        if self.pos >= self.data.len() {
            return (0, false);
        }
        let n = frames.len().min(self.data.len() - self.pos);
        frames[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        (n, true)
    }
}

/// A streamer that plays back `data` once.
pub fn data_streamer(data: Vec<Frame>) -> DataStreamer {
    DataStreamer { data, pos: 0 }
}

/// A streamer of `frames` random frames in `[-1.0, 1.0)`, plus a copy of the data.
pub fn random_data_streamer(frames: usize) -> (DataStreamer, Vec<Frame>) {
    let mut rng = rand::thread_rng();
    let data: Vec<Frame> = (0..frames)
        .map(|_| Frame::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect();
    (data_streamer(data.clone()), data)
}

/// Pull every frame from `streamer` until it reports exhaustion.
///
/// # Panics
/// Panics if the streamer produces more frames than requested, or makes no
/// progress for 10 000 consecutive pulls without terminating.
pub fn collect<S: Streamer>(mut streamer: S) -> Vec<Frame> {
    let mut out = Vec::new();
    let mut buf = vec![Frame::SILENCE; COLLECT_CHUNK];
    let mut stalls = 0;
    loop {
        let (n, ok) = streamer.stream(&mut buf);
        assert!(n <= buf.len(), "streamer produced {n} frames for a request of {}", buf.len());
        out.extend_from_slice(&buf[..n]);
        if !ok {
            return out;
        }
        if n == 0 {
            stalls += 1;
            assert!(stalls < 10_000, "streamer stalled without terminating");
        } else {
            stalls = 0;
        }
    }
}

/// Pull up to `num` frames from `streamer`, stopping early if it ends.
pub fn collect_num<S: Streamer + ?Sized>(num: usize, streamer: &mut S) -> Vec<Frame> {
    let mut out = Vec::with_capacity(num);
    let mut buf = vec![Frame::SILENCE; COLLECT_CHUNK];
    while out.len() < num {
        let want = (num - out.len()).min(buf.len());
        let (n, ok) = streamer.stream(&mut buf[..want]);
        assert!(n <= want, "streamer produced {n} frames for a request of {want}");
        out.extend_from_slice(&buf[..n]);
        if !ok || n == 0 {
            break;
        }
    }
    out
}

/// Assert that `streamer` follows the pull protocol for a stream of
/// `expected_len` frames.
///
/// Drains all but the last 50 frames in full chunks, then asks for a whole
/// chunk and expects exactly the 50 remaining frames while still non-terminal,
/// and finally expects `(0, false)` on every later call.
///
/// # Panics
/// Panics on any protocol violation, or if `expected_len <= 50`.
pub fn assert_streamer_return_behaviour<S: Streamer>(mut streamer: S, expected_len: usize) {
    const LEAVE_UNREAD: usize = 50;
    assert!(
        expected_len > LEAVE_UNREAD,
        "expected_len must exceed {LEAVE_UNREAD} frames"
    );

    let mut buf = vec![Frame::SILENCE; COLLECT_CHUNK];
    let mut left = expected_len - LEAVE_UNREAD;
    while left > 0 {
        let want = left.min(buf.len());
        let (n, ok) = streamer.stream(&mut buf[..want]);
        assert!(ok, "streamer ended with {left} frames still expected before the tail");
        assert_eq!(n, want, "streamer under-delivered with {left} frames left");
        left -= n;
    }

    let (n, ok) = streamer.stream(&mut buf);
    assert!(ok, "streamer ended before delivering its last {LEAVE_UNREAD} frames");
    assert_eq!(n, LEAVE_UNREAD, "unexpected tail length");

    for _ in 0..3 {
        let (n, ok) = streamer.stream(&mut buf);
        assert_eq!((n, ok), (0, false), "exhaustion must be sticky");
    }
    assert_eq!(streamer.stream(&mut []), (0, false));
}
