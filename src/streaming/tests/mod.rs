//! Tests for streamers, the mixer and the decoder adapters.
//!
//! Unit tests for individual combinators live next to their code; these
//! cover behaviour that spans several components.

use crate::repr::Frame;

mod generator_tests;
mod mixer_tests;

/// Frame-wise sum of two equally long buffers.
pub(crate) fn sum_frames(a: &[Frame], b: &[Frame]) -> Vec<Frame> {
    assert_eq!(a.len(), b.len(), "Buffer length mismatch");
    a.iter().zip(b).map(|(x, y)| *x + *y).collect()
}
