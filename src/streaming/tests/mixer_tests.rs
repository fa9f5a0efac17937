//! Tests for the dynamic mixer.

use approx_eq::assert_approx_eq;

use super::sum_frames;
use crate::playback::Mixer;
use crate::repr::Frame;
use crate::streaming::{Generator, Streamer, silence, take};
use crate::testing::{collect_num, random_data_streamer};

const EPSILON: f64 = 1e-6;

fn assert_frames_close(actual: &[Frame], expected: &[Frame]) {
    assert_eq!(actual.len(), expected.len(), "Frame count mismatch");
    for (a, e) in actual.iter().zip(expected) {
        assert_approx_eq!(a.left, e.left, EPSILON);
        assert_approx_eq!(a.right, e.right, EPSILON);
    }
}

#[test]
fn test_mixes_samples() {
    let (s1, data1) = random_data_streamer(200);
    let (s2, data2) = random_data_streamer(200);

    let mut mixer = Mixer::new();
    mixer.add(s1);
    mixer.add(s2);

    let samples = collect_num(100, &mut mixer);
    assert_frames_close(&samples, &sum_frames(&data1[..100], &data2[..100]));

    let (s3, data3) = random_data_streamer(100);
    mixer.add(s3);

    let samples = collect_num(100, &mut mixer);
    let expected = sum_frames(&sum_frames(&data1[100..], &data2[100..]), &data3);
    assert_frames_close(&samples, &expected);
}

#[test]
fn test_drained_streamers_are_removed() {
    let (s1, _) = random_data_streamer(50);
    let (s2, _) = random_data_streamer(60);

    let mut mixer = Mixer::new();
    mixer.add(s1);
    mixer.add(s2);

    // Drain s1 without asking past its end.
    let samples = collect_num(50, &mut mixer);
    assert_eq!(samples.len(), 50);
    assert_eq!(mixer.len(), 2);

    // s1 now reports exhaustion; s2 still has 10 frames.
    let samples = collect_num(10, &mut mixer);
    assert_eq!(samples.len(), 10);
    assert_eq!(mixer.len(), 1);

    let samples = collect_num(10, &mut mixer);
    assert_eq!(samples.len(), 10);
    assert!(mixer.is_empty());
}

#[test]
fn test_plays_silence_when_nothing_produces() {
    let mut mixer = Mixer::new();

    let samples = collect_num(10, &mut mixer);
    assert_eq!(samples, vec![Frame::SILENCE; 10]);

    // Silence after a streamer is partly drained. The data streamer reports
    // exhaustion only on the pull after its last frame, so it is still counted.
    let (s, _) = random_data_streamer(50);
    mixer.add(s);
    let samples = collect_num(100, &mut mixer);
    assert_eq!(samples.len(), 100);
    assert_eq!(mixer.len(), 1);
    assert_eq!(&samples[50..], &[Frame::SILENCE; 50]);

    // Silence once it is fully drained.
    let samples = collect_num(10, &mut mixer);
    assert!(mixer.is_empty());
    assert_eq!(samples, vec![Frame::SILENCE; 10]);

    let samples = collect_num(10, &mut mixer);
    assert_eq!(samples, vec![Frame::SILENCE; 10]);
}

#[test]
fn test_mixer_never_terminates_or_overproduces() {
    let mut mixer = Mixer::new();
    mixer.add(take(300, Generator::white_noise(crate::SampleRate::CD)));
    mixer.add(silence(10));

    let mut buf = vec![Frame::SILENCE; 128];
    for len in [0usize, 1, 17, 128, 64, 128, 128] {
        let (n, ok) = mixer.stream(&mut buf[..len]);
        assert_eq!(n, len);
        assert!(ok);
    }
    assert!(mixer.is_empty());
}

#[test]
fn test_sum_is_not_clamped() {
    let mut mixer = Mixer::new();
    for _ in 0..3 {
        mixer.add(crate::testing::data_streamer(vec![Frame::new(0.5, -0.5); 4]));
    }
    let samples = collect_num(4, &mut mixer);
    assert_frames_close(&samples, &[Frame::new(1.5, -1.5); 4]);
}

#[test]
fn test_streamers_added_mid_stream_start_on_next_pull() {
    let mut mixer = Mixer::new();
    let (s1, data1) = random_data_streamer(20);
    mixer.add(s1);

    let first = collect_num(10, &mut mixer);
    assert_frames_close(&first, &data1[..10]);

    let (s2, data2) = random_data_streamer(10);
    mixer.add(s2);
    let second = collect_num(10, &mut mixer);
    assert_frames_close(&second, &sum_frames(&data1[10..], &data2));
}
