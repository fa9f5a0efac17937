//! Tests for signal generator sources.

use approx_eq::assert_approx_eq;
use std::time::Duration;

use crate::repr::{Frame, SampleRate};
use crate::streaming::sources::generator::*;
use crate::streaming::{Streamer, take};
use crate::testing::{assert_streamer_return_behaviour, collect, collect_num};

#[test]
fn test_sine_wave_generator_basic() {
    let mut generator = Generator::sine(1000.0, SampleRate(8000));
    assert_eq!(generator.len(), None);

    let frames = collect_num(8, &mut generator);
    assert_eq!(frames.len(), 8);
    assert_eq!(frames[0], Frame::SILENCE);
    // Quarter period at 8 samples per cycle.
    assert_approx_eq!(frames[2].left, 0.5, 1e-9);
    assert_approx_eq!(frames[6].left, -0.5, 1e-9);
    assert!(frames.iter().all(|f| f.left == f.right));
    assert!(!generator.is_finished());
}

#[test]
fn test_white_noise_generator_basic() {
    let mut generator = Generator::white_noise(SampleRate::CD);
    let frames = collect_num(1024, &mut generator);
    assert_eq!(frames.len(), 1024);
    assert!(frames.iter().all(|f| f.left.abs() <= 0.5));
    assert!(frames.iter().any(|f| !f.is_silent()));
}

#[test]
fn test_silence_generator_basic() {
    let mut generator = Generator::new(GeneratorConfig {
        signal_type: SignalType::Silence,
        ..Default::default()
    });
    let frames = collect_num(100, &mut generator);
    assert_eq!(frames, vec![Frame::SILENCE; 100]);
}

#[test]
fn test_generator_with_duration() {
    let config = GeneratorConfig {
        signal_type: SignalType::Sine { frequency: 1000.0 },
        amplitude: 0.5,
        sample_rate: SampleRate(48_000),
        duration: Some(Duration::from_millis(100)),
    };
    let generator = Generator::new(config);
    assert_eq!(generator.len(), Some(4800));

    let frames = collect(generator);
    assert_eq!(frames.len(), 4800);
}

#[test]
fn test_generator_return_behaviour() {
    let generator = Generator::sine(440.0, SampleRate::CD).with_duration(Duration::from_secs(1));
    assert_streamer_return_behaviour(generator, 44_100);
}

#[test]
fn test_with_duration_counts_from_current_position() {
    let mut generator = Generator::sine(440.0, SampleRate(1000));
    collect_num(250, &mut generator);
    assert_eq!(generator.generated_time(), Duration::from_millis(250));

    let mut generator = generator.with_duration(Duration::from_millis(100));
    assert_eq!(generator.len(), Some(350));
    assert_eq!(collect_num(1000, &mut generator).len(), 100);
    assert!(generator.is_finished());

    let mut buf = [Frame::SILENCE; 4];
    assert_eq!(generator.stream(&mut buf), (0, false));
}

#[test]
fn test_square_wave_duty_cycle() {
    let mut generator = Generator::new(GeneratorConfig {
        signal_type: SignalType::Square {
            frequency: 100.0,
            duty_cycle: 0.25,
        },
        amplitude: 1.0,
        sample_rate: SampleRate(800),
        duration: None,
    });
    let frames = collect_num(8, &mut generator);
    let highs = frames.iter().filter(|f| f.left > 0.0).count();
    assert_eq!(highs, 2);
}

#[test]
fn test_sawtooth_and_triangle_ranges() {
    for signal_type in [
        SignalType::Sawtooth { frequency: 440.0 },
        SignalType::Triangle { frequency: 440.0 },
    ] {
        let generator = Generator::new(GeneratorConfig {
            signal_type,
            amplitude: 0.8,
            ..Default::default()
        });
        let frames = collect(take(4410, generator));
        assert_eq!(frames.len(), 4410);
        assert!(frames.iter().all(|f| f.left.abs() <= 0.8 + 1e-12));
    }
}

#[test]
fn test_set_amplitude_applies_to_later_frames() {
    let mut generator = Generator::new(GeneratorConfig {
        signal_type: SignalType::Square {
            frequency: 1.0,
            duty_cycle: 0.5,
        },
        amplitude: 1.0,
        sample_rate: SampleRate(100),
        duration: None,
    });
    assert_eq!(collect_num(1, &mut generator), vec![Frame::mono(1.0)]);
    generator.set_amplitude(0.25);
    assert_eq!(collect_num(1, &mut generator), vec![Frame::mono(0.25)]);
}
