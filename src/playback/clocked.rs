//! A backend that renders on its own thread at the sink's real-time rate.
//!
//! No device is involved; rendered buffers go to an optional consumer. This
//! paces playback like a sound card would, which makes it suitable for
//! headless hosts and for exercising blocking control calls in tests.

use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam::channel::{self, RecvTimeoutError, Sender};

use super::error::{PlaybackError, PlaybackResult};
use super::sink::Renderer;
use super::traits::{AudioBackend, OutputSession, SinkConfig};

type Consumer = Box<dyn FnMut(&[f32]) + Send>;

/// Backend that ticks once per buffer period on a dedicated thread.
#[derive(Default)]
pub struct ClockedBackend {
    consumer: Option<Consumer>,
}

impl ClockedBackend {
    /// A backend that discards what it renders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand every rendered buffer (interleaved stereo) to `consumer`.
    ///
    /// The consumer runs on the render thread and should not block.
    pub fn with_consumer<F>(consumer: F) -> Self
    where
        F: FnMut(&[f32]) + Send + 'static,
    {
        Self {
            consumer: Some(Box::new(consumer)),
        }
    }
}

/// Session returned by [`ClockedBackend::open`].
pub struct ClockedSession {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AudioBackend for ClockedBackend {
    type Session = ClockedSession;

    fn open(
        &mut self,
        config: &SinkConfig,
        mut renderer: Renderer,
    ) -> PlaybackResult<ClockedSession> {
        let period = config.period();
        let mut consumer = self.consumer.take();
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("audio-clock".to_string())
            .spawn(move || {
                let mut buf = vec![0.0f32; renderer.buffer_frames() * 2];
                let mut deadline = Instant::now();
                loop {
                    renderer.render(&mut buf);
                    if let Some(consumer) = consumer.as_mut() {
                        consumer(&buf);
                    }

                    deadline += period;
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match stop_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::trace!("audio clock thread stopped");
            })
            .map_err(|e| {
                PlaybackError::device_unavailable(format!("failed to spawn render thread: {e}"))
            })?;

        tracing::debug!(period_us = period.as_micros() as u64, "clocked output started");
        Ok(ClockedSession {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }
}

impl OutputSession for ClockedSession {
    fn close(&mut self) {
        // Dropping the sender wakes the render thread.
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("audio clock thread panicked");
            }
        }
    }
}

impl Drop for ClockedSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{Mixer, OutputSink};
    use crate::repr::{Frame, SampleRate};
    use crate::streaming::silence;
    use crate::testing::data_streamer;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    fn fast_config() -> SinkConfig {
        // 1 ms ticks keep the tests quick.
        SinkConfig::new(SampleRate(8_000), 8)
    }

    #[test]
    fn play_and_wait_returns_after_sound_finishes() {
        let sink = OutputSink::init(&mut ClockedBackend::new(), Mixer::new(), fast_config())
            .expect("sink");
        sink.play_and_wait(silence(40)).expect("played");
        assert!(sink.lock().expect("lock").is_empty());
        assert!(sink.metrics().ticks >= 5);
    }

    #[test]
    fn consumer_sees_rendered_audio() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink_capture = Arc::clone(&captured);
        let mut backend = ClockedBackend::with_consumer(move |buf: &[f32]| {
            sink_capture.lock().extend_from_slice(buf);
        });

        let sink = OutputSink::init(&mut backend, Mixer::new(), fast_config()).expect("sink");
        sink.play_and_wait(data_streamer(vec![Frame::new(0.5, -0.25); 16]))
            .expect("played");
        sink.close();

        let samples = captured.lock();
        let first = samples
            .chunks_exact(2)
            .position(|pair| pair.iter().any(|&s| s != 0.0))
            .expect("audio rendered");
        assert_eq!(&samples[first * 2..first * 2 + 2], &[0.5, -0.25]);
    }

    #[test]
    fn close_releases_waiters() {
        let sink = Arc::new(
            OutputSink::init(&mut ClockedBackend::new(), Mixer::new(), fast_config())
                .expect("sink"),
        );
        let waiter = {
            let sink = Arc::clone(&sink);
            std::thread::spawn(move || sink.play_and_wait(crate::streaming::silence_forever()))
        };

        while sink.lock().map(|mixer| mixer.is_empty()).unwrap_or(true) {
            std::thread::sleep(Duration::from_millis(1));
        }
        sink.close();

        let result = waiter.join().expect("waiter thread");
        assert!(matches!(result, Err(PlaybackError::SinkClosed)));
    }

    #[test]
    fn clearing_the_mixer_stops_waiters_without_closing() {
        let sink = Arc::new(
            OutputSink::init(&mut ClockedBackend::new(), Mixer::new(), fast_config())
                .expect("sink"),
        );
        let waiter = {
            let sink = Arc::clone(&sink);
            std::thread::spawn(move || sink.play_and_wait(crate::streaming::silence_forever()))
        };

        while sink.lock().map(|mixer| mixer.is_empty()).unwrap_or(true) {
            std::thread::sleep(Duration::from_millis(1));
        }
        sink.lock().expect("lock").clear();

        let err = waiter.join().expect("waiter thread").expect_err("stopped");
        assert!(matches!(err, PlaybackError::Stopped));
        assert!(!err.is_closed());
        assert!(!sink.is_closed());
        sink.play(silence(8)).expect("sink still open");
    }
}
