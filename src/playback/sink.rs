//! The output sink: a root streamer pulled at a fixed cadence by a backend.
//!
//! The control side ([`OutputSink`]) and the real-time side ([`Renderer`])
//! share the root behind a single mutex. The renderer holds it only for the
//! duration of one `stream` call; conversion to device samples happens after
//! the lock is released.

use std::sync::Arc;

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use super::error::{PlaybackError, PlaybackResult};
use super::mixer::Mixer;
use super::traits::{AudioBackend, MetricsCounters, OutputSession, SinkConfig, SinkMetrics};
use crate::repr::Frame;
use crate::streaming::notify::Notify;
use crate::streaming::traits::Streamer;

/// Exclusive access to a sink's root streamer.
///
/// The real-time side cannot pull while a guard is alive. Dropping the guard
/// unlocks; keep it short, holding it across a tick produces an audible gap.
/// Calling [`OutputSink::close`] while holding a guard deadlocks.
pub type RootGuard<'a, R> = MappedMutexGuard<'a, R>;

type Slot<R> = Arc<Mutex<Option<R>>>;
type Pull = Box<dyn FnMut(&mut [Frame]) -> Option<usize> + Send>;

/// Drives a root streamer into an audio backend.
///
/// The root is typically a [`Mixer`], which keeps producing silence when
/// nothing is playing. Any streamer works; one that ends simply leaves the
/// output silent from then on.
///
/// A closed sink has no root: control operations fail with
/// [`PlaybackError::SinkClosed`] and the renderer writes silence.
pub struct OutputSink<R: Streamer + 'static = Mixer> {
    root: Slot<R>,
    session: Mutex<Option<Box<dyn OutputSession>>>,
    config: SinkConfig,
    metrics: Arc<MetricsCounters>,
}

impl<R: Streamer + 'static> OutputSink<R> {
    /// Start pulling `root` through `backend`.
    ///
    /// # Errors
    /// Returns [`PlaybackError::InvalidConfig`] if `config` has a zero sample
    /// rate or buffer size, or whatever the backend reports if it cannot open
    /// the output.
    pub fn init<B: AudioBackend>(
        backend: &mut B,
        root: R,
        config: SinkConfig,
    ) -> PlaybackResult<Self> {
        config.validate()?;

        let slot: Slot<R> = Arc::new(Mutex::new(Some(root)));
        let metrics = Arc::new(MetricsCounters::default());

        let shared = Arc::clone(&slot);
        let pull: Pull = Box::new(move |frames: &mut [Frame]| {
            let mut guard = shared.lock();
            guard.as_mut().map(|root| root.stream(frames).0)
        });
        let renderer = Renderer::new(pull, config.buffer_frames, Arc::clone(&metrics));

        let session: Box<dyn OutputSession> = Box::new(backend.open(&config, renderer)?);
        tracing::debug!(
            sample_rate = config.sample_rate.hz(),
            buffer_frames = config.buffer_frames,
            device = config.device.as_deref().unwrap_or("default"),
            "output sink initialised"
        );

        Ok(Self {
            root: slot,
            session: Mutex::new(Some(session)),
            config,
            metrics,
        })
    }

    /// Lock the root for direct access.
    ///
    /// # Errors
    /// Returns [`PlaybackError::SinkClosed`] once the sink is closed.
    pub fn lock(&self) -> PlaybackResult<RootGuard<'_, R>> {
        MutexGuard::try_map(self.root.lock(), Option::as_mut)
            .map_err(|_| PlaybackError::SinkClosed)
    }

    /// Release a guard obtained from [`lock`](Self::lock).
    ///
    /// Same as dropping it.
    pub fn unlock(guard: RootGuard<'_, R>) {
        drop(guard);
    }

    /// Stop the backend and drop the root.
    ///
    /// Anything still playing is dropped too, which releases every
    /// [`play_and_wait`](Self::play_and_wait) caller. Calling this again is
    /// a no-op.
    ///
    /// Waits for the backend to finish its current render, so it deadlocks
    /// if the calling thread still holds a [`RootGuard`].
    pub fn close(&self) {
        let session = self.session.lock().take();
        let Some(mut session) = session else {
            return;
        };
        session.close();

        let root = self.root.lock().take();
        drop(root);
        tracing::debug!("output sink closed");
    }

    /// Returns true after [`close`](Self::close).
    pub fn is_closed(&self) -> bool {
        self.root.lock().is_none()
    }

    /// The configuration this sink was opened with.
    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    /// Snapshot of the render counters.
    pub fn metrics(&self) -> SinkMetrics {
        self.metrics.snapshot()
    }
}

impl<R: Streamer + AsMut<Mixer> + 'static> OutputSink<R> {
    /// Add `streamer` to the root mixer. It starts on the next tick.
    ///
    /// # Errors
    /// Returns [`PlaybackError::SinkClosed`] once the sink is closed.
    pub fn play<S: Streamer + 'static>(&self, streamer: S) -> PlaybackResult<()> {
        let mut root = self.lock()?;
        root.as_mut().add(streamer);
        Ok(())
    }

    /// Add `streamer` to the root mixer and block until it reports exhaustion.
    ///
    /// Must not be called from inside a streamer pulled by this sink.
    ///
    /// # Errors
    /// Returns [`PlaybackError::SinkClosed`] if the sink is closed before the
    /// call or before the streamer finishes, and [`PlaybackError::Stopped`]
    /// if the streamer is removed from the mixer (e.g. by
    /// [`Mixer::clear`]) while the sink stays open.
    pub fn play_and_wait<S: Streamer + 'static>(&self, streamer: S) -> PlaybackResult<()> {
        let (streamer, completion) = Notify::new(streamer);
        self.play(streamer)?;
        completion.wait().map_err(|_| {
            if self.is_closed() {
                PlaybackError::SinkClosed
            } else {
                PlaybackError::Stopped
            }
        })
    }
}

impl<R: Streamer + 'static> Drop for OutputSink<R> {
    fn drop(&mut self) {
        self.close();
    }
}

/// The real-time half of an [`OutputSink`], handed to the backend.
///
/// Each call to [`render`](Self::render) pulls the root in ticks of at most
/// the configured buffer size and writes interleaved stereo `f32`.
pub struct Renderer {
    pull: Pull,
    frames: Vec<Frame>,
    buffer_frames: usize,
    metrics: Arc<MetricsCounters>,
}

impl Renderer {
    fn new(pull: Pull, buffer_frames: usize, metrics: Arc<MetricsCounters>) -> Self {
        Self {
            pull,
            frames: vec![Frame::SILENCE; buffer_frames],
            buffer_frames,
            metrics,
        }
    }

    /// Frames pulled from the root per tick.
    pub fn buffer_frames(&self) -> usize {
        self.buffer_frames
    }

    /// Fill `out` with interleaved stereo samples.
    ///
    /// Frames the root does not provide are written as silence and counted
    /// as underrun. Samples are clamped to `[-1.0, 1.0]`.
    pub fn render(&mut self, out: &mut [f32]) {
        for chunk in out.chunks_mut(self.buffer_frames * 2) {
            let len = chunk.len() / 2;
            let frames = &mut self.frames[..len];
            let produced = (self.pull)(&mut *frames).unwrap_or(0).min(len);

            for (dst, frame) in chunk.chunks_exact_mut(2).zip(&frames[..produced]) {
                let frame = frame.clamped();
                dst[0] = frame.left as f32;
                dst[1] = frame.right as f32;
            }
            chunk[produced * 2..].fill(0.0);

            self.metrics.record_tick(len, len - produced);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::offline::OfflineBackend;
    use crate::repr::SampleRate;
    use crate::streaming::silence;
    use crate::testing::data_streamer;

    fn config(buffer_frames: usize) -> SinkConfig {
        SinkConfig::new(SampleRate::CD, buffer_frames)
    }

    #[test]
    fn renders_clamped_interleaved_stereo() {
        let (mut backend, device) = OfflineBackend::new();
        let root = data_streamer(vec![Frame::new(0.25, -0.5), Frame::new(2.0, -3.0)]);
        let sink = OutputSink::init(&mut backend, root, config(4)).expect("sink");

        let out = device.tick().expect("tick");
        assert_eq!(out, vec![0.25, -0.5, 1.0, -1.0, 0.0, 0.0, 0.0, 0.0]);

        let metrics = sink.metrics();
        assert_eq!(metrics.ticks, 1);
        assert_eq!(metrics.frames_rendered, 4);
        assert_eq!(metrics.underrun_frames, 2);
    }

    #[test]
    fn root_that_ends_leaves_silence() {
        let (mut backend, device) = OfflineBackend::new();
        let sink = OutputSink::init(&mut backend, silence(3), config(2)).expect("sink");
        for _ in 0..4 {
            assert!(device.tick().expect("tick").iter().all(|&s| s == 0.0));
        }
        assert_eq!(sink.metrics().underrun_frames, 5);
    }

    #[test]
    fn lock_gives_root_access() {
        let (mut backend, _device) = OfflineBackend::new();
        let sink = OutputSink::init(&mut backend, Mixer::new(), config(16)).expect("sink");
        let mut mixer = sink.lock().expect("lock");
        mixer.add(silence(10));
        assert_eq!(mixer.len(), 1);
        OutputSink::unlock(mixer);

        assert_eq!(sink.lock().expect("lock").len(), 1);
    }

    #[test]
    fn closed_sink_rejects_control_and_renders_silence() {
        let (mut backend, device) = OfflineBackend::new();
        let sink = OutputSink::init(&mut backend, Mixer::new(), config(4)).expect("sink");
        sink.close();
        sink.close();
        assert!(sink.is_closed());
        assert!(matches!(sink.lock(), Err(PlaybackError::SinkClosed)));
        assert!(matches!(sink.play(silence(1)), Err(PlaybackError::SinkClosed)));
        assert!(matches!(sink.play_and_wait(silence(1)), Err(PlaybackError::SinkClosed)));
        assert!(matches!(device.tick(), Err(PlaybackError::SinkClosed)));
    }

    #[test]
    fn invalid_config_fails_before_opening() {
        let (mut backend, device) = OfflineBackend::new();
        let result = OutputSink::init(&mut backend, Mixer::new(), config(0));
        assert!(matches!(result, Err(PlaybackError::InvalidConfig(_))));
        assert!(!device.is_open());
    }

    #[test]
    fn backend_failure_is_reported() {
        let mut backend = OfflineBackend::unavailable();
        let result = OutputSink::init(&mut backend, Mixer::new(), config(64));
        assert!(matches!(result, Err(PlaybackError::DeviceUnavailable { .. })));
    }

    #[test]
    fn renderer_splits_large_requests_into_ticks() {
        let (mut backend, device) = OfflineBackend::new();
        let sink = OutputSink::init(&mut backend, Mixer::new(), config(4)).expect("sink");
        let mut buf = vec![0.5f32; 2 * 10];
        device.render_into(&mut buf).expect("render");
        assert!(buf.iter().all(|&s| s == 0.0));

        let metrics = sink.metrics();
        assert_eq!(metrics.ticks, 3);
        assert_eq!(metrics.frames_rendered, 10);
        assert_eq!(metrics.underrun_frames, 0);
    }
}
