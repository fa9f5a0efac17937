//! A backend without a device, advanced by hand.
//!
//! Useful for tests and for rendering a sink's output to memory: each call to
//! [`OfflineDevice::tick`] performs exactly one pull of the root.

use std::sync::Arc;

use parking_lot::Mutex;

use super::error::{PlaybackError, PlaybackResult};
use super::sink::Renderer;
use super::traits::{AudioBackend, OutputSession, SinkConfig};

type RendererSlot = Arc<Mutex<Option<Renderer>>>;

/// Backend whose output is driven by an [`OfflineDevice`].
#[derive(Default)]
pub struct OfflineBackend {
    slot: RendererSlot,
    unavailable: bool,
}

/// The caller-driven side of an [`OfflineBackend`].
#[derive(Clone)]
pub struct OfflineDevice {
    slot: RendererSlot,
}

/// Session returned by [`OfflineBackend::open`].
pub struct OfflineSession {
    slot: RendererSlot,
}

impl OfflineBackend {
    /// Create a backend and the device handle that drives it.
    pub fn new() -> (Self, OfflineDevice) {
        let backend = Self::default();
        let device = OfflineDevice {
            slot: Arc::clone(&backend.slot),
        };
        (backend, device)
    }

    /// A backend whose device can never be opened.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }
}

impl AudioBackend for OfflineBackend {
    type Session = OfflineSession;

    fn open(&mut self, _config: &SinkConfig, renderer: Renderer) -> PlaybackResult<OfflineSession> {
        if self.unavailable {
            return Err(PlaybackError::device_unavailable(
                "offline device is marked unavailable",
            ));
        }
        let mut slot = self.slot.lock();
        if slot.is_some() {
            return Err(PlaybackError::device_unavailable(
                "offline device is already in use",
            ));
        }
        *slot = Some(renderer);
        Ok(OfflineSession {
            slot: Arc::clone(&self.slot),
        })
    }
}

impl OutputSession for OfflineSession {
    fn close(&mut self) {
        self.slot.lock().take();
    }
}

impl Drop for OfflineSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl OfflineDevice {
    /// Returns true while a sink is attached.
    pub fn is_open(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Render one tick and return it as interleaved stereo samples.
    ///
    /// # Errors
    /// Returns [`PlaybackError::SinkClosed`] if no sink is attached.
    pub fn tick(&self) -> PlaybackResult<Vec<f32>> {
        let mut slot = self.slot.lock();
        let renderer = slot.as_mut().ok_or(PlaybackError::SinkClosed)?;
        let mut out = vec![0.0; renderer.buffer_frames() * 2];
        renderer.render(&mut out);
        Ok(out)
    }

    /// Render enough ticks to fill `out`.
    ///
    /// # Errors
    /// Returns [`PlaybackError::SinkClosed`] if no sink is attached.
    pub fn render_into(&self, out: &mut [f32]) -> PlaybackResult<()> {
        let mut slot = self.slot.lock();
        let renderer = slot.as_mut().ok_or(PlaybackError::SinkClosed)?;
        renderer.render(out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{Mixer, OutputSink};
    use crate::repr::SampleRate;

    #[test]
    fn device_detaches_when_sink_drops() {
        let (mut backend, device) = OfflineBackend::new();
        let sink = OutputSink::init(&mut backend, Mixer::new(), SinkConfig::new(SampleRate::CD, 8))
            .expect("sink");
        assert!(device.is_open());
        assert_eq!(device.tick().expect("tick").len(), 16);

        drop(sink);
        assert!(!device.is_open());
        assert!(device.tick().is_err());
    }

    #[test]
    fn second_sink_on_same_device_is_refused() {
        let (mut backend, _device) = OfflineBackend::new();
        let config = SinkConfig::new(SampleRate::CD, 8);
        let _first = OutputSink::init(&mut backend, Mixer::new(), config.clone()).expect("sink");
        let second = OutputSink::init(&mut backend, Mixer::new(), config);
        assert!(matches!(second, Err(PlaybackError::DeviceUnavailable { .. })));
    }
}
