//! A decorator that signals when the streamer it wraps runs out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

use super::traits::Streamer;
use crate::repr::Frame;

/// The wrapped streamer was dropped before it reported exhaustion.
///
/// Happens when a sink is closed, or a mixer cleared, while the sound is
/// still playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("streamer was dropped before it finished")]
pub struct Abandoned;

/// Forwards every pull to the wrapped streamer and fires a one-shot signal
/// the first time it reports exhaustion.
///
/// After that, the wrapped streamer is never pulled again and every call
/// returns `(0, false)`.
pub struct Notify<S> {
    inner: S,
    finished: Arc<AtomicBool>,
    tx: Option<Sender<()>>,
}

/// The waiting half of a [`Notify`].
#[derive(Clone)]
pub struct Completion {
    finished: Arc<AtomicBool>,
    rx: Receiver<()>,
}

impl<S: Streamer> Notify<S> {
    /// Wrap `inner`, returning the decorator and its completion handle.
    pub fn new(inner: S) -> (Self, Completion) {
        let (tx, rx) = channel::bounded(1);
        let finished = Arc::new(AtomicBool::new(false));
        let notify = Self {
            inner,
            finished: Arc::clone(&finished),
            tx: Some(tx),
        };
        (notify, Completion { finished, rx })
    }

    fn finish(&mut self) {
        self.finished.store(true, Ordering::Release);
        if let Some(tx) = self.tx.take() {
            // Capacity 1 and a single send: never blocks the pulling thread.
            let _ = tx.try_send(());
        }
    }
}

impl<S: Streamer> Streamer for Notify<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        if self.tx.is_none() {
            return (0, false);
        }
        let (n, ok) = self.inner.stream(frames);
        if !ok {
            self.finish();
        }
        (n, ok)
    }
}

impl Completion {
    /// Returns true once the wrapped streamer has reported exhaustion.
    pub fn is_done(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Block until the wrapped streamer reports exhaustion.
    ///
    /// # Errors
    /// Returns [`Abandoned`] if the streamer is dropped first.
    pub fn wait(&self) -> Result<(), Abandoned> {
        if self.is_done() {
            return Ok(());
        }
        match self.rx.recv() {
            Ok(()) => Ok(()),
            Err(_) if self.is_done() => Ok(()),
            Err(_) => Err(Abandoned),
        }
    }

    /// Block for at most `timeout`. Returns `Ok(false)` if the streamer is
    /// still playing when the time runs out.
    ///
    /// # Errors
    /// Returns [`Abandoned`] if the streamer is dropped first.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<bool, Abandoned> {
        if self.is_done() {
            return Ok(true);
        }
        match self.rx.recv_timeout(timeout) {
            Ok(()) => Ok(true),
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) if self.is_done() => Ok(true),
            Err(RecvTimeoutError::Disconnected) => Err(Abandoned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_streamer_return_behaviour, collect, random_data_streamer};

    #[test]
    fn forwards_data_unchanged() {
        let (inner, data) = random_data_streamer(777);
        let (notify, completion) = Notify::new(inner);
        assert_eq!(collect(notify), data);
        assert!(completion.is_done());
        assert_eq!(completion.wait(), Ok(()));
    }

    #[test]
    fn keeps_return_behaviour() {
        let (inner, _) = random_data_streamer(600);
        let (notify, _completion) = Notify::new(inner);
        assert_streamer_return_behaviour(notify, 600);
    }

    #[test]
    fn pending_until_exhausted() {
        let (inner, _) = random_data_streamer(100);
        let (mut notify, completion) = Notify::new(inner);

        let mut buf = [Frame::SILENCE; 100];
        assert_eq!(notify.stream(&mut buf), (100, true));
        assert!(!completion.is_done());
        assert_eq!(completion.wait_timeout(Duration::from_millis(5)), Ok(false));

        assert_eq!(notify.stream(&mut buf), (0, false));
        assert!(completion.is_done());
        assert_eq!(completion.wait_timeout(Duration::from_millis(5)), Ok(true));
        // A second wait after the signal was consumed still succeeds.
        assert_eq!(completion.wait(), Ok(()));
    }

    #[test]
    fn dropping_unfinished_streamer_abandons() {
        let (inner, _) = random_data_streamer(100);
        let (notify, completion) = Notify::new(inner);
        drop(notify);
        assert_eq!(completion.wait(), Err(Abandoned));
    }

    #[test]
    fn wait_wakes_across_threads() {
        let (inner, _) = random_data_streamer(2048);
        let (notify, completion) = Notify::new(inner);
        let puller = std::thread::spawn(move || collect(notify).len());
        assert_eq!(completion.wait(), Ok(()));
        assert_eq!(puller.join().ok(), Some(2048));
    }
}
