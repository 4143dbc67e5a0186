//! Time source with a cancellable sleep.
//!
//! The two suspension points of the watcher (the inter-tick wait and the
//! cooldown sample wait) both go through `Clock::sleep`, so a stop signal is
//! observed wherever a loop can block.

use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, RecvTimeoutError};

use crate::watch::WatchError;

/// Monotonic time source and cancellable sleep.
pub trait Clock: Send + Sync {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Sleep for `duration`, returning `WatchError::Cancelled` as soon as a
    /// stop is requested.
    fn sleep(&self, duration: Duration) -> Result<(), WatchError>;

    /// Whether a stop has been requested.
    fn is_cancelled(&self) -> bool;
}

/// Real clock backed by `Instant` and the shutdown channel.
pub struct SystemClock {
    shutdown: Receiver<()>,
}

impl SystemClock {
    pub fn new(shutdown: Receiver<()>) -> Self {
        Self { shutdown }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> Result<(), WatchError> {
        match self.shutdown.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => Ok(()),
            // A message or a dropped sender both mean stop.
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Err(WatchError::Cancelled),
        }
    }

    fn is_cancelled(&self) -> bool {
        super::is_shutdown() || matches!(self.shutdown.try_recv(), Err(channel_err) if channel_err.is_disconnected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel;

    #[test]
    fn test_sleep_times_out_normally() {
        let (_tx, rx) = channel::bounded::<()>(0);
        let clock = SystemClock::new(rx);
        let start = Instant::now();
        assert!(clock.sleep(Duration::from_millis(20)).is_ok());
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(!clock.is_cancelled());
    }

    #[test]
    fn test_sleep_cancelled_by_dropped_sender() {
        let (tx, rx) = channel::bounded::<()>(0);
        let clock = SystemClock::new(rx);
        drop(tx);

        let start = Instant::now();
        let result = clock.sleep(Duration::from_secs(30));
        assert!(matches!(result, Err(WatchError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(clock.is_cancelled());
    }

    #[test]
    fn test_sleep_wakes_when_dropped_from_other_thread() {
        let (tx, rx) = channel::bounded::<()>(0);
        let clock = SystemClock::new(rx);

        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            drop(tx);
        });

        assert!(matches!(
            clock.sleep(Duration::from_secs(30)),
            Err(WatchError::Cancelled)
        ));
        handle.join().unwrap();
    }
}
