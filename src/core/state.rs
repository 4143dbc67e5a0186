//! Shutdown state.
//!
//! Ctrl+C sets the `SHUTDOWN` flag and drops the only sender of the shutdown
//! channel. Every receiver handed out by `setup_shutdown_handler` then sees a
//! disconnect, which wakes all sleeping supervision loops at once.

use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Sender half of the shutdown channel; dropped to broadcast the stop.
static SHUTDOWN_TX: LazyLock<Mutex<Option<Sender<()>>>> = LazyLock::new(|| Mutex::new(None));

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// Returns the receiver that sleep sites wait on.
pub fn setup_shutdown_handler() -> anyhow::Result<Receiver<()>> {
    let (tx, rx) = channel::bounded(0);
    *SHUTDOWN_TX.lock() = Some(tx);

    ctrlc::set_handler(|| {
        crate::log!("watch"; "stop requested, finishing current step...");
        request_shutdown();
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))?;

    Ok(rx)
}

/// Mark shutdown and wake every waiter.
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
    SHUTDOWN_TX.lock().take();
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
