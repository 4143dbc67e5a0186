//! Core primitives shared by the supervision loops: shutdown state and time.

mod clock;
mod state;

pub use clock::{Clock, SystemClock};
pub use state::{is_shutdown, setup_shutdown_handler};
