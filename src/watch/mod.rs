//! Folder staleness engine.
//!
//! # Architecture
//!
//! ```text
//! WatchCoordinator ── tick ──► FolderSupervisor (one per folder)
//!                                   │
//!        Scanner ─► GroupClassifier ─► evaluate ─► QuiescenceCooldown
//!                                                        │ Clear
//!                                                        ▼
//!                                       TriggerDispatcher ─► FailureNotifier
//! ```
//!
//! Collaborators with side effects (filesystem, time, subprocesses) sit
//! behind the `Scanner`, `Clock`, `TriggerDispatcher` and `FailureNotifier`
//! traits and are bundled into a [`WatchContext`].

mod classifier;
mod cooldown;
mod coordinator;
mod error;
mod folder;
mod scanner;
mod snapshot;
mod staleness;
mod supervisor;


use std::time::Duration;

pub use classifier::PatternList;
pub use coordinator::WatchCoordinator;
pub use error::WatchError;
pub use folder::MonitoredFolder;
pub use scanner::{FsScanner, Scanner};
pub use snapshot::Precision;
pub use staleness::StalenessVerdict;
pub use supervisor::Inspection;

use crate::alert::FailureNotifier;
use crate::core::Clock;
use crate::dispatch::TriggerDispatcher;

/// Process-wide timing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchTiming {
    /// Wait between ticks and between cooldown samples.
    pub check_interval: Duration,
    /// Default quiet window before an update action fires.
    pub cooldown_period: Duration,
    /// Granularity of the staleness comparison.
    pub precision: Precision,
}

/// Shared collaborators for every supervision loop.
#[derive(Clone, Copy)]
pub struct WatchContext<'a> {
    pub scanner: &'a dyn Scanner,
    pub clock: &'a dyn Clock,
    pub dispatcher: &'a dyn TriggerDispatcher,
    pub notifier: &'a dyn FailureNotifier,
    pub timing: WatchTiming,
}
