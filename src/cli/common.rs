//! Collaborators shared by the `watch` and `check` commands.

use crossbeam::channel::Receiver;

use crate::alert::{CommandNotifier, FailureNotifier, LogNotifier};
use crate::config::WatchConfig;
use crate::core::SystemClock;
use crate::dispatch::CommandDispatcher;
use crate::watch::{FsScanner, WatchContext};

/// Real filesystem, clock, subprocess dispatcher and alert channel.
pub struct Services {
    scanner: FsScanner,
    clock: SystemClock,
    dispatcher: CommandDispatcher,
    notifier: Box<dyn FailureNotifier>,
}

impl Services {
    pub fn new(config: &WatchConfig, shutdown: Receiver<()>) -> Self {
        let notifier: Box<dyn FailureNotifier> = match &config.alert {
            Some(alert) => Box::new(CommandNotifier::new(alert.clone())),
            None => Box::new(LogNotifier),
        };

        Self {
            scanner: FsScanner,
            clock: SystemClock::new(shutdown),
            dispatcher: CommandDispatcher,
            notifier,
        }
    }

    pub fn context(&self, config: &WatchConfig) -> WatchContext<'_> {
        WatchContext {
            scanner: &self.scanner,
            clock: &self.clock,
            dispatcher: &self.dispatcher,
            notifier: self.notifier.as_ref(),
            timing: config.timing(),
        }
    }
}
