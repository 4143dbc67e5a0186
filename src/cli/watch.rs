//! `stalewatch watch`: poll every folder until interrupted.

use anyhow::Result;
use crossbeam::channel::Receiver;

use super::common::Services;
use crate::config::WatchConfig;
use crate::watch::WatchCoordinator;

pub fn run_watch(config: &WatchConfig, shutdown: Receiver<()>) -> Result<()> {
    let services = Services::new(config, shutdown);
    let folders = config.monitored_folders();

    let coordinator = WatchCoordinator::new(&folders, services.context(config))?;
    coordinator.run(config.watch.concurrent)
}
