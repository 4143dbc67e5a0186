//! Top-level poll loop over every monitored folder.
//!
//! Sequential mode visits folders in configuration order, so a stale
//! folder's cooldown delays later folders for that round. Concurrent mode
//! gives each folder its own thread and its own tick/sleep loop.

use std::thread;

use anyhow::Result;

use super::supervisor::{FolderSupervisor, TickOutcome};
use super::{MonitoredFolder, WatchContext, WatchError};
use crate::log;
use crate::logger::{status_error, status_success};

pub struct WatchCoordinator<'a> {
    supervisors: Vec<FolderSupervisor<'a>>,
    ctx: WatchContext<'a>,
}

impl<'a> WatchCoordinator<'a> {
    /// Validate folders and build one supervisor each.
    ///
    /// Fails with `ConfigurationInvalid` before anything is scanned when an
    /// update action does not exist or a pattern does not compile.
    pub fn new(folders: &'a [MonitoredFolder], ctx: WatchContext<'a>) -> Result<Self, WatchError> {
        if folders.is_empty() {
            return Err(WatchError::ConfigurationInvalid(
                "no folders to watch".into(),
            ));
        }

        let missing: Vec<String> = folders
            .iter()
            .filter(|f| !f.action.path.is_file())
            .map(|f| {
                format!(
                    "update action `{}` for `{}` does not exist",
                    f.action.path.display(),
                    f.path.display()
                )
            })
            .collect();
        if !missing.is_empty() {
            return Err(WatchError::ConfigurationInvalid(missing.join("; ")));
        }

        let supervisors = folders
            .iter()
            .map(|folder| FolderSupervisor::new(folder, ctx))
            .collect::<Result<_, _>>()?;

        Ok(Self { supervisors, ctx })
    }

    pub fn supervisors(&self) -> &[FolderSupervisor<'a>] {
        &self.supervisors
    }

    /// One sequential round over every folder.
    pub fn tick_all(&self) -> Result<Vec<TickOutcome>, WatchError> {
        let mut outcomes = Vec::with_capacity(self.supervisors.len());
        for supervisor in &self.supervisors {
            if self.ctx.clock.is_cancelled() {
                return Err(WatchError::Cancelled);
            }
            outcomes.push(supervisor.tick()?);
        }
        Ok(outcomes)
    }

    /// Poll until a stop is requested.
    pub fn run(&self, concurrent: bool) -> Result<()> {
        let timing = self.ctx.timing;
        log!(
            "watch";
            "watching {} folder(s), check every {:.1}s, cooldown {:.1}s, {} precision{}",
            self.supervisors.len(),
            timing.check_interval.as_secs_f64(),
            timing.cooldown_period.as_secs_f64(),
            timing.precision.label(),
            if concurrent { ", concurrent" } else { "" }
        );

        let result = if concurrent {
            self.run_concurrent()
        } else {
            self.run_sequential()
        };

        match result {
            Ok(()) | Err(WatchError::Cancelled) => {
                log!("watch"; "stopped");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn run_sequential(&self) -> Result<(), WatchError> {
        let mut iteration = 0usize;
        loop {
            iteration += 1;
            let outcomes = self.tick_all()?;
            report_round(iteration, &outcomes);
            self.ctx.clock.sleep(self.ctx.timing.check_interval)?;
        }
    }

    fn run_concurrent(&self) -> Result<(), WatchError> {
        let ctx = self.ctx;
        thread::scope(|scope| {
            let handles: Vec<_> = self
                .supervisors
                .iter()
                .map(|supervisor| scope.spawn(move || supervise(supervisor, ctx)))
                .collect();

            let mut result = Ok(());
            for handle in handles {
                let outcome = handle
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
                if let Err(e) = outcome
                    && !matches!(e, WatchError::Cancelled)
                    && result.is_ok()
                {
                    result = Err(e);
                }
            }
            result
        })
    }
}

/// Independent tick/sleep loop for one folder.
fn supervise(supervisor: &FolderSupervisor<'_>, ctx: WatchContext<'_>) -> Result<(), WatchError> {
    let mut iteration = 0usize;
    loop {
        iteration += 1;
        let outcome = supervisor.tick()?;
        log!(
            "watch";
            "{}: iteration {}, {}",
            supervisor.path().display(),
            iteration,
            outcome_label(&outcome)
        );
        ctx.clock.sleep(ctx.timing.check_interval)?;
    }
}

fn report_round(iteration: usize, outcomes: &[TickOutcome]) {
    let unavailable = outcomes
        .iter()
        .filter(|o| matches!(o, TickOutcome::Unavailable))
        .count();
    if unavailable == 0 {
        status_success(&format!("iteration {iteration}: {} folder(s) checked", outcomes.len()));
    } else {
        status_error(
            &format!("iteration {iteration}: {unavailable} folder(s) unavailable"),
            "",
        );
    }
}

fn outcome_label(outcome: &TickOutcome) -> &'static str {
    match outcome {
        TickOutcome::Unavailable => "unavailable",
        TickOutcome::Indeterminate(_) => "indeterminate",
        TickOutcome::NotStale => "up to date",
        TickOutcome::Aborted => "aborted",
        TickOutcome::Triggered(record) if record.is_success() => "triggered",
        TickOutcome::Triggered(_) => "trigger failed",
    }
}
