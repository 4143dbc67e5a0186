//! Quiescence cooldown: wait until Group A stops changing.
//!
//! ```text
//!            sample: a watched file got newer
//!            ┌──────────────────────────────┐
//!            ▼                              │
//! Stale ─► Running(baseline, window_start) ─┘
//!            │                    │
//!            │ window elapsed     │ folder unavailable
//!            ▼                    ▼
//!          Clear               Aborted
//! ```
//!
//! Only files present in the baseline are watched. A file that disappears is
//! simply not observed; it never resets the window. Each file is compared
//! with its own most recently observed time, not with the episode start.

use std::path::Path;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::WatchError;
use super::scanner::Scanner;
use super::snapshot::{FileObservation, GroupSnapshot};
use crate::core::Clock;

/// Terminal state of one cooldown.
#[derive(Debug)]
pub enum CooldownOutcome {
    /// A full window passed without any watched file changing.
    Clear,
    /// The folder could not be scanned; the episode is abandoned.
    Aborted(WatchError),
}

/// Debounce state for one staleness episode of one folder.
#[derive(Debug)]
pub struct QuiescenceCooldown<'a> {
    folder: &'a Path,
    baseline: GroupSnapshot,
    window_start: Instant,
    period: Duration,
    check_interval: Duration,
    restarts: usize,
}

impl<'a> QuiescenceCooldown<'a> {
    pub fn new(
        folder: &'a Path,
        baseline: GroupSnapshot,
        period: Duration,
        check_interval: Duration,
        now: Instant,
    ) -> Self {
        Self {
            folder,
            baseline,
            window_start: now,
            period,
            check_interval,
            restarts: 0,
        }
    }

    /// Time left in the current window.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.period
            .saturating_sub(now.saturating_duration_since(self.window_start))
    }

    pub fn is_clear(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.window_start) >= self.period
    }

    /// Wait before the next sample: one check interval, capped by what is
    /// left of the window.
    pub fn next_sleep(&self, now: Instant) -> Duration {
        self.check_interval.min(self.remaining(now))
    }

    /// Number of times the window was restarted so far.
    pub const fn restarts(&self) -> usize {
        self.restarts
    }

    #[cfg(test)]
    pub fn baseline(&self) -> &GroupSnapshot {
        &self.baseline
    }

    /// Apply one sample.
    ///
    /// Every watched file whose time moved forward gets its baseline entry
    /// updated, and the window restarts at `now`. Returns the changed names.
    pub fn observe(&mut self, observations: &[FileObservation], now: Instant) -> Vec<String> {
        let current: FxHashMap<&str, _> = observations
            .iter()
            .map(|obs| (obs.name.as_str(), obs.modified))
            .collect();

        let mut changed: Vec<String> = self
            .baseline
            .names()
            .filter(|name| {
                let recorded = self.baseline.get(name);
                matches!(
                    (current.get(name), recorded),
                    (Some(seen), Some(recorded)) if *seen > recorded
                )
            })
            .map(str::to_string)
            .collect();
        changed.sort();

        if !changed.is_empty() {
            for name in &changed {
                self.baseline.insert(name.clone(), current[name.as_str()]);
            }
            self.window_start = now;
            self.restarts += 1;
        }

        changed
    }

    /// Sample until the window clears or the folder becomes unavailable.
    ///
    /// Returns `Err(WatchError::Cancelled)` if a stop is requested while
    /// sleeping.
    pub fn run(
        mut self,
        scanner: &dyn Scanner,
        clock: &dyn Clock,
    ) -> Result<CooldownOutcome, WatchError> {
        loop {
            let now = clock.now();
            if self.is_clear(now) {
                crate::debug!(
                    "cooldown";
                    "{} settled after {} restart(s)",
                    self.folder.display(),
                    self.restarts()
                );
                return Ok(CooldownOutcome::Clear);
            }

            crate::logger::status_pending(&format!(
                "cooldown {}: {:.1}s left",
                self.folder.display(),
                self.remaining(now).as_secs_f64()
            ));
            clock.sleep(self.next_sleep(now))?;

            let observations = match scanner.scan(self.folder) {
                Ok(observations) => observations,
                Err(e) => return Ok(CooldownOutcome::Aborted(e)),
            };

            for name in self.observe(&observations, clock.now()) {
                crate::log!(
                    "cooldown";
                    "\"{}\" in {} was updated, restarting cooldown timer",
                    name,
                    self.folder.display()
                );
            }
        }
    }
}
