//! Per-folder tick: scan, classify, evaluate, cool down, dispatch.

use std::path::Path;

use super::classifier::{Classified, GroupClassifier, PatternList};
use super::cooldown::{CooldownOutcome, QuiescenceCooldown};
use super::staleness::{Comparison, MissingGroups, StalenessVerdict, evaluate};
use super::{MonitoredFolder, WatchContext, WatchError};
use crate::alert::Alert;
use crate::dispatch::{TriggerRecord, fire};
use crate::logger::format_opt_time;
use crate::{debug, log};

/// What one tick did for one folder.
#[derive(Debug)]
pub enum TickOutcome {
    /// Folder missing or unreadable; retried next tick.
    Unavailable,
    Indeterminate(MissingGroups),
    NotStale,
    /// Stale, but the folder vanished during the cooldown.
    Aborted,
    /// Cooldown cleared and the update action ran once.
    Triggered(TriggerRecord),
}

/// Scan result without side effects.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub classified: Classified,
    pub comparison: Comparison,
}

/// Supervision state for one monitored folder.
///
/// Holds no state between ticks. A tick blocks for the whole cooldown, so
/// episodes for the same folder never overlap.
pub struct FolderSupervisor<'a> {
    folder: &'a MonitoredFolder,
    classifier: GroupClassifier,
    ctx: WatchContext<'a>,
}

impl<'a> FolderSupervisor<'a> {
    pub fn new(folder: &'a MonitoredFolder, ctx: WatchContext<'a>) -> Result<Self, WatchError> {
        let compile = |patterns: &[String], group: &str| {
            PatternList::compile(patterns).map_err(|e| {
                WatchError::ConfigurationInvalid(format!(
                    "{group} pattern for `{}`: {e}",
                    folder.path.display()
                ))
            })
        };
        let classifier = GroupClassifier::new(
            compile(&folder.group_a, "Group A")?,
            compile(&folder.group_b, "Group B")?,
        );

        Ok(Self {
            folder,
            classifier,
            ctx,
        })
    }

    pub fn path(&self) -> &Path {
        &self.folder.path
    }

    /// Scan, classify and evaluate without cooling down or dispatching.
    pub fn inspect(&self) -> Result<Inspection, WatchError> {
        let observations = self.ctx.scanner.scan(self.path())?;
        let classified = self.classifier.classify(&observations);
        let comparison = evaluate(
            &classified.group_a,
            &classified.group_b,
            self.ctx.timing.precision,
        );
        Ok(Inspection {
            classified,
            comparison,
        })
    }

    /// Run one tick for this folder.
    ///
    /// Only `Cancelled` is returned as an error; everything else is
    /// folder-local and reported through the outcome.
    pub fn tick(&self) -> Result<TickOutcome, WatchError> {
        let path = self.path().display();

        let Inspection {
            classified,
            comparison,
        } = match self.inspect() {
            Ok(inspection) => inspection,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                log!("warning"; "{}, skipping", e);
                return Ok(TickOutcome::Unavailable);
            }
        };

        log!(
            "scan";
            "{}: newest Group A {}, oldest Group B {}",
            path,
            format_opt_time(comparison.newest_a),
            format_opt_time(comparison.oldest_b)
        );

        match comparison.verdict {
            StalenessVerdict::Indeterminate(missing) => {
                log!("warning"; "{}: no files matching {}", path, missing.label());
                return Ok(TickOutcome::Indeterminate(missing));
            }
            StalenessVerdict::NotStale => {
                debug!("watch"; "{}: up to date", path);
                return Ok(TickOutcome::NotStale);
            }
            StalenessVerdict::Stale => {}
        }

        let period = self.folder.cooldown_or(self.ctx.timing.cooldown_period);
        log!(
            "watch";
            "{}: Group A ({}) is not older than Group B ({}), cooling down for {:.1}s",
            path,
            format_opt_time(comparison.newest_a),
            format_opt_time(comparison.oldest_b),
            period.as_secs_f64()
        );

        let cooldown = QuiescenceCooldown::new(
            self.path(),
            classified.group_a,
            period,
            self.ctx.timing.check_interval,
            self.ctx.clock.now(),
        );
        match cooldown.run(self.ctx.scanner, self.ctx.clock)? {
            CooldownOutcome::Clear => {}
            CooldownOutcome::Aborted(e) => {
                log!("warning"; "cooldown aborted: {}", e);
                return Ok(TickOutcome::Aborted);
            }
        }

        if self.ctx.clock.is_cancelled() {
            return Err(WatchError::Cancelled);
        }

        Ok(TickOutcome::Triggered(self.trigger()))
    }

    /// Dispatch once, alerting on failure.
    fn trigger(&self) -> TriggerRecord {
        let record = fire(self.ctx.dispatcher, &self.folder.action, self.path());

        match record.error_detail() {
            None => log!(
                "dispatch";
                "{} finished for {} in {:.1}s",
                self.folder.action.display_name(),
                self.path().display(),
                record.elapsed.as_secs_f64()
            ),
            Some(detail) => {
                let err = WatchError::DispatchFailure {
                    folder: record.folder.clone(),
                    detail: detail.to_string(),
                };
                log!("error"; "{}", err);

                if let Err(e) = self.ctx.notifier.notify(&Alert::for_failure(&record)) {
                    log!("error"; "failed to send alert: {:#}", e);
                }
            }
        }

        record
    }
}
