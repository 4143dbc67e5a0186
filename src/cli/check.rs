//! `stalewatch check`: one scan and verdict per folder, no cooldown or dispatch.

use anyhow::{Result, bail};
use crossbeam::channel::Receiver;
use owo_colors::OwoColorize;

use super::common::Services;
use crate::config::WatchConfig;
use crate::log;
use crate::logger::format_opt_time;
use crate::watch::{Inspection, StalenessVerdict, WatchCoordinator};

pub fn run_check(config: &WatchConfig, shutdown: Receiver<()>) -> Result<()> {
    let services = Services::new(config, shutdown);
    let folders = config.monitored_folders();
    let coordinator = WatchCoordinator::new(&folders, services.context(config))?;

    let mut unavailable = 0;
    for supervisor in coordinator.supervisors() {
        let path = supervisor.path().display();
        match supervisor.inspect() {
            Ok(inspection) => log!("check"; "{}: {}", path, describe(&inspection)),
            Err(e) => {
                unavailable += 1;
                log!("error"; "{}", e);
            }
        }
    }

    if unavailable > 0 {
        bail!("{unavailable} of {} folder(s) unavailable", folders.len());
    }
    Ok(())
}

fn describe(inspection: &Inspection) -> String {
    let comparison = &inspection.comparison;
    let verdict = match comparison.verdict {
        StalenessVerdict::Stale => "stale".bright_red().bold().to_string(),
        StalenessVerdict::NotStale => "up to date".green().to_string(),
        StalenessVerdict::Indeterminate(missing) => {
            format!("{} (no {} files)", "indeterminate".yellow(), missing.label())
        }
    };

    format!(
        "{} [A: {} file(s), newest {} | B: {} file(s), oldest {}]",
        verdict,
        inspection.classified.group_a.len(),
        format_opt_time(comparison.newest_a),
        inspection.classified.group_b.len(),
        format_opt_time(comparison.oldest_b),
    )
}
