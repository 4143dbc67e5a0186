//! Configuration utility functions.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::path::normalize_path;

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /srv/reports/2024Q4/          ← cwd
/// /srv/reports/stalewatch.toml  ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    // Absolute paths are taken as given
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    find_config_file_from(&cwd, config_name)
}

/// Walk up from `start` looking for `config_name`.
fn find_config_file_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        // Move to parent directory
        match current.parent() {
            Some(parent) => current = parent,
            None => return None, // Reached filesystem root
        }
    }
}

/// Expand `$VAR`, `${VAR}` and `~`, then resolve relative paths against
/// `root` and normalize to an absolute path.
///
/// Returns a readable message when a variable is undefined.
pub fn expand_path(raw: &Path, root: &Path) -> Result<PathBuf, String> {
    let raw_str = raw.to_string_lossy();
    let expanded = shellexpand::full(&raw_str).map_err(|e| e.to_string())?;

    let path = PathBuf::from(expanded.as_ref());
    let full = if path.is_relative() {
        root.join(path)
    } else {
        path
    };
    Ok(normalize_path(&full))
}

/// Convert config seconds into a `Duration`, rejecting negative, NaN and
/// overflowing values.
pub fn secs(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}
