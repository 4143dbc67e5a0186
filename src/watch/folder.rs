use std::path::PathBuf;
use std::time::Duration;

use crate::dispatch::UpdateAction;

/// One folder under supervision, with everything resolved from config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredFolder {
    /// Absolute folder path.
    pub path: PathBuf,
    /// Ordered Group A (upstream) patterns.
    pub group_a: Vec<String>,
    /// Ordered Group B (downstream) patterns.
    pub group_b: Vec<String>,
    pub action: UpdateAction,
    /// Overrides the process-wide cooldown when set.
    pub cooldown_period: Option<Duration>,
}

impl MonitoredFolder {
    #[cfg(test)]
    pub fn new(
        path: impl Into<PathBuf>,
        group_a: &[&str],
        group_b: &[&str],
        action: UpdateAction,
    ) -> Self {
        Self {
            path: path.into(),
            group_a: group_a.iter().map(|s| (*s).to_string()).collect(),
            group_b: group_b.iter().map(|s| (*s).to_string()).collect(),
            action,
            cooldown_period: None,
        }
    }

    /// Cooldown for this folder, falling back to `default`.
    pub fn cooldown_or(&self, default: Duration) -> Duration {
        self.cooldown_period.unwrap_or(default)
    }
}
