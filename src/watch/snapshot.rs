//! Per-scan observations and group snapshots.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// One regular file seen by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileObservation {
    pub name: String,
    pub modified: SystemTime,
}

impl FileObservation {
    pub fn new(name: impl Into<String>, modified: SystemTime) -> Self {
        Self {
            name: name.into(),
            modified,
        }
    }
}

/// File name → modification time for one group in one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSnapshot {
    entries: FxHashMap<String, SystemTime>,
}

impl GroupSnapshot {
    pub fn insert(&mut self, name: impl Into<String>, modified: SystemTime) {
        self.entries.insert(name.into(), modified);
    }

    pub fn get(&self, name: &str) -> Option<SystemTime> {
        self.entries.get(name).copied()
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Latest modification time, `None` when the group is empty.
    pub fn newest(&self) -> Option<SystemTime> {
        self.entries.values().copied().max()
    }

    /// Earliest modification time, `None` when the group is empty.
    pub fn oldest(&self) -> Option<SystemTime> {
        self.entries.values().copied().min()
    }
}

impl FromIterator<(String, SystemTime)> for GroupSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, SystemTime)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Granularity used when comparing Group A against Group B.
///
/// Both instants are truncated before comparison, so with `Minute` two
/// saves within the same minute count as simultaneous.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Whatever the platform reports.
    Exact,
    Second,
    #[default]
    Minute,
}

impl Precision {
    /// Truncate an instant down to this precision.
    ///
    /// Instants before the Unix epoch are returned unchanged.
    pub fn truncate(self, time: SystemTime) -> SystemTime {
        let step = match self {
            Self::Exact => return time,
            Self::Second => 1,
            Self::Minute => 60,
        };
        let Ok(since_epoch) = time.duration_since(UNIX_EPOCH) else {
            return time;
        };
        let secs = since_epoch.as_secs();
        UNIX_EPOCH + Duration::from_secs(secs - secs % step)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Second => "second",
            Self::Minute => "minute",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_empty_snapshot_has_no_extremes() {
        let snap = GroupSnapshot::default();
        assert_eq!(snap.len(), 0);
        assert_eq!(snap.newest(), None);
        assert_eq!(snap.oldest(), None);
    }

    #[test]
    fn test_newest_and_oldest() {
        let snap: GroupSnapshot = [
            ("a.xlsx".to_string(), at(100)),
            ("b.xlsx".to_string(), at(300)),
            ("c.xlsx".to_string(), at(200)),
        ]
        .into_iter()
        .collect();

        assert_eq!(snap.len(), 3);
        assert_eq!(snap.newest(), Some(at(300)));
        assert_eq!(snap.oldest(), Some(at(100)));
    }

    #[test]
    fn test_insert_replaces_entry() {
        let mut snap = GroupSnapshot::default();
        snap.insert("a.xlsx", at(10));
        snap.insert("a.xlsx", at(20));
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.get("a.xlsx"), Some(at(20)));
    }

    #[test]
    fn test_truncate_minute() {
        let t = at(1_700_000_059) + Duration::from_millis(999);
        assert_eq!(Precision::Minute.truncate(t), at(1_700_000_040));
        assert_eq!(Precision::Second.truncate(t), at(1_700_000_059));
        assert_eq!(Precision::Exact.truncate(t), t);
    }

    #[test]
    fn test_truncate_before_epoch_unchanged() {
        let t = UNIX_EPOCH - Duration::from_secs(5);
        assert_eq!(Precision::Minute.truncate(t), t);
    }
}
