//! Partition scanned files into Group A (upstream) and Group B (downstream).
//!
//! Each list is tried in order and the first matching pattern claims the
//! file for that group. The two lists are independent, so a file can land
//! in both groups.

use regex::Regex;

use super::snapshot::{FileObservation, GroupSnapshot};

/// Ordered list of unanchored regular expressions.
#[derive(Debug, Clone)]
pub struct PatternList {
    patterns: Vec<Regex>,
}

impl PatternList {
    /// Compile every pattern, failing on the first invalid one.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Index of the first pattern found anywhere in `name`.
    pub fn first_match(&self, name: &str) -> Option<usize> {
        self.patterns.iter().position(|re| re.is_match(name))
    }

}

/// Group snapshots produced by one classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub group_a: GroupSnapshot,
    pub group_b: GroupSnapshot,
}

#[derive(Debug, Clone)]
pub struct GroupClassifier {
    group_a: PatternList,
    group_b: PatternList,
}

impl GroupClassifier {
    pub fn new(group_a: PatternList, group_b: PatternList) -> Self {
        Self { group_a, group_b }
    }

    pub fn classify(&self, observations: &[FileObservation]) -> Classified {
        let mut classified = Classified::default();

        for obs in observations {
            if let Some(idx) = self.group_a.first_match(&obs.name) {
                crate::debug!("scan"; "{} -> group A (pattern #{})", obs.name, idx);
                classified.group_a.insert(obs.name.clone(), obs.modified);
            }
            if let Some(idx) = self.group_b.first_match(&obs.name) {
                crate::debug!("scan"; "{} -> group B (pattern #{})", obs.name, idx);
                classified.group_b.insert(obs.name.clone(), obs.modified);
            }
        }

        classified
    }
}
