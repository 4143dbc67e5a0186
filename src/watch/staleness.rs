//! Group A vs Group B comparison.

use std::time::SystemTime;

use super::snapshot::{GroupSnapshot, Precision};

/// Which group(s) had no matching files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingGroups {
    GroupA,
    GroupB,
    Both,
}

impl MissingGroups {
    pub const fn label(self) -> &'static str {
        match self {
            Self::GroupA => "Group A",
            Self::GroupB => "Group B",
            Self::Both => "Group A and Group B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalenessVerdict {
    /// Newest of A is at or after oldest of B.
    Stale,
    NotStale,
    /// At least one group is empty.
    Indeterminate(MissingGroups),
}

/// The two reduced values a verdict was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub newest_a: Option<SystemTime>,
    pub oldest_b: Option<SystemTime>,
    pub verdict: StalenessVerdict,
}

/// Decide whether Group B is out of date relative to Group A.
///
/// Ties count as stale: an output written in the same instant (at the
/// given precision) as its newest input is assumed not to include it.
pub fn evaluate(a: &GroupSnapshot, b: &GroupSnapshot, precision: Precision) -> Comparison {
    let newest_a = a.newest();
    let oldest_b = b.oldest();

    let verdict = match (newest_a, oldest_b) {
        (None, None) => StalenessVerdict::Indeterminate(MissingGroups::Both),
        (None, Some(_)) => StalenessVerdict::Indeterminate(MissingGroups::GroupA),
        (Some(_), None) => StalenessVerdict::Indeterminate(MissingGroups::GroupB),
        (Some(newest), Some(oldest)) => {
            if precision.truncate(newest) >= precision.truncate(oldest) {
                StalenessVerdict::Stale
            } else {
                StalenessVerdict::NotStale
            }
        }
    };

    Comparison {
        newest_a,
        oldest_b,
        verdict,
    }
}
