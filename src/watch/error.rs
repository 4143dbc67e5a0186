//! Watcher error taxonomy.
//!
//! | Variant                | Scope       | Handling                              |
//! |------------------------|-------------|---------------------------------------|
//! | `DirectoryUnavailable` | folder/tick | skip, retry next tick                 |
//! | `ConfigurationInvalid` | startup     | fatal                                 |
//! | `DispatchFailure`      | episode     | logged + alerted, retried by next tick|
//! | `ScannerRead`          | file        | file treated as not observed          |
//! | `Cancelled`            | process     | stop signal seen at a sleep site      |

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("folder `{path}` is unavailable: {reason}")]
    DirectoryUnavailable { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("update action failed for `{folder}`: {detail}")]
    DispatchFailure { folder: PathBuf, detail: String },

    #[error("cannot read modification time of `{path}`")]
    ScannerRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stop requested")]
    Cancelled,
}

impl WatchError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DirectoryUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Errors that end the whole run rather than one tick or one episode.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigurationInvalid(_) | Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WatchError::unavailable("/data/reports", "not a directory");
        let display = err.to_string();
        assert!(display.contains("/data/reports"));
        assert!(display.contains("not a directory"));

        let err = WatchError::DispatchFailure {
            folder: PathBuf::from("/data/reports"),
            detail: "exit status: 1".into(),
        };
        assert!(err.to_string().contains("exit status: 1"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(WatchError::ConfigurationInvalid("x".into()).is_fatal());
        assert!(WatchError::Cancelled.is_fatal());
        assert!(!WatchError::unavailable("/x", "gone").is_fatal());
        assert!(
            !WatchError::DispatchFailure {
                folder: PathBuf::from("/x"),
                detail: String::new(),
            }
            .is_fatal()
        );
    }
}
