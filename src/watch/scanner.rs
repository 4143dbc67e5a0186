//! Directory scanning: regular files and their modification times.

use std::fs;
use std::path::Path;

use super::WatchError;
use super::snapshot::FileObservation;

/// Lists the regular files directly inside a directory.
pub trait Scanner: Send + Sync {
    /// Scan `dir` non-recursively.
    ///
    /// Fails with `DirectoryUnavailable` when `dir` is missing or not a
    /// directory. Files whose modification time cannot be read are skipped.
    fn scan(&self, dir: &Path) -> Result<Vec<FileObservation>, WatchError>;
}

/// Scanner over the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsScanner;

impl Scanner for FsScanner {
    fn scan(&self, dir: &Path) -> Result<Vec<FileObservation>, WatchError> {
        if !dir.is_dir() {
            let reason = if dir.exists() {
                "not a directory"
            } else {
                "path does not exist"
            };
            return Err(WatchError::unavailable(dir, reason));
        }

        let entries = fs::read_dir(dir).map_err(|e| WatchError::unavailable(dir, e))?;

        let mut observations = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    crate::log!("warning"; "skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();

            // Follows symlinks, so a link to a regular file counts as a file.
            match read_modified(&path) {
                Ok(Some(modified)) => {
                    let Ok(name) = entry.file_name().into_string() else {
                        crate::log!("warning"; "skipping non UTF-8 file name: {}", path.display());
                        continue;
                    };
                    observations.push(FileObservation::new(name, modified));
                }
                Ok(None) => {}
                Err(e) => {
                    crate::log!("warning"; "{}, skipping...", e);
                }
            }
        }

        crate::debug!("scan"; "{} files in {}", observations.len(), dir.display());
        Ok(observations)
    }
}

/// Modification time of a regular file, `None` for anything else.
fn read_modified(path: &Path) -> Result<Option<std::time::SystemTime>, WatchError> {
    let to_err = |source| WatchError::ScannerRead {
        path: path.to_path_buf(),
        source,
    };

    let meta = fs::metadata(path).map_err(to_err)?;
    if !meta.is_file() {
        return Ok(None);
    }
    meta.modified().map(Some).map_err(to_err)
}
