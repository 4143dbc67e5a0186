//! Utility modules shared across the watcher.

pub mod exec;
pub mod path;
