//! Watcher configuration (`stalewatch.toml`).
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error    # ConfigError, ConfigDiagnostics
//! ├── field    # FieldPath for diagnostics
//! ├── util     # config discovery, path expansion
//! └── mod.rs   # WatchConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section        | Purpose                                              |
//! |----------------|------------------------------------------------------|
//! | `[watch]`      | Poll interval, cooldown, precision, default patterns |
//! | `[[folders]]`  | Monitored folders, update actions, overrides         |
//! | `[alert]`      | Command used to deliver failure alerts               |
//!
//! # Example
//!
//! ```toml
//! [watch]
//! check_interval = 2
//! cooldown_period = 60
//! precision = "minute"
//! group_a = ["Data - Section", "Data - Taxes", "Related"]
//! group_b = ["Data - All", "Chain Summary"]
//!
//! [[folders]]
//! path = "$SHARE/Chain/2024Q4/Preliminary"
//! action = "actions/update.py"
//! runner = ["python3"]
//!
//! [alert]
//! command = ["mail", "-s", "$STALEWATCH_SUBJECT", "$STALEWATCH_MAIL_TO"]
//! to = ["ops@example.com"]
//! ```

mod error;
mod field;
mod util;

pub use error::{ConfigDiagnostics, ConfigError};
pub use field::FieldPath;
pub use util::{expand_path, find_config_file, secs};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::cli::Cli;
use crate::dispatch::{UpdateAction, default_args};
use crate::log;
use crate::watch::{MonitoredFolder, PatternList, Precision, WatchTiming};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing stalewatch.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Process-wide watch settings
    pub watch: WatchSection,

    /// Monitored folders
    pub folders: Vec<FolderConfig>,

    /// Failure alert delivery (log only when absent)
    pub alert: Option<AlertConfig>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchSection {
    /// Seconds between polls, also the cooldown sample interval.
    pub check_interval: f64,

    /// Seconds Group A must stay unchanged before the action fires.
    pub cooldown_period: f64,

    /// Granularity of the Group A / Group B comparison.
    pub precision: Precision,

    /// Supervise each folder on its own thread.
    pub concurrent: bool,

    /// Default Group A (upstream) patterns.
    pub group_a: Vec<String>,

    /// Default Group B (downstream) patterns.
    pub group_b: Vec<String>,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            check_interval: 2.0,
            cooldown_period: 2.0,
            precision: Precision::default(),
            concurrent: false,
            group_a: Vec::new(),
            group_b: Vec::new(),
        }
    }
}

/// One `[[folders]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FolderConfig {
    /// Folder to monitor.
    pub path: PathBuf,

    /// Update action run when the folder goes stale.
    pub action: PathBuf,

    /// Interpreter prefix for the action (e.g. `["python3"]`).
    pub runner: Vec<String>,

    /// Arguments after the action path (default: the folder path).
    pub args: Option<Vec<String>>,

    /// Group A override for this folder.
    pub group_a: Option<Vec<String>>,

    /// Group B override for this folder.
    pub group_b: Option<Vec<String>>,

    /// Cooldown override for this folder, in seconds.
    pub cooldown_period: Option<f64>,
}

/// `[alert]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Command receiving the alert body on stdin.
    /// Supports `$STALEWATCH_*` variable substitution.
    pub command: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

impl FolderConfig {
    /// Effective Group A patterns.
    pub fn group_a<'a>(&'a self, watch: &'a WatchSection) -> &'a [String] {
        self.group_a.as_deref().unwrap_or(&watch.group_a)
    }

    /// Effective Group B patterns.
    pub fn group_b<'a>(&'a self, watch: &'a WatchSection) -> &'a [String] {
        self.group_b.as_deref().unwrap_or(&watch.group_b)
    }
}

impl WatchConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Relative config names are searched upward from cwd. Relative paths
    /// inside the file are resolved against the file's directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let Some(config_path) = find_config_file(&cli.config) else {
            return Err(ConfigError::Validation(format!(
                "config file '{}' not found",
                cli.config.display()
            ))
            .into());
        };

        let mut config = Self::from_path(&config_path)?;
        if let Some(concurrent) = cli.concurrent_override() {
            config.watch.concurrent = concurrent;
        }
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    ///
    /// Unknown fields are reported as warnings and ignored. Paths are left
    /// as written and nothing is validated.
    pub fn from_str(content: &str) -> Result<Self> {
        let (config, ignored) = Self::parse_with_ignored(content)?;
        if !ignored.is_empty() {
            log!("warning"; "unknown config fields, ignoring: {}", ignored.join(", "));
        }
        Ok(config)
    }

    /// Load, resolve and validate a config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let mut config = Self::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        config.config_path = crate::utils::path::normalize_path(path);
        let root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut diag = ConfigDiagnostics::new();
        config.resolve_paths(&root, &mut diag);
        diag.into_result().map_err(ConfigError::Diagnostics)?;

        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Expand and absolutize folder and action paths.
    fn resolve_paths(&mut self, root: &Path, diag: &mut ConfigDiagnostics) {
        for (i, folder) in self.folders.iter_mut().enumerate() {
            match expand_path(&folder.path, root) {
                Ok(path) => folder.path = path,
                Err(e) => diag.error(FieldPath::indexed("folders", i, "path"), e),
            }
            match expand_path(&folder.action, root) {
                Ok(action) => folder.action = action,
                Err(e) => diag.error(FieldPath::indexed("folders", i, "action"), e),
            }
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting every error.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.validate_into(&mut diag);
        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    fn validate_into(&self, diag: &mut ConfigDiagnostics) {
        self.validate_watch(diag);
        self.validate_folders(diag);
        if let Some(alert) = &self.alert {
            Self::validate_alert(alert, diag);
        }
    }

    fn validate_watch(&self, diag: &mut ConfigDiagnostics) {
        let watch = &self.watch;

        if !matches!(secs(watch.check_interval), Some(d) if !d.is_zero()) {
            diag.error(
                FieldPath::new("watch.check_interval"),
                format!("must be a positive number of seconds, got {}", watch.check_interval),
            );
        }
        if secs(watch.cooldown_period).is_none() {
            diag.error(
                FieldPath::new("watch.cooldown_period"),
                format!("must be zero or more seconds, got {}", watch.cooldown_period),
            );
        }

        Self::validate_patterns(&watch.group_a, FieldPath::new("watch.group_a"), diag);
        Self::validate_patterns(&watch.group_b, FieldPath::new("watch.group_b"), diag);
    }

    fn validate_folders(&self, diag: &mut ConfigDiagnostics) {
        if self.folders.is_empty() {
            diag.error_with_hint(
                FieldPath::new("folders"),
                "no folders configured",
                "add a [[folders]] entry with `path` and `action`",
            );
            return;
        }

        let mut seen = FxHashSet::default();
        for (i, folder) in self.folders.iter().enumerate() {
            if folder.path.as_os_str().is_empty() {
                diag.error(FieldPath::indexed("folders", i, "path"), "path is required");
            } else if !seen.insert(folder.path.clone()) {
                diag.error(
                    FieldPath::indexed("folders", i, "path"),
                    format!("duplicate folder `{}`", folder.path.display()),
                );
            }

            if folder.action.as_os_str().is_empty() {
                diag.error(FieldPath::indexed("folders", i, "action"), "action is required");
            }

            if let Some(runner) = folder.runner.first()
                && which::which(runner).is_err()
            {
                diag.error_with_hint(
                    FieldPath::indexed("folders", i, "runner"),
                    format!("`{runner}` not found"),
                    "install it or use an absolute path",
                );
            }

            if let Some(cooldown) = folder.cooldown_period
                && secs(cooldown).is_none()
            {
                diag.error(
                    FieldPath::indexed("folders", i, "cooldown_period"),
                    format!("must be zero or more seconds, got {cooldown}"),
                );
            }

            if let Some(patterns) = &folder.group_a {
                Self::validate_patterns(patterns, FieldPath::indexed("folders", i, "group_a"), diag);
            }
            if let Some(patterns) = &folder.group_b {
                Self::validate_patterns(patterns, FieldPath::indexed("folders", i, "group_b"), diag);
            }

            if folder.group_a(&self.watch).is_empty() {
                diag.error_with_hint(
                    FieldPath::indexed("folders", i, "group_a"),
                    "no Group A patterns",
                    "set `watch.group_a` or a per-folder `group_a`",
                );
            }
            if folder.group_b(&self.watch).is_empty() {
                diag.error_with_hint(
                    FieldPath::indexed("folders", i, "group_b"),
                    "no Group B patterns",
                    "set `watch.group_b` or a per-folder `group_b`",
                );
            }
        }
    }

    fn validate_patterns(patterns: &[String], field: FieldPath, diag: &mut ConfigDiagnostics) {
        for pattern in patterns {
            if let Err(e) = PatternList::compile(std::slice::from_ref(pattern)) {
                diag.error(field.clone(), format!("invalid pattern `{pattern}`: {e}"));
            }
        }
    }

    fn validate_alert(alert: &AlertConfig, diag: &mut ConfigDiagnostics) {
        match alert.command.first() {
            None => diag.error_with_hint(
                FieldPath::new("alert.command"),
                "alert command is empty",
                "remove the [alert] section to log alerts only",
            ),
            Some(program) if which::which(program).is_err() => diag.error(
                FieldPath::new("alert.command"),
                format!("`{program}` not found"),
            ),
            Some(_) => {}
        }

        if alert.to.is_empty() {
            diag.warn(FieldPath::new("alert.to"), "no recipients configured");
        }
    }

    // ========================================================================
    // derived values
    // ========================================================================

    /// Shared timing settings.
    pub fn timing(&self) -> WatchTiming {
        WatchTiming {
            check_interval: secs(self.watch.check_interval)
                .filter(|d| !d.is_zero())
                .unwrap_or(Duration::from_secs(2)),
            cooldown_period: secs(self.watch.cooldown_period).unwrap_or_default(),
            precision: self.watch.precision,
        }
    }

    /// Build the monitored folders in configuration order.
    pub fn monitored_folders(&self) -> Vec<MonitoredFolder> {
        self.folders
            .iter()
            .map(|folder| MonitoredFolder {
                path: folder.path.clone(),
                group_a: folder.group_a(&self.watch).to_vec(),
                group_b: folder.group_b(&self.watch).to_vec(),
                action: UpdateAction {
                    path: folder.action.clone(),
                    runner: folder.runner.clone(),
                    args: folder.args.clone().unwrap_or_else(default_args),
                },
                cooldown_period: folder.cooldown_period.and_then(secs),
            })
            .collect()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> WatchConfig {
    let (parsed, ignored) = WatchConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BASIC: &str = r#"
[watch]
check_interval = 5
cooldown_period = 30.5
precision = "second"
group_a = ["Data - Section", "Related"]
group_b = ["Data - All"]

[[folders]]
path = "q4"
action = "update.sh"

[[folders]]
path = "q3"
action = "update.py"
runner = ["sh"]
args = ["--target", "$STALEWATCH_FOLDER"]
group_b = ["Chain Summary"]
cooldown_period = 0
"#;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("stalewatch.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(WatchConfig::from_str("[watch\ncheck_interval = 2").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.watch.check_interval, 2.0);
        assert_eq!(config.watch.cooldown_period, 2.0);
        assert_eq!(config.watch.precision, Precision::Minute);
        assert!(!config.watch.concurrent);
        assert!(config.folders.is_empty());
        assert!(config.alert.is_none());
    }

    #[test]
    fn test_parse_basic() {
        let config = test_parse_config(BASIC);
        assert_eq!(config.folders.len(), 2);

        let timing = config.timing();
        assert_eq!(timing.check_interval, Duration::from_secs(5));
        assert_eq!(timing.cooldown_period, Duration::from_millis(30_500));
        assert_eq!(timing.precision, Precision::Second);
    }

    #[test]
    fn test_per_folder_overrides() {
        let config = test_parse_config(BASIC);
        let folders = config.monitored_folders();

        assert_eq!(folders[0].group_b, vec!["Data - All".to_string()]);
        assert_eq!(folders[0].cooldown_period, None);
        assert_eq!(folders[0].action.args, default_args());

        assert_eq!(folders[1].group_a, vec!["Data - Section".to_string(), "Related".to_string()]);
        assert_eq!(folders[1].group_b, vec!["Chain Summary".to_string()]);
        assert_eq!(folders[1].cooldown_period, Some(Duration::ZERO));
        assert_eq!(folders[1].action.runner, vec!["sh".to_string()]);
        assert_eq!(folders[1].action.args[0], "--target");
    }

    #[test]
    fn test_unknown_fields_detected() {
        let (_, ignored) =
            WatchConfig::parse_with_ignored("[watch]\ncheck_intervall = 3\n[extra]\nx = 1").unwrap();
        assert!(ignored.iter().any(|f| f.contains("check_intervall")));
        assert!(ignored.iter().any(|f| f.contains("extra")));
    }

    #[test]
    fn test_from_path_resolves_relative_paths() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), BASIC);

        let config = WatchConfig::from_path(&path).unwrap();
        let root = crate::utils::path::normalize_path(temp.path());
        assert_eq!(config.config_path, root.join("stalewatch.toml"));
        assert_eq!(config.folders[0].path, root.join("q4"));
        assert_eq!(config.folders[0].action, root.join("update.sh"));
    }

    #[test]
    fn test_validation_collects_errors() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            temp.path(),
            r#"
[watch]
check_interval = 0
cooldown_period = -1
group_a = ["(broken"]

[[folders]]
path = "q4"
action = "update.sh"

[[folders]]
path = "q4"
action = "update.sh"
"#,
        );

        let err = WatchConfig::from_path(&path).unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics, got {err:?}");
        };

        let fields: Vec<_> = diag.errors().iter().map(|e| e.field.as_str().to_string()).collect();
        assert!(fields.contains(&"watch.check_interval".to_string()));
        assert!(fields.contains(&"watch.cooldown_period".to_string()));
        assert!(fields.contains(&"watch.group_a".to_string()));
        assert!(fields.contains(&"folders[1].path".to_string()));
        // group_b empty everywhere
        assert!(fields.contains(&"folders[0].group_b".to_string()));
    }

    #[test]
    fn test_no_folders_is_error() {
        let config = test_parse_config("[watch]\ngroup_a = [\"a\"]\ngroup_b = [\"b\"]");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_alert_command_is_error() {
        let mut config = test_parse_config(BASIC);
        config.alert = Some(AlertConfig::default());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("alert.command"));
    }

    #[test]
    fn test_missing_runner_is_error() {
        let mut config = test_parse_config(BASIC);
        config.folders[1].runner = vec!["no-such-interpreter-stalewatch".into()];
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("folders[1].runner"));
    }

    #[test]
    fn test_alert_section_parses() {
        let config = test_parse_config(
            r#"
[alert]
command = ["mail", "-s", "$STALEWATCH_SUBJECT", "$STALEWATCH_MAIL_TO"]
to = ["ops@example.com"]
bcc = ["audit@example.com"]
"#,
        );
        let alert = config.alert.unwrap();
        assert_eq!(alert.command[0], "mail");
        assert_eq!(alert.to, vec!["ops@example.com".to_string()]);
        assert!(alert.cc.is_empty());
    }
}
