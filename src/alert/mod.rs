//! Failure alerts for update actions.
//!
//! Alerts are best effort: a notifier error is logged and never stops the
//! watcher.

use std::path::PathBuf;

use anyhow::Result;
use rustc_hash::FxHashMap;

use crate::config::AlertConfig;
use crate::dispatch::{FOLDER_VAR, TriggerRecord, resolve_args};
use crate::utils::exec::Cmd;

pub const SUBJECT_VAR: &str = "STALEWATCH_SUBJECT";
pub const MAIL_TO_VAR: &str = "STALEWATCH_MAIL_TO";
pub const MAIL_CC_VAR: &str = "STALEWATCH_MAIL_CC";
pub const MAIL_BCC_VAR: &str = "STALEWATCH_MAIL_BCC";

/// A message about one failed dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub folder: PathBuf,
    pub subject: String,
    pub body: String,
}

impl Alert {
    /// Compose the alert for a failed trigger.
    pub fn for_failure(record: &TriggerRecord) -> Self {
        let action_name = record
            .action
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| record.action.display().to_string());
        let detail = record.error_detail().unwrap_or("unknown error");

        Self {
            folder: record.folder.clone(),
            subject: format!("Critical Error: update action failed - {action_name}"),
            body: format!(
                "The update action '{}' for folder '{}' failed (started {}).\n\n\
                 Error details: {}\n\nPlease investigate.",
                record.action.display(),
                record.folder.display(),
                crate::logger::format_time(record.started_at),
                detail
            ),
        }
    }
}

/// Delivers failure alerts.
pub trait FailureNotifier: Send + Sync {
    fn notify(&self, alert: &Alert) -> Result<()>;
}

/// Writes the alert to the log only (no `[alert]` section configured).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl FailureNotifier for LogNotifier {
    fn notify(&self, alert: &Alert) -> Result<()> {
        crate::log!("alert"; "{}", alert.subject);
        crate::debug!("alert"; "{}", alert.body);
        Ok(())
    }
}

/// Runs the configured alert command with the body on stdin.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    config: AlertConfig,
}

impl CommandNotifier {
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    fn vars(&self, alert: &Alert) -> FxHashMap<String, String> {
        let mut vars = FxHashMap::default();
        vars.insert(SUBJECT_VAR.into(), alert.subject.clone());
        vars.insert(MAIL_TO_VAR.into(), self.config.to.join(","));
        vars.insert(MAIL_CC_VAR.into(), self.config.cc.join(","));
        vars.insert(MAIL_BCC_VAR.into(), self.config.bcc.join(","));
        vars.insert(FOLDER_VAR.into(), alert.folder.display().to_string());
        vars
    }
}

impl FailureNotifier for CommandNotifier {
    fn notify(&self, alert: &Alert) -> Result<()> {
        let vars = self.vars(alert);
        let command = resolve_args(&self.config.command, &vars);

        Cmd::from_slice(&command)
            .envs(&vars)
            .stdin(alert.body.as_bytes())
            .run()?;

        crate::log!("alert"; "failure notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::TriggerOutcome;
    use std::time::{Duration, SystemTime};

    fn failed_record() -> TriggerRecord {
        TriggerRecord {
            folder: PathBuf::from("/data/q4"),
            action: PathBuf::from("/opt/actions/update.py"),
            started_at: SystemTime::now(),
            elapsed: Duration::from_secs(1),
            outcome: TriggerOutcome::Failure("workbook locked".into()),
        }
    }

    #[test]
    fn test_alert_for_failure() {
        let alert = Alert::for_failure(&failed_record());
        assert_eq!(
            alert.subject,
            "Critical Error: update action failed - update.py"
        );
        assert!(alert.body.contains("/data/q4"));
        assert!(alert.body.contains("workbook locked"));
        assert_eq!(alert.folder, PathBuf::from("/data/q4"));
    }

    #[test]
    fn test_log_notifier_never_fails() {
        let alert = Alert::for_failure(&failed_record());
        assert!(LogNotifier.notify(&alert).is_ok());
    }

    #[test]
    fn test_recipient_vars() {
        let notifier = CommandNotifier::new(AlertConfig {
            command: vec!["mail".into()],
            to: vec!["a@example.com".into(), "b@example.com".into()],
            cc: vec![],
            bcc: vec!["audit@example.com".into()],
        });
        let vars = notifier.vars(&Alert::for_failure(&failed_record()));
        assert_eq!(vars[MAIL_TO_VAR], "a@example.com,b@example.com");
        assert_eq!(vars[MAIL_CC_VAR], "");
        assert_eq!(vars[MAIL_BCC_VAR], "audit@example.com");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_notifier_pipes_body() {
        let temp = tempfile::TempDir::new().unwrap();
        let out = temp.path().join("mail.txt");
        let notifier = CommandNotifier::new(AlertConfig {
            command: vec![
                "sh".into(),
                "-c".into(),
                format!(
                    "{{ echo \"$STALEWATCH_SUBJECT\"; echo \"$STALEWATCH_MAIL_TO\"; cat; }} > {}",
                    out.display()
                ),
            ],
            to: vec!["ops@example.com".into()],
            cc: vec![],
            bcc: vec![],
        });

        notifier
            .notify(&Alert::for_failure(&failed_record()))
            .unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("Critical Error: update action failed - update.py")
        );
        assert_eq!(lines.next(), Some("ops@example.com"));
        assert!(written.contains("workbook locked"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_notifier_failure_is_error() {
        let notifier = CommandNotifier::new(AlertConfig {
            command: vec!["false".into()],
            to: vec![],
            cc: vec![],
            bcc: vec![],
        });
        assert!(notifier.notify(&Alert::for_failure(&failed_record())).is_err());
    }
}
