//! External command execution utilities.
//!
//! Provides a Builder-based API for running external programs with captured
//! output and optional stdin piping.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Update action with working directory and environment
//! Cmd::new("/opt/actions/update.sh")
//!     .arg(folder)
//!     .cwd(folder)
//!     .envs(&vars)
//!     .run()?;
//!
//! // Alert body piped to a mailer
//! Cmd::from_slice(&["mail", "-s", subject, "ops@example.com"])
//!     .stdin(body)
//!     .run()?;
//! ```

use anyhow::{Context, Result};
use std::{
    ffi::{OsStr, OsString},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    thread,
};

/// Lines of captured stderr/stdout kept in a failure message.
const MAX_OUTPUT_LINES: usize = 20;

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
    stdin_data: Option<Vec<u8>>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["mail"]` or `["python3", "update.py"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set environment variables for the subprocess.
    pub fn envs<K, V, I>(mut self, vars: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in vars {
            self.envs.push((k.as_ref().to_owned(), v.as_ref().to_owned()));
        }
        self
    }

    /// Set stdin data to pipe to the process.
    pub fn stdin<D: AsRef<[u8]>>(mut self, data: D) -> Self {
        self.stdin_data = Some(data.as_ref().to_vec());
        self
    }

    /// Execute the command and return output.
    ///
    /// A non-zero exit status is an error carrying the captured output.
    pub fn run(self) -> Result<Output> {
        match self.stdin_data {
            Some(_) => self.run_with_stdin(),
            None => self.run_simple(),
        }
    }

    /// Get the program name for error messages.
    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).envs(self.envs.iter().cloned());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Simple execution without stdin.
    fn run_simple(self) -> Result<Output> {
        let name = self.program_name();

        let output = self
            .command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to execute `{name}`"))?;

        if !output.status.success() {
            anyhow::bail!(format_error(&name, &output));
        }
        Ok(output)
    }

    /// Execution with stdin piping.
    ///
    /// Stdin is written from a separate thread so a child that fills its
    /// stdout before reading input cannot deadlock us. A child that exits
    /// without reading everything (`BrokenPipe`) is not an error; its exit
    /// status decides.
    fn run_with_stdin(self) -> Result<Output> {
        let name = self.program_name();
        let mut cmd = self.command();
        let stdin_data = self.stdin_data.unwrap_or_default();

        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn `{name}`"))?;

        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || match stdin.write_all(&stdin_data) {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
                other => other,
            })
        });

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for `{name}`"))?;

        let written = writer.map_or(Ok(()), |handle| {
            handle
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
        });

        if !output.status.success() {
            anyhow::bail!(format_error(&name, &output));
        }
        written.with_context(|| format!("Failed to write stdin to `{name}`"))?;

        Ok(output)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Format error message for failed command.
///
/// Only the last `MAX_OUTPUT_LINES` lines of each stream are kept.
fn format_error(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut msg = format!("Command `{name}` failed with {}", output.status);

    let stderr_tail = tail_lines(stderr.trim(), MAX_OUTPUT_LINES);
    if !stderr_tail.is_empty() {
        msg.push('\n');
        msg.push_str(&stderr_tail);
    }

    let stdout_tail = tail_lines(stdout.trim(), MAX_OUTPUT_LINES);
    if !stdout_tail.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(&stdout_tail);
    }
    msg
}

/// Last `max` lines of `text`, prefixed by an omission marker when cut.
fn tail_lines(text: &str, max: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= max {
        return text.to_string();
    }
    let omitted = lines.len() - max;
    format!("... ({omitted} lines omitted)\n{}", lines[omitted..].join("\n"))
}

// ============================================================================
// Tests
// ============================================================================
