//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Folder staleness watcher
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: stalewatch.toml)
    #[arg(short = 'C', long, global = true, default_value = "stalewatch.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands (default: watch)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Poll every configured folder until interrupted
    #[command(visible_alias = "w")]
    Watch {
        /// Supervise each folder on its own thread
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        concurrent: Option<bool>,
    },

    /// Report the current staleness of every folder once, without running actions
    #[command(visible_alias = "c")]
    Check,
}

impl Cli {
    /// `--concurrent` given on the command line, if any.
    pub fn concurrent_override(&self) -> Option<bool> {
        match &self.command {
            Some(Commands::Watch { concurrent }) => *concurrent,
            _ => None,
        }
    }
}
