//! Stalewatch - run an update action when a folder's outputs fall behind its inputs.

mod alert;
mod cli;
mod config;
mod core;
mod dispatch;
mod logger;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::WatchConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    let shutdown = core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = WatchConfig::load(&cli)?;
    log!("config"; "loaded {}", config.config_path.display());

    match &cli.command {
        None | Some(Commands::Watch { .. }) => cli::watch::run_watch(&config, shutdown),
        Some(Commands::Check) => cli::check::run_check(&config, shutdown),
    }
}
