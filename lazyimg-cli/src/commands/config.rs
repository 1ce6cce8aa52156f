//! Configuration CLI commands.
//!
//! Provides `config path` and `config show`.

use clap::Subcommand;
use lazyimg::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective settings
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config: &ConfigFile) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => {
            run_show(config);
            Ok(())
        }
    }
}

/// Show the configuration file path.
fn run_path() -> Result<(), CliError> {
    let path = config_file_path()?;
    println!("{}", path.display());
    Ok(())
}

/// Print every setting, grouped by section.
fn run_show(config: &ConfigFile) {
    let loader = config.loader();
    let logging = config.logging();

    println!("[loader]");
    println!("  timeout_secs = {}", loader.timeout_secs);
    println!("  max_bytes = {}", loader.max_bytes);
    println!("  user_agent = {}", loader.user_agent);
    println!();
    println!("[logging]");
    println!("  level = {}", logging.level);
    match logging.directory {
        Some(directory) => println!("  directory = {}", directory.display()),
        None => println!("  directory = (not set)"),
    }
}
