//! lazyimg CLI - Command-line interface
//!
//! Drives the lazy image engine outside a browser: replay scroll scenarios
//! against a simulated page, probe a single image URL, and inspect the
//! configuration file.

mod commands;
mod error;
mod scenario;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use lazyimg::config::ConfigFile;
use lazyimg::logging::{init_logging, LoggingGuard};

use commands::config::ConfigCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "lazyimg", version, about = "Viewport-driven lazy image loading")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a scroll scenario against a simulated page
    Simulate {
        /// Scenario INI file
        scenario: PathBuf,

        /// Answer loads from the scenario's `fail` flags instead of fetching
        #[arg(long)]
        offline: bool,
    },

    /// Load one image URL or path and print its format and dimensions
    Probe {
        /// http(s) URL, file:// URL, or local path
        url: String,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

impl Commands {
    /// Whether the command needs the configuration file parsed.
    ///
    /// `config path` must keep working when the file is broken.
    fn reads_config(&self) -> bool {
        !matches!(self, Commands::Config(ConfigCommands::Path))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = if cli.command.reads_config() {
        ConfigFile::load()?
    } else {
        ConfigFile::default()
    };
    let _logging = init(&config, cli.verbose)?;

    match cli.command {
        Commands::Simulate { scenario, offline } => {
            commands::simulate::run(&scenario, offline, config.loader())
        }
        Commands::Probe { url } => commands::probe::run(&url, config.loader()),
        Commands::Config(command) => commands::config::run(command, &config),
    }
}

fn init(config: &ConfigFile, verbose: bool) -> Result<LoggingGuard, CliError> {
    let mut logging = config.logging();
    if verbose {
        logging = logging.with_level("debug");
    }
    Ok(init_logging(&logging)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_simulate_offline() {
        let cli = Cli::parse_from(["lazyimg", "-v", "simulate", "page.ini", "--offline"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Simulate { scenario, offline } => {
                assert_eq!(scenario, PathBuf::from("page.ini"));
                assert!(offline);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::parse_from(["lazyimg", "config", "show"]);
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Show)));
    }

    #[test]
    fn test_config_path_skips_config_file() {
        let path = Cli::parse_from(["lazyimg", "config", "path"]);
        assert!(!path.command.reads_config());

        for args in [
            vec!["lazyimg", "config", "show"],
            vec!["lazyimg", "simulate", "page.ini"],
            vec!["lazyimg", "probe", "photo.jpg"],
        ] {
            let cli = Cli::parse_from(args);
            assert!(cli.command.reads_config(), "{:?}", cli.command);
        }
    }
}
