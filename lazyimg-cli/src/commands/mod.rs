//! CLI command implementations.

pub mod config;
pub mod probe;
pub mod simulate;

use tokio::runtime::Runtime;

use crate::error::CliError;

/// Single-threaded runtime for commands that drive load futures.
///
/// The engine's futures are not `Send`, so everything runs on the current
/// thread.
pub fn build_runtime() -> Result<Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))
}
