//! `probe` command: load one image the way the engine would.

use lazyimg::loader::{LoaderConfig, ProbeLoader};

use super::build_runtime;
use crate::error::CliError;

/// Fetch `url` once and print what was found.
pub fn run(url: &str, loader_config: LoaderConfig) -> Result<(), CliError> {
    let timeout_secs = loader_config.timeout_secs;
    let loader = ProbeLoader::from_config(loader_config)?;
    let runtime = build_runtime()?;

    tracing::debug!(url, timeout_secs, "Probing image");
    let info = runtime.block_on(loader.probe(url))?;

    println!("{}", url);
    println!("  {}", info);
    Ok(())
}
