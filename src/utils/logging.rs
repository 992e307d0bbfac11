use crate::error::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Resolve the filter directive: `--verbose` wins, then `RUST_LOG`, then the configured level
pub fn resolve_filter(verbose: bool, configured_level: &str) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured_level))
}

/// Install the global tracing subscriber, writing to `log_file` when given
pub fn init_logging(verbose: bool, configured_level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = resolve_filter(verbose, configured_level);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    tracing::debug!("Logging initialized");
    Ok(())
}
