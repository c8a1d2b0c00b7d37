//! Tracing subscriber setup for the binary.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Env var consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "AIDATA_LOG";

/// Resolve the filter: `AIDATA_LOG`, then `RUST_LOG`, then `fallback`.
pub fn resolve_filter(fallback: &str) -> Result<EnvFilter> {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        return EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid {}: {}", LOG_ENV, directives));
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .context("Failed to create log filter")
}

/// Install the global stderr subscriber. Safe to call once per process;
/// later calls are ignored.
pub fn init_logging(fallback: &str) -> Result<()> {
    let filter = resolve_filter(fallback)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init();
    Ok(())
}
