//! Tracing subscriber setup for hosts embedding the engine.
//!
//! The filter comes from `CANVASFLOW_LOG` (same syntax as `RUST_LOG`), falling
//! back to the caller's default. Installing twice is a no-op.

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "CANVASFLOW_LOG";

pub const DEFAULT_FILTER: &str = "info";

static INSTALLED: OnceCell<()> = OnceCell::new();

fn build_filter(default_filter: &str) -> Result<EnvFilter> {
    match std::env::var(LOG_ENV_VAR) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives.trim())
            .map_err(|e| anyhow!("invalid {LOG_ENV_VAR} filter: {e}")),
        _ => EnvFilter::try_new(default_filter).map_err(|e| anyhow!("invalid log filter {default_filter:?}: {e}")),
    }
}

/// Install a global fmt subscriber. Returns Ok without reinstalling if one
/// was already set up by this function.
pub fn init_logging(default_filter: &str) -> Result<()> {
    INSTALLED
        .get_or_try_init(|| {
            let filter = build_filter(default_filter)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .try_init()
                .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
        })
        .map(|_| ())
}

pub fn is_initialized() -> bool {
    INSTALLED.get().is_some()
}
