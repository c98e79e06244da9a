// Logging module - Logging infrastructure
use crate::domain::error::{RigError, RigResult};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// Diagnostics go to stderr so the operator console on stdout stays
/// readable. `RUST_LOG` overrides the configured level.
pub fn init_logging(level: &str, verbose: bool) -> RigResult<()> {
    let default_filter = if verbose {
        "radrig=debug".to_string()
    } else {
        format!("radrig={},warn", level)
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .try_init()
        .map_err(|e| RigError::Config {
            message: format!("failed to initialize logging: {}", e),
        })?;

    Ok(())
}
