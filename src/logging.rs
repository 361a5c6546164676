//! Logging configuration.
//!
//! Logs go to stderr so stdout stays reserved for tool output that other
//! processes parse.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Builds the env filter, preferring `RUST_LOG` over the given default.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initializes logging to stderr.
///
/// `verbose` raises the default level to `debug`; `RUST_LOG` still wins.
pub fn init_stderr_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { DEFAULT_LOG_LEVEL };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .init();
}
