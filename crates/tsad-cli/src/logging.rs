// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::CliError;
use tracing_subscriber::EnvFilter;

/// Filter directive used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Chooses the log filter: `verbose` forces `debug`, otherwise `RUST_LOG` or `info`.
pub fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Installs the global fmt subscriber writing to stderr; stdout stays JSON only.
pub fn init_logging(verbose: bool) -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| CliError::Logging(err.to_string()))
}
