//! Runtime configuration: `.env` loading and log output.
//!
//! Command-line options fall back to environment variables (see
//! [`crate::cli`]); a `.env` file in the working directory is loaded first so
//! it can supply them.
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Log level filter (default: `warn`, raised by `-v`)
//! - `L402_LOG_FORMAT` - `pretty`, `compact` or `json`
//! - `L402_CURL_BIN` - HTTP client used by `l402 curl` (default: `curl`)
//! - `L402_PREIMAGE` - Preimage to use instead of prompting
//! - `L402_IDENTITY_VAR` / `L402_IDENTITY_TIMEOUT` - Identity token source

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Multi-line human-readable output.
    #[default]
    Pretty,
    /// Single-line human-readable output.
    Compact,
    /// One JSON object per line.
    Json,
}

/// Loads a `.env` file from the current directory or its parents, if any.
///
/// Returns the path that was loaded. Values already present in the process
/// environment are not overridden.
#[must_use]
pub fn load_env() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Returns the default filter directive for a `-v` count.
#[must_use]
pub const fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initializes the global tracing subscriber.
///
/// Logs always go to stderr so that stdout carries only command output.
/// `RUST_LOG` takes precedence over the `-v` count.
pub fn init_tracing(format: LogFormat, verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}
