//! Error types for the `l402` command-line tool.

use l402::L402Error;

/// Errors that end an `l402` subcommand with exit status 1.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Challenge extraction, header parsing or macaroon decoding failed.
    #[error(transparent)]
    L402(#[from] L402Error),

    /// The command was invoked with input of the wrong shape.
    #[error("usage error: {0}")]
    Usage(String),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP client could not be started.
    #[error("failed to run `{program}`: {source}")]
    Curl {
        /// Program that was spawned.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The identity token provider has no token to hand out.
    #[error("identity token unavailable: {0}")]
    Identity(String),
}

impl CliError {
    /// Creates a usage error.
    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}
