//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::LogFormat;

/// Complete L402 payment challenges and inspect their macaroons.
#[derive(Debug, Parser)]
#[command(name = "l402", version, about, long_about = None)]
pub struct Cli {
    /// Log output format (logs are written to stderr)
    #[arg(
        long,
        global = true,
        value_enum,
        env = "L402_LOG_FORMAT",
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run curl; on a 402 challenge, prompt for the preimage and print the resend header
    Curl(CurlArgs),
    /// Extract the token and invoice from a saved response transcript
    Parse(ParseArgs),
    /// Build the Authorization header from a preimage and a WWW-Authenticate header
    Authorize(AuthorizeArgs),
    /// Decode a base64url macaroon and print its location, identifier and signature
    Decode(DecodeArgs),
    /// Print the hosting platform identity token as JSON
    Identity(IdentityArgs),
}

/// Arguments for `l402 curl`.
#[derive(Debug, Args)]
pub struct CurlArgs {
    /// HTTP client binary to run
    #[arg(long, env = "L402_CURL_BIN", default_value = "curl")]
    pub curl_bin: String,

    /// Preimage to use instead of prompting after payment
    #[arg(long, env = "L402_PREIMAGE")]
    pub preimage: Option<String>,

    /// Arguments passed to curl unchanged (use -i or -v so headers are printed)
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for `l402 parse`.
#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Transcript file to read, or `-` for stdin
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// Also print the Authorization header for this preimage
    #[arg(long, env = "L402_PREIMAGE")]
    pub preimage: Option<String>,
}

/// Arguments for `l402 authorize`.
#[derive(Debug, Args)]
pub struct AuthorizeArgs {
    /// Payment preimage revealed by the paid invoice
    pub preimage: String,

    /// The `www-authenticate: L402 token="...", invoice="..."` header (name optional)
    pub header: String,

    /// Print as a curl flag: -H 'Authorization: ...'
    #[arg(long)]
    pub curl_flag: bool,
}

/// Arguments for `l402 decode`.
#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// The base64url-encoded macaroon (padding optional)
    pub macaroon: String,

    /// Also list the caveats
    #[arg(long)]
    pub caveats: bool,

    /// Print the decoded envelope as JSON
    #[arg(long, conflicts_with = "caveats")]
    pub json: bool,
}

/// Arguments for `l402 identity`.
#[derive(Debug, Args)]
pub struct IdentityArgs {
    /// Environment variable holding the identity token
    #[arg(long, env = "L402_IDENTITY_VAR", default_value = "REPL_IDENTITY")]
    pub token_var: String,

    /// Token lifetime reported alongside it, in seconds
    #[arg(long, env = "L402_IDENTITY_TIMEOUT", default_value_t = 3600)]
    pub timeout_secs: u64,
}
