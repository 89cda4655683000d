//! `l402` command-line tool.
//!
//! # Usage
//!
//! ```bash
//! # Request a resource; on 402, pay the invoice and paste the preimage
//! l402 curl -- -i https://api.example.com/v1/quote
//!
//! # Compose the header directly
//! l402 authorize <preimage> 'www-authenticate: L402 token="...", invoice="..."'
//!
//! # Inspect a macaroon
//! l402 decode AgEIbG9jYXRpb24... --caveats
//! ```
//!
//! See [`l402_cli::config`] for the environment variables consulted.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use l402_cli::Cli;
use l402_cli::commands;
use l402_cli::config::{init_tracing, load_env};

fn main() -> ExitCode {
    let env_file = load_env();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.log_format, cli.verbose);
    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let mut out = io::stdout().lock();
    let mut input = io::stdin().lock();
    if let Err(e) = commands::run(&cli.command, &mut out, &mut input) {
        commands::report_error(&e, &mut io::stderr().lock());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
