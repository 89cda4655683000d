//! Command-line helper for the L402 payment flow.
//!
//! Runs `curl`, detects a `402 Payment Required` challenge, and prints the
//! token and invoice. After the operator pays the invoice out of band and
//! enters the preimage, it prints the `Authorization` header to resend the
//! request with. Standalone subcommands parse saved transcripts, compose
//! headers and decode macaroons.
//!
//! # Modules
//!
//! - [`cli`] - Argument definitions
//! - [`commands`] - Subcommand implementations
//! - [`config`] - `.env` loading and log output
//! - [`error`] - CLI error types
//! - [`identity`] - Hosting platform identity tokens

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod identity;

pub use cli::{Cli, Command};
pub use error::CliError;
