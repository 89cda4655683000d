#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the L402 payment protocol.
//!
//! L402 gates HTTP APIs behind Lightning payments. A server answers an
//! unauthenticated request with `402 Payment Required` and a
//! `WWW-Authenticate: L402 token="...", invoice="..."` challenge. Once the
//! invoice is paid, the client resends with
//! `Authorization: L402 <token>:<preimage>`.
//!
//! This crate holds the transport-independent pieces of that flow. HTTP
//! header parsing and composition live in `l402-http`.
//!
//! # Modules
//!
//! - [`credential`] - The [`Credential`] issued by a challenge
//! - [`encoding`] - Base64url decoding with padding repair
//! - [`error`] - The shared [`L402Error`] taxonomy
//! - [`macaroon`] - Read-only decoding of the macaroon token
//!
//! # Feature Flags
//!
//! - `serde` - `Serialize` for decoded macaroon envelopes
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod credential;
pub mod encoding;
pub mod error;
pub mod macaroon;

pub use credential::Credential;
pub use error::{L402Error, MalformedChallengeError, MalformedReason};
pub use macaroon::{Caveat, CaveatKind, MacaroonEnvelope, MacaroonVersion};
