//! HTTP layer for the L402 payment protocol.
//!
//! Turns a 402 response into a [`Credential`](l402::Credential) and the
//! credential plus a payment preimage into the resend header. Both steps are
//! pure functions; the operator pays the invoice between them.
//!
//! ```rust
//! use l402_http::headers::compose_authorization_header;
//! use l402_http::response::parse_response;
//!
//! let raw = "HTTP/1.1 402 Payment Required\n\
//!            www-authenticate: L402 token=\"abc123\", invoice=\"lnbc1...\"\n\n";
//! let credential = parse_response(raw).unwrap().into_credential().unwrap();
//! // ... the invoice is paid out of band ...
//! let header = compose_authorization_header(&credential, "deadbeef");
//! assert_eq!(header, "Authorization: L402 abc123:deadbeef");
//! ```
//!
//! # Modules
//!
//! - [`constants`] - HTTP header names, scheme names, status codes
//! - [`headers`] - `WWW-Authenticate` grammar and `Authorization` composition
//! - [`response`] - Challenge detection in raw responses and header maps

pub mod constants;
pub mod headers;
pub mod response;

pub use headers::{
    Authorization, compose_authorization_header, parse_authorization, parse_www_authenticate,
};
pub use response::{ChallengeOutcome, parse_challenge_headers, parse_response};
