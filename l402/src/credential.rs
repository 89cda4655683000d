//! The L402 credential issued by a 402 challenge.

use std::fmt;

use crate::error::{L402Error, MalformedChallengeError, MalformedReason};
use crate::macaroon::MacaroonEnvelope;

/// One L402 challenge instance: the server-issued token and the invoice that
/// must be paid before the token can be used.
///
/// Both fields are non-empty and the value cannot be changed after
/// construction. It is created by the challenge parser and consumed, together
/// with the operator's preimage, when composing the `Authorization` header.
///
/// # Example
///
/// ```rust
/// use l402::Credential;
///
/// let credential = Credential::new("abc123", "lnbc1...").unwrap();
/// assert_eq!(credential.token(), "abc123");
/// assert_eq!(
///     credential.to_string(),
///     r#"L402 token="abc123", invoice="lnbc1...""#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Credential {
    token: String,
    invoice: String,
}

impl Credential {
    /// Creates a credential from a token and a BOLT11 invoice.
    ///
    /// # Errors
    ///
    /// Returns [`L402Error::MalformedChallenge`] with
    /// [`MalformedReason::EmptyParameter`] if either value is empty.
    pub fn new(token: impl Into<String>, invoice: impl Into<String>) -> Result<Self, L402Error> {
        let token = token.into();
        let invoice = invoice.into();
        if token.is_empty() {
            return Err(MalformedChallengeError::new(MalformedReason::EmptyParameter("token")).into());
        }
        if invoice.is_empty() {
            return Err(
                MalformedChallengeError::new(MalformedReason::EmptyParameter("invoice")).into(),
            );
        }
        Ok(Self { token, invoice })
    }

    /// Returns the opaque macaroon token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the BOLT11 invoice.
    #[must_use]
    pub fn invoice(&self) -> &str {
        &self.invoice
    }

    /// Consumes the credential and returns its (token, invoice) components.
    #[must_use]
    pub fn into_parts(self) -> (String, String) {
        (self.token, self.invoice)
    }

    /// Decodes the token as a macaroon for inspection.
    ///
    /// # Errors
    ///
    /// Returns any error produced by [`MacaroonEnvelope::decode`].
    pub fn decode_token(&self) -> Result<MacaroonEnvelope, L402Error> {
        MacaroonEnvelope::decode(&self.token)
    }
}

/// Renders the credential in `WWW-Authenticate` challenge form.
impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "L402 token=\"{}\", invoice=\"{}\"",
            self.token, self.invoice
        )
    }
}
