//! Error types for the L402 payment protocol.
//!
//! [`L402Error`] is the single taxonomy shared by challenge parsing,
//! authorization header handling and macaroon decoding. Every variant carries
//! enough context (the offending header text, the field name, the byte
//! offset) to be shown to an operator as-is.

use std::fmt;

/// Base error type for L402 credential operations.
#[derive(Debug, thiserror::Error)]
pub enum L402Error {
    /// The response does not carry an HTTP 402 status line.
    ///
    /// This is a normal outcome for the overall flow: the response should be
    /// passed through unchanged.
    #[error("response is not an L402 payment challenge")]
    NotAChallenge,

    /// A 402 response whose `WWW-Authenticate` header is missing or does not
    /// match the L402 grammar.
    #[error("{0}")]
    MalformedChallenge(#[from] MalformedChallengeError),

    /// An `Authorization` header that is not `L402 <token>:<preimage>`.
    #[error("malformed L402 authorization header: {0}")]
    MalformedAuthorization(String),

    /// The macaroon is not valid base64url, even after padding repair.
    #[error("invalid base64url macaroon encoding: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// A macaroon frame declares more bytes than remain in the buffer.
    #[error(
        "truncated macaroon envelope: {needed} bytes needed at offset {offset}, {remaining} remaining"
    )]
    TruncatedEnvelope {
        /// Byte offset at which the read was attempted.
        offset: usize,
        /// Number of bytes the frame declared.
        needed: usize,
        /// Number of bytes left in the buffer.
        remaining: usize,
    },

    /// A mandatory macaroon field is absent from an otherwise well-formed frame.
    #[error("macaroon is missing mandatory field `{0}`")]
    MissingField(&'static str),

    /// The first byte of the envelope selects no known serialization format.
    #[error("unsupported macaroon serialization version byte {0:#04x}")]
    UnsupportedVersion(u8),

    /// A packet header or varint that cannot be interpreted.
    #[error("invalid macaroon packet at offset {offset}: {reason}")]
    InvalidPacket {
        /// Byte offset of the offending packet.
        offset: usize,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// The signature packet does not hold a 32-byte HMAC tag.
    #[error("macaroon signature must be 32 bytes, found {0}")]
    InvalidSignatureLength(usize),
}

impl L402Error {
    /// Returns `true` for [`L402Error::NotAChallenge`], the only variant that
    /// callers usually treat as a pass-through rather than a failure.
    #[must_use]
    pub const fn is_not_a_challenge(&self) -> bool {
        matches!(self, Self::NotAChallenge)
    }
}

/// A 402 challenge whose `WWW-Authenticate` header could not be understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedChallengeError {
    /// The offending header text, or `None` when no header was found.
    pub header: Option<String>,
    /// Which part of the grammar failed to match.
    pub reason: MalformedReason,
}

impl MalformedChallengeError {
    /// Creates a new malformed-challenge error without header context.
    #[must_use]
    pub const fn new(reason: MalformedReason) -> Self {
        Self {
            header: None,
            reason,
        }
    }

    /// Attaches the offending header text.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }
}

impl fmt::Display for MalformedChallengeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.header {
            Some(header) => write!(f, "malformed L402 challenge: {} in `{header}`", self.reason),
            None => write!(f, "malformed L402 challenge: {}", self.reason),
        }
    }
}

impl std::error::Error for MalformedChallengeError {}

/// The part of an L402 challenge that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReason {
    /// The 402 response has no `WWW-Authenticate` header line.
    #[error("no www-authenticate header")]
    MissingHeader,

    /// The header uses an authentication scheme other than L402.
    #[error("expected scheme L402, found `{0}`")]
    WrongScheme(String),

    /// A required auth-param is absent.
    #[error("missing `{0}` parameter")]
    MissingParameter(&'static str),

    /// A required auth-param is present but empty.
    #[error("empty `{0}` parameter")]
    EmptyParameter(&'static str),

    /// A quoted-string value is never closed.
    #[error("unterminated quoted value for `{0}`")]
    UnterminatedQuote(String),

    /// Text that is not a `name="value"` auth-param.
    #[error("invalid parameter `{0}`")]
    InvalidParameter(String),
}
