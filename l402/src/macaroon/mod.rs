//! Macaroon envelope decoding.
//!
//! The L402 token is a serialized macaroon. This module decodes it into a
//! [`MacaroonEnvelope`] for inspection: location, identifier, caveats and
//! signature. Decoding is read-only. Caveats are never evaluated and the
//! signature chain is never recomputed.
//!
//! Both libmacaroons binary formats are understood:
//!
//! - [`MacaroonVersion::V2`] - leading `0x02` byte, varint framed fields
//! - [`MacaroonVersion::V1`] - four hex digit packet headers
//!
//! # Example
//!
//! ```rust
//! use l402::macaroon::MacaroonEnvelope;
//!
//! let token = "AgEIbG9jYXRpb24CAmlkAAJPcGF5bWVudF9oYXNoID0gM2IyMWQ2ZjlhMTMyYWZlODBhNDc4Njg0YTcxZmExY2Y3YmM3YWRhMTY2M2E2MGU4MzU5NjMxYjliZmM0ODA0OAAABiCqeicfNuvHbQlk9nvaf8bPfGICDqJHkv0lvEG40kPlnQ";
//! let envelope = MacaroonEnvelope::decode(token).unwrap();
//! assert_eq!(envelope.location, "location");
//! assert_eq!(envelope.identifier_text(), "id");
//! assert_eq!(envelope.caveats.len(), 1);
//! ```

mod cursor;
mod v1;
mod v2;

use std::fmt;

use cursor::Cursor;

use crate::encoding::decode_base64url;
use crate::error::L402Error;

/// Length of the HMAC-SHA256 signature that terminates every macaroon.
pub const SIGNATURE_LEN: usize = 32;

/// Leading byte of a v2 binary macaroon.
const V2_VERSION_BYTE: u8 = 2;

/// Serialization format a macaroon was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacaroonVersion {
    /// Hex length-prefixed `key value` packets.
    V1,
    /// Varint framed binary fields.
    V2,
}

impl fmt::Display for MacaroonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}

/// Whether a caveat is checked locally or discharged by another service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaveatKind {
    /// A predicate checked by the target service.
    FirstParty,
    /// A caveat that needs a discharge macaroon from `location`.
    ThirdParty,
}

impl fmt::Display for CaveatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstParty => f.write_str("first-party"),
            Self::ThirdParty => f.write_str("third-party"),
        }
    }
}

/// A restriction attached to a macaroon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caveat {
    /// Caveat identifier (`cid`). For first-party caveats this is the predicate.
    pub id: Vec<u8>,
    /// Verification id (`vid`), present only on third-party caveats.
    pub verification_id: Option<Vec<u8>>,
    /// Discharge location hint (`cl`).
    pub location: Option<String>,
}

impl Caveat {
    /// Returns the caveat kind, derived from the presence of a verification id.
    #[must_use]
    pub const fn kind(&self) -> CaveatKind {
        if self.verification_id.is_some() {
            CaveatKind::ThirdParty
        } else {
            CaveatKind::FirstParty
        }
    }

    /// Returns the caveat identifier as text, e.g. `payment_hash = 3b21...`.
    #[must_use]
    pub fn predicate(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }
}

/// The decoded fields of a serialized macaroon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacaroonEnvelope {
    /// Format the envelope was decoded from.
    pub version: MacaroonVersion,
    /// Advisory location hint; empty when the packet is absent.
    pub location: String,
    /// Opaque identifier payload.
    pub identifier: Vec<u8>,
    /// Caveats in serialization order.
    pub caveats: Vec<Caveat>,
    /// Final HMAC chain output.
    pub signature: [u8; SIGNATURE_LEN],
}

impl MacaroonEnvelope {
    /// Decodes a base64url macaroon token, repairing missing padding first.
    ///
    /// # Errors
    ///
    /// - [`L402Error::InvalidEncoding`] if the token is not base64url
    /// - [`L402Error::TruncatedEnvelope`] if a frame runs past the buffer
    /// - [`L402Error::MissingField`] if the identifier or signature is absent
    /// - [`L402Error::UnsupportedVersion`], [`L402Error::InvalidPacket`] or
    ///   [`L402Error::InvalidSignatureLength`] for other framing faults
    #[cfg_attr(
        feature = "telemetry",
        tracing::instrument(name = "l402.macaroon.decode", skip_all, err)
    )]
    pub fn decode(token: &str) -> Result<Self, L402Error> {
        let bytes = decode_base64url(token)?;
        Self::from_binary(&bytes)
    }

    /// Decodes a macaroon from its raw binary serialization.
    ///
    /// # Errors
    ///
    /// Same as [`MacaroonEnvelope::decode`], minus the encoding error.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, L402Error> {
        let mut cursor = Cursor::new(bytes);
        let envelope = match cursor.peek() {
            None => {
                return Err(L402Error::TruncatedEnvelope {
                    offset: 0,
                    needed: 1,
                    remaining: 0,
                });
            }
            Some(V2_VERSION_BYTE) => {
                cursor.read_u8()?;
                v2::decode(&mut cursor)?
            }
            Some(byte) if byte.is_ascii_hexdigit() => v1::decode(&mut cursor)?,
            Some(byte) => return Err(L402Error::UnsupportedVersion(byte)),
        };

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            version = %envelope.version,
            location = %envelope.location,
            caveats = envelope.caveats.len(),
            "Decoded macaroon envelope"
        );

        Ok(envelope)
    }

    /// Returns the identifier as text, replacing invalid UTF-8.
    #[must_use]
    pub fn identifier_text(&self) -> String {
        String::from_utf8_lossy(&self.identifier).into_owned()
    }

    /// Returns the signature as lowercase hex.
    #[must_use]
    pub fn signature_hex(&self) -> String {
        hex::encode(self.signature)
    }
}

/// Renders the three inspection lines: location, identifier and signature.
impl fmt::Display for MacaroonEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Location: {}", self.location)?;
        writeln!(f, "Identifier: {}", self.identifier_text())?;
        write!(f, "Signature: {}", self.signature_hex())
    }
}

pub(crate) fn read_signature(data: &[u8]) -> Result<[u8; SIGNATURE_LEN], L402Error> {
    <[u8; SIGNATURE_LEN]>::try_from(data)
        .map_err(|_| L402Error::InvalidSignatureLength(data.len()))
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::ser::{Serialize, SerializeStruct, Serializer};

    use super::{Caveat, MacaroonEnvelope};

    impl Serialize for Caveat {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_struct("Caveat", 4)?;
            state.serialize_field("kind", &self.kind().to_string())?;
            state.serialize_field("predicate", &self.predicate())?;
            state.serialize_field(
                "verificationId",
                &self.verification_id.as_ref().map(hex::encode),
            )?;
            state.serialize_field("location", &self.location)?;
            state.end()
        }
    }

    impl Serialize for MacaroonEnvelope {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_struct("MacaroonEnvelope", 6)?;
            state.serialize_field("version", &self.version.to_string())?;
            state.serialize_field("location", &self.location)?;
            state.serialize_field("identifier", &self.identifier_text())?;
            state.serialize_field("identifierHex", &hex::encode(&self.identifier))?;
            state.serialize_field("caveats", &self.caveats)?;
            state.serialize_field("signature", &self.signature_hex())?;
            state.end()
        }
    }
}
