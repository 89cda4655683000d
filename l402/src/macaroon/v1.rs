//! Version 1 packet macaroon serialization.
//!
//! Each packet is a four hex digit length (counting the header itself)
//! followed by `key SP value LF`.

use super::cursor::Cursor;
use super::{Caveat, MacaroonEnvelope, MacaroonVersion, read_signature};
use crate::error::L402Error;

const PACKET_HEADER_LEN: usize = 4;

/// Shortest packet body: a one-byte key, the separator and the newline.
const MIN_PACKET_BODY_LEN: usize = 3;

fn read_packet<'a>(cursor: &mut Cursor<'a>) -> Result<(&'a [u8], &'a [u8]), L402Error> {
    let offset = cursor.position();
    let header = cursor.read_bytes(PACKET_HEADER_LEN)?;
    let total = std::str::from_utf8(header)
        .ok()
        .filter(|digits| digits.bytes().all(|byte| byte.is_ascii_hexdigit()))
        .and_then(|digits| usize::from_str_radix(digits, 16).ok())
        .ok_or(L402Error::InvalidPacket {
            offset,
            reason: "packet length is not four hex digits",
        })?;
    if total < PACKET_HEADER_LEN + MIN_PACKET_BODY_LEN {
        return Err(L402Error::InvalidPacket {
            offset,
            reason: "packet shorter than its header",
        });
    }

    let body = cursor.read_bytes(total - PACKET_HEADER_LEN)?;
    let Some((&b'\n', body)) = body.split_last() else {
        return Err(L402Error::InvalidPacket {
            offset,
            reason: "packet missing trailing newline",
        });
    };
    let separator = body
        .iter()
        .position(|byte| *byte == b' ')
        .ok_or(L402Error::InvalidPacket {
            offset,
            reason: "packet missing key separator",
        })?;
    let (key, value) = body.split_at(separator);
    Ok((key, &value[1..]))
}

/// Decodes a v1 macaroon. Unlike v2 there is no version byte; the buffer
/// starts with the first packet header.
pub(super) fn decode(cursor: &mut Cursor<'_>) -> Result<MacaroonEnvelope, L402Error> {
    let mut location = String::new();
    let mut identifier = None;
    let mut caveats: Vec<Caveat> = Vec::new();

    while !cursor.is_empty() {
        let offset = cursor.position();
        let (key, value) = read_packet(cursor)?;
        match key {
            b"location" => location = String::from_utf8_lossy(value).into_owned(),
            b"identifier" => identifier = Some(value.to_vec()),
            b"cid" => caveats.push(Caveat {
                id: value.to_vec(),
                verification_id: None,
                location: None,
            }),
            b"vid" | b"cl" => {
                let caveat = caveats.last_mut().ok_or(L402Error::InvalidPacket {
                    offset,
                    reason: "caveat field before any cid",
                })?;
                if key == b"vid" {
                    caveat.verification_id = Some(value.to_vec());
                } else {
                    caveat.location = Some(String::from_utf8_lossy(value).into_owned());
                }
            }
            b"signature" => {
                return Ok(MacaroonEnvelope {
                    version: MacaroonVersion::V1,
                    location,
                    identifier: identifier.ok_or(L402Error::MissingField("identifier"))?,
                    caveats,
                    signature: read_signature(value)?,
                });
            }
            unknown => skip_unknown(unknown),
        }
    }

    if identifier.is_none() {
        return Err(L402Error::MissingField("identifier"));
    }
    Err(L402Error::MissingField("signature"))
}

fn skip_unknown(key: &[u8]) {
    #[cfg(feature = "telemetry")]
    tracing::debug!(
        key = %String::from_utf8_lossy(key),
        "Skipping unknown macaroon v1 packet"
    );
    #[cfg(not(feature = "telemetry"))]
    let _ = key;
}
