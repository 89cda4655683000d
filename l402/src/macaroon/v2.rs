//! Version 2 binary macaroon serialization.
//!
//! After the leading version byte the buffer is a sequence of sections.
//! Every field is a varint type, a varint length and that many bytes; a
//! type of zero terminates the section.
//!
//! ```text
//! version  = 0x02
//! header   = [location] identifier EOS
//! caveats  = *( [location] identifier [vid] EOS ) EOS
//! trailer  = signature
//! ```

use super::cursor::Cursor;
use super::{Caveat, MacaroonEnvelope, MacaroonVersion, read_signature};
use crate::error::L402Error;

const FIELD_EOS: u64 = 0;
const FIELD_LOCATION: u64 = 1;
const FIELD_IDENTIFIER: u64 = 2;
const FIELD_VID: u64 = 4;
const FIELD_SIGNATURE: u64 = 6;

#[derive(Debug, Clone, Copy)]
struct Field<'a> {
    kind: u64,
    data: &'a [u8],
}

/// Reads one field, or `None` at an end-of-section marker.
fn read_field<'a>(cursor: &mut Cursor<'a>) -> Result<Option<Field<'a>>, L402Error> {
    let kind = cursor.read_uvarint()?;
    if kind == FIELD_EOS {
        return Ok(None);
    }
    let data = cursor.read_length_prefixed()?;
    Ok(Some(Field { kind, data }))
}

fn read_section<'a>(cursor: &mut Cursor<'a>) -> Result<Vec<Field<'a>>, L402Error> {
    let mut fields = Vec::new();
    while let Some(field) = read_field(cursor)? {
        fields.push(field);
    }
    Ok(fields)
}

fn skip_unknown(field: &Field<'_>) {
    #[cfg(feature = "telemetry")]
    tracing::debug!(
        kind = field.kind,
        len = field.data.len(),
        "Skipping unknown macaroon v2 field"
    );
    #[cfg(not(feature = "telemetry"))]
    let _ = field;
}

fn note_trailing(remaining: usize) {
    #[cfg(feature = "telemetry")]
    if remaining > 0 {
        tracing::debug!(
            trailing = remaining,
            "Ignoring bytes after macaroon signature"
        );
    }
    #[cfg(not(feature = "telemetry"))]
    let _ = remaining;
}

/// Decodes the body of a v2 macaroon. The version byte must already have
/// been consumed.
pub(super) fn decode(cursor: &mut Cursor<'_>) -> Result<MacaroonEnvelope, L402Error> {
    let mut location = String::new();
    let mut identifier = None;
    for field in read_section(cursor)? {
        match field.kind {
            FIELD_LOCATION => location = String::from_utf8_lossy(field.data).into_owned(),
            FIELD_IDENTIFIER => identifier = Some(field.data.to_vec()),
            _ => skip_unknown(&field),
        }
    }
    let identifier = identifier.ok_or(L402Error::MissingField("identifier"))?;

    let mut caveats = Vec::new();
    // A buffer that ends here simply has no caveat terminator and no
    // signature; that is reported as the missing signature below.
    while !cursor.is_empty() {
        let offset = cursor.position();
        let section = read_section(cursor)?;
        if section.is_empty() {
            break;
        }
        caveats.push(caveat_from_section(&section, offset)?);
    }

    while !cursor.is_empty() {
        let Some(field) = read_field(cursor)? else {
            continue;
        };
        if field.kind == FIELD_SIGNATURE {
            let signature = read_signature(field.data)?;
            note_trailing(cursor.remaining());
            return Ok(MacaroonEnvelope {
                version: MacaroonVersion::V2,
                location,
                identifier,
                caveats,
                signature,
            });
        }
        skip_unknown(&field);
    }
    Err(L402Error::MissingField("signature"))
}

fn caveat_from_section(section: &[Field<'_>], offset: usize) -> Result<Caveat, L402Error> {
    let mut location = None;
    let mut id = None;
    let mut verification_id = None;
    for field in section {
        match field.kind {
            FIELD_LOCATION => location = Some(String::from_utf8_lossy(field.data).into_owned()),
            FIELD_IDENTIFIER => id = Some(field.data.to_vec()),
            FIELD_VID => verification_id = Some(field.data.to_vec()),
            _ => skip_unknown(field),
        }
    }
    let id = id.ok_or(L402Error::InvalidPacket {
        offset,
        reason: "caveat without identifier",
    })?;
    Ok(Caveat {
        id,
        verification_id,
        location,
    })
}
