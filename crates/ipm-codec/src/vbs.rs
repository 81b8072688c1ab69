//! Variable-Blocked-Spanned record stream codec: each
//! record is a 4-byte big-endian length prefix (the RDW) followed by its
//! payload; the stream ends with a 4-byte zero-length marker.

use ipm_wire::ints::{read_u32_be, write_u32_be};

use crate::error::CodecError;

/// Encodes `records` as `len32BE ∥ payload` pairs, terminated by four
/// zero bytes.
pub fn encode_records(records: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records {
        out.extend_from_slice(&write_u32_be(record.len() as u32));
        out.extend_from_slice(record);
    }
    out.extend_from_slice(&[0, 0, 0, 0]);
    out
}

/// Decodes a VBS byte stream into its records.
///
/// Stops at the first zero-length prefix (the EOF marker). A length
/// prefix whose value exceeds the remaining buffer is
/// [`CodecError::InvalidFraming`], citing the offset of the length field.
/// A stream that runs out of bytes between records (fewer than 4 bytes
/// remain, no EOF marker seen) is tolerated: decoding stops and the
/// records collected so far are returned.
pub fn decode_records(vbs: &[u8]) -> Result<Vec<Vec<u8>>, CodecError> {
    let mut records = Vec::new();
    let mut cursor = 0usize;

    loop {
        if vbs.len() - cursor < 4 {
            return Ok(records);
        }

        let length = read_u32_be(&vbs[cursor..cursor + 4])?;
        if length == 0 {
            return Ok(records);
        }

        let length = length as usize;
        let body_start = cursor + 4;
        if vbs.len() - body_start < length {
            return Err(CodecError::InvalidFraming {
                offset: cursor,
                length: length as u32,
            });
        }

        records.push(vbs[body_start..body_start + length].to_vec());
        cursor = body_start + length;
    }
}
