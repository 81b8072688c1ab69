//! Composes the block and VBS/RDW layers into line-oriented text↔IPM
//! file conversion.

use std::fs;
use std::io::Write;
use std::path::Path;

use ipm_wire::ascii::sanitize_line;
use ipm_wire::ebcdic;

use crate::block::{apply_blocking, detect_blocked, remove_blocking};
use crate::error::CodecError;
use crate::vbs::{decode_records, encode_records};

/// Decodes an IPM container file at `input_path` into a text file at
/// `output_path`, one line per record in record order, each followed by a
/// single LF.
pub fn decode_ipm_to_text(input_path: &Path, output_path: &Path) -> Result<usize, CodecError> {
    let raw = fs::read(input_path)?;

    let blocked = detect_blocked(&raw);
    tracing::debug!(bytes = raw.len(), blocked, "loaded IPM container");
    let vbs = if blocked { remove_blocking(&raw) } else { raw };

    let records = decode_records(&vbs)?;

    let mut out = fs::File::create(output_path)?;
    for record in &records {
        let latin1 = ebcdic::decode(record);
        let line = sanitize_line(&latin1);
        out.write_all(&line)?;
        out.write_all(b"\n")?;
    }

    Ok(records.len())
}

/// Encodes a text file at `input_path` into an IPM container file at
/// `output_path`. Empty lines (zero length after
/// the line terminator is stripped) are skipped; inner spaces are kept
/// verbatim and no line terminator is appended to the encoded record.
pub fn encode_text_to_ipm(input_path: &Path, output_path: &Path) -> Result<usize, CodecError> {
    let text = fs::read_to_string(input_path)?;

    let records: Vec<Vec<u8>> = text
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| ebcdic::encode(line.as_bytes()))
        .collect();

    let count = records.len();
    let vbs = encode_records(&records);
    let blocked = apply_blocking(&vbs);

    fs::write(output_path, blocked)?;
    Ok(count)
}
