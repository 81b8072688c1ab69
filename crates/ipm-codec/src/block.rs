//! 1014-byte physical blocking layer: 1012 payload bytes
//! followed by 2 trailing 0x40 (Cp500 space) bytes per block.

use ipm_wire::ebcdic::PAD_BYTE;

/// Payload bytes carried by one physical block.
pub const BLOCK_PAYLOAD_LEN: usize = 1012;
/// Total size of one physical block, payload plus the 2-byte 0x40 trailer.
pub const BLOCK_LEN: usize = 1014;

/// Segments `vbs_bytes` into `BLOCK_PAYLOAD_LEN`-byte chunks, pads the
/// final chunk to `BLOCK_PAYLOAD_LEN` with [`PAD_BYTE`], and appends the
/// 2-byte [`PAD_BYTE`] trailer to every block. Always returns a multiple
/// of [`BLOCK_LEN`] bytes.
pub fn apply_blocking(vbs_bytes: &[u8]) -> Vec<u8> {
    if vbs_bytes.is_empty() {
        return Vec::new();
    }

    let block_count = vbs_bytes.len().div_ceil(BLOCK_PAYLOAD_LEN);
    let mut out = Vec::with_capacity(block_count * BLOCK_LEN);

    for chunk in vbs_bytes.chunks(BLOCK_PAYLOAD_LEN) {
        out.extend_from_slice(chunk);
        if chunk.len() < BLOCK_PAYLOAD_LEN {
            out.resize(out.len() + (BLOCK_PAYLOAD_LEN - chunk.len()), PAD_BYTE);
        }
        out.push(PAD_BYTE);
        out.push(PAD_BYTE);
    }

    out
}

/// Strips physical blocking, emitting the 1012-byte payload of every full
/// block. If `raw` is not a multiple of [`BLOCK_LEN`] (permitted only when
/// the caller overrides a negative [`detect_blocked`] result), the final
/// partial block yields `min(remaining, BLOCK_PAYLOAD_LEN)` bytes.
pub fn remove_blocking(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut chunks = raw.chunks(BLOCK_LEN);

    for chunk in &mut chunks {
        if chunk.len() == BLOCK_LEN {
            out.extend_from_slice(&chunk[..BLOCK_PAYLOAD_LEN]);
        } else {
            let take = chunk.len().min(BLOCK_PAYLOAD_LEN);
            out.extend_from_slice(&chunk[..take]);
        }
    }

    out
}

/// Heuristically decides whether `raw` carries 1014-byte physical
/// blocking, using a five-step heuristic rather than a stored flag.
pub fn detect_blocked(raw: &[u8]) -> bool {
    if raw.is_empty() {
        return false;
    }
    if raw.len() % BLOCK_LEN != 0 {
        return false;
    }

    let blocks: Vec<&[u8]> = raw.chunks(BLOCK_LEN).collect();
    let hits = blocks.iter().filter(|b| ends_in_pad(b)).count();

    if blocks.len() > 1 {
        return (hits as f64 / blocks.len() as f64) >= 0.60;
    }

    if blocks.len() == 1 {
        return ends_in_pad(blocks[0]);
    }

    // blocks.len() == 0 cannot happen here (raw is non-empty and a
    // multiple of BLOCK_LEN), but the zero-block fallback from the spec's
    // heuristic is kept verbatim rather than assumed away.
    if let Some(eof_pos) = find_vbs_eof(raw) {
        let tail = &raw[eof_pos..];
        if tail.is_empty() {
            return false;
        }
        let pad_count = tail.iter().filter(|&&b| b == PAD_BYTE).count();
        return (pad_count as f64 / tail.len() as f64) >= 0.80;
    }

    false
}

fn ends_in_pad(block: &[u8]) -> bool {
    block.len() >= 2 && block[block.len() - 2] == PAD_BYTE && block[block.len() - 1] == PAD_BYTE
}

/// Finds the first run of four consecutive zero bytes (a VBS EOF marker),
/// returning the offset just past it.
fn find_vbs_eof(raw: &[u8]) -> Option<usize> {
    raw.windows(4)
        .position(|w| w == [0, 0, 0, 0])
        .map(|pos| pos + 4)
}
