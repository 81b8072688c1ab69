//! Receive-side payload extractor: tolerant of
//! peers that prefix data frames with a stray RDW length and/or a single
//! 0xFF padding byte ahead of the direction indicator. Kept exactly as
//! specified — this is compatibility scar tissue load-bearing for
//! interoperability, not a design choice to simplify away.

use ipm_wire::ints::read_u32_be;

use crate::records::EXPECTED_RECEIVE_DIRECTION;

/// Result of extracting a receive-side data frame's payload.
pub struct ExtractedPayload<'a> {
    /// Offset of the direction indicator byte within `frame`.
    pub direction_offset: usize,
    /// Whether the direction indicator matched the expected `T` (0xE3).
    pub direction_ok: bool,
    /// Payload bytes after the direction indicator, to be written to the
    /// destination file.
    pub body: &'a [u8],
}

/// Extracts the payload from a receive-side data frame.
///
/// 1. Treats the first 4 bytes as a candidate RDW length `r1`. If
///    `0 < r1 < frame.len() - 4`, those 4 bytes are a length prefix and
///    the working offset starts at 4; otherwise it starts at 0.
/// 2. If the byte at the working offset is `0xFF` and the next byte is
///    `0xE3`, the working offset advances by 1 (skips stray padding).
/// 3. The byte at the final offset is the direction indicator.
pub fn extract_payload(frame: &[u8]) -> ExtractedPayload<'_> {
    let mut offset = 0usize;

    if frame.len() >= 4 {
        if let Ok(r1) = read_u32_be(&frame[0..4]) {
            let r1 = r1 as usize;
            if r1 > 0 && r1 < frame.len().saturating_sub(4) {
                offset = 4;
            }
        }
    }

    if frame.len() > offset + 1 && frame[offset] == 0xFF && frame[offset + 1] == EXPECTED_RECEIVE_DIRECTION {
        offset += 1;
    }

    let direction_ok = frame.get(offset).copied() == Some(EXPECTED_RECEIVE_DIRECTION);
    let body = if frame.len() > offset + 1 {
        &frame[offset + 1..]
    } else {
        &[]
    };

    ExtractedPayload {
        direction_offset: offset,
        direction_ok,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_frame_no_rdw() {
        let mut frame = vec![EXPECTED_RECEIVE_DIRECTION];
        frame.extend_from_slice(&[0xAAu8; 1013]);
        let extracted = extract_payload(&frame);
        assert_eq!(extracted.direction_offset, 0);
        assert!(extracted.direction_ok);
        assert_eq!(extracted.body.len(), 1013);
    }

    #[test]
    fn stray_rdw_is_detected() {
        // A stray RDW: 1018-byte frame, RDW 0x000003F0 (1008 as length),
        // fifth byte 0xE3.
        let mut frame = vec![0x00, 0x00, 0x03, 0xF0, EXPECTED_RECEIVE_DIRECTION];
        frame.extend_from_slice(&[0xBBu8; 1013]);
        assert_eq!(frame.len(), 1018);

        let extracted = extract_payload(&frame);
        assert_eq!(extracted.direction_offset, 4);
        assert!(extracted.direction_ok);
        assert_eq!(extracted.body.len(), 1013);
    }

    #[test]
    fn stray_ff_padding_before_direction_is_skipped() {
        let mut frame = vec![0xFF, EXPECTED_RECEIVE_DIRECTION];
        frame.extend_from_slice(&[0xCCu8; 10]);
        let extracted = extract_payload(&frame);
        assert_eq!(extracted.direction_offset, 1);
        assert!(extracted.direction_ok);
        assert_eq!(extracted.body.len(), 10);
    }

    #[test]
    fn direction_mismatch_is_reported_not_fatal() {
        let frame = vec![0x00u8, 1, 2, 3, 4];
        let extracted = extract_payload(&frame);
        assert!(!extracted.direction_ok);
    }
}
