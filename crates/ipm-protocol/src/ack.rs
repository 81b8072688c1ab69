//! Acknowledgement validation: a 998 frame with return
//! code `00` is accepted; a non-zero return code fails the current stage;
//! any other frame at an ACK point is logged but tolerated.

use crate::records::{ack_return_code, frame_code_is};

/// Result of inspecting a frame received at an ACK point.
#[derive(Debug, PartialEq, Eq)]
pub enum AckOutcome {
    /// `998` with return code `00`.
    Accepted,
    /// `998` with a non-zero return code.
    Rejected { return_code: String },
    /// Not a `998` frame at all — informational frame from the peer,
    /// tolerated rather than treated as fatal.
    NotAnAck,
}

/// Validates a frame observed at an ACK point.
pub fn validate_ack(frame: &[u8]) -> AckOutcome {
    if !frame_code_is(frame, "998") {
        tracing::warn!(frame_len = frame.len(), "non-998 frame at ACK point, tolerating");
        return AckOutcome::NotAnAck;
    }

    match ack_return_code(frame) {
        Some(code) if code == "00" => AckOutcome::Accepted,
        Some(code) => AckOutcome::Rejected { return_code: code },
        None => AckOutcome::Rejected {
            return_code: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::TrailerRecord;

    #[test]
    fn accepts_998_with_zero_return_code() {
        let mut frame = Vec::new();
        TrailerRecord { count: 4 }.write_to(&mut frame);
        assert_eq!(validate_ack(&frame), AckOutcome::Accepted);
    }

    #[test]
    fn rejects_998_with_nonzero_return_code() {
        let mut frame = Vec::new();
        TrailerRecord { count: 4 }.write_to(&mut frame);
        // Overwrite the EBCDIC "00" return code with "09" (failure).
        frame[5] = ipm_wire::ebcdic::latin1_to_cp500(b'0');
        frame[6] = ipm_wire::ebcdic::latin1_to_cp500(b'9');
        assert_eq!(
            validate_ack(&frame),
            AckOutcome::Rejected {
                return_code: "09".to_string()
            }
        );
    }

    #[test]
    fn tolerates_non_998_frame() {
        let frame = ipm_wire::ebcdic::encode(b"004xxxx");
        assert_eq!(validate_ack(&frame), AckOutcome::NotAnAck);
    }
}
