//! Byte-exact protocol record layouts. All alphanumeric
//! fields are EBCDIC Cp500; binary counts are big-endian unsigned.

use ipm_wire::ebcdic::{self, DIRECTION_RECEIVE, DIRECTION_SEND};
use ipm_wire::ints::{read_u32_be, write_u32_be};

use crate::error::ProtocolError;
use crate::txid::TransmissionId;

const RECORD_TYPE: &[u8; 2] = b"01";

fn ebcdic_str(s: &str) -> Vec<u8> {
    ebcdic::encode(s.as_bytes())
}

fn expect_code(frame: &[u8], code: &'static str, record: &'static str) -> Result<(), ProtocolError> {
    if frame.len() < 3 {
        return Err(ProtocolError::MalformedRecord {
            record,
            offset: 0,
            reason: "frame shorter than the 3-byte record code",
        });
    }
    let decoded = ebcdic::decode(&frame[0..3]);
    if decoded != code.as_bytes() {
        return Err(ProtocolError::MalformedRecord {
            record,
            offset: 0,
            reason: "record code mismatch",
        });
    }
    Ok(())
}

/// The 004 header record (60 bytes): announces a transmission, sent by
/// the side in the `R` (send) role or observed by the side in the `T`
/// (receive) role.
pub struct HeaderRecord {
    pub txid: TransmissionId,
}

impl HeaderRecord {
    pub const LEN: usize = 60;

    /// Serializes the 60-byte layout: `"004"(3) "01"(2) TxID(14)
    /// filler[17]=0x00 reserved[4]=0x00 reserved[4]=0x00 filler[16]=0x00`.
    /// Reserved fields are always emitted as zero; no MIP variant is known
    /// to populate them, and none is required to on receipt.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&ebcdic_str("004"));
        out.extend_from_slice(RECORD_TYPE);
        out.extend_from_slice(&ebcdic_str(&self.txid.render()));
        out.resize(out.len() + 17 + 4 + 4 + 16, 0x00);
    }

    /// Extracts the Transmission ID and expected block count from a raw
    /// 004 frame observed on the receive side:
    /// `rxTxID` = bytes 5..19, `expectedBlocks` = bytes 36..40 big-endian.
    pub fn extract_receive_fields(frame: &[u8]) -> Result<(String, u32), ProtocolError> {
        expect_code(frame, "004", "004")?;
        if frame.len() < 40 {
            return Err(ProtocolError::MalformedRecord {
                record: "004",
                offset: frame.len(),
                reason: "frame too short to carry TxID and expected-block fields",
            });
        }
        let rx_txid = String::from_utf8_lossy(&ebcdic::decode(&frame[5..19])).into_owned();
        let expected_blocks = read_u32_be(&frame[36..40])?;
        Ok((rx_txid, expected_blocks))
    }
}

/// The 101 request record (19 bytes): asks the MIP to begin sending the
/// named transmission.
pub struct RequestRecord {
    pub txid: TransmissionId,
}

impl RequestRecord {
    pub const LEN: usize = 19;

    /// Serializes `"101"(3) "01"(2) TxID(14)`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&ebcdic_str("101"));
        out.extend_from_slice(RECORD_TYPE);
        out.extend_from_slice(&ebcdic_str(&self.txid.render()));
    }
}

/// The 998 trailer record (11 bytes) this side writes to close a send
/// dialogue: `"998"(3) "01"(2) "00"(2) count(4 BE)`.
pub struct TrailerRecord {
    pub count: u32,
}

impl TrailerRecord {
    pub const LEN: usize = 11;

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&ebcdic_str("998"));
        out.extend_from_slice(RECORD_TYPE);
        out.extend_from_slice(&ebcdic_str("00"));
        out.extend_from_slice(&write_u32_be(self.count));
    }
}

/// The 999 purge record (21 bytes): authorises deletion of the
/// transmitted file at the MIP. `"999"(3) "01"(2) "00"(2) TxID(14)`.
pub struct PurgeRecord {
    pub rx_txid: String,
}

impl PurgeRecord {
    pub const LEN: usize = 21;

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&ebcdic_str("999"));
        out.extend_from_slice(RECORD_TYPE);
        out.extend_from_slice(&ebcdic_str("00"));
        let mut txid_bytes = ebcdic_str(&self.rx_txid);
        txid_bytes.resize(14, ebcdic::latin1_to_cp500(b' '));
        out.extend_from_slice(&txid_bytes);
    }
}

/// Wraps a send-side data chunk with the `R` (0xD9) direction indicator
/// before it is written to the wire.
pub fn wrap_send_data_frame(chunk: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(chunk.len() + 1);
    out.push(DIRECTION_SEND);
    out.extend_from_slice(chunk);
    out
}

/// Is `frame`'s 3-byte record code (EBCDIC-decoded) equal to `code`?
pub fn frame_code_is(frame: &[u8], code: &str) -> bool {
    frame.len() >= 3 && ebcdic::decode(&frame[0..3]) == code.as_bytes()
}

/// Decodes a receive-ack frame's return code (bytes 5..7, EBCDIC),
/// returning `None` if the frame is too short.
pub fn ack_return_code(frame: &[u8]) -> Option<String> {
    if frame.len() < 7 {
        return None;
    }
    Some(String::from_utf8_lossy(&ebcdic::decode(&frame[5..7])).into_owned())
}

/// The EBCDIC byte a receive-side data frame's direction indicator should
/// carry (`T`, 0xE3).
pub const EXPECTED_RECEIVE_DIRECTION: u8 = DIRECTION_RECEIVE;
