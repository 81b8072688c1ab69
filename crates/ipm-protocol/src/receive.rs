//! The receive dialogue: request a file from the MIP, trying successive
//! sequence numbers until one answers with a header.

use std::io::Write;

use ipm_wire::frame::FrameTransport;
use ipm_wire::ints::read_u32_be;

use crate::ack::{validate_ack, AckOutcome};
use crate::error::ProtocolError;
use crate::extract::extract_payload;
use crate::records::{ack_return_code, frame_code_is, HeaderRecord, PurgeRecord, RequestRecord};
use crate::txid::TransmissionId;

/// Outcome of a successful receive dialogue.
#[derive(Debug, PartialEq, Eq)]
pub struct ReceiveReport {
    pub sequence_used: u8,
    pub blocks_received: u32,
}

enum SequenceOutcome {
    Found(ReceiveReport),
    Skip(String),
}

/// Requests `base_txid` from the MIP, trying sequence numbers
/// `start_sequence..=99` in turn. Each attempt opens a fresh connection
/// via `connect` (one socket per dialogue attempt), writes a 101 request,
/// and inspects the response:
///
/// - a `998` with a non-zero return code, or any record other than `004`,
///   skips to the next sequence number;
/// - a `004` header proceeds to read data frames (via
///   [`extract_payload`]) until a `998` trailer closes the transfer, then
///   purges the file with a `999` and validates the closing ACK.
///
/// A transport-level failure (timeout, reset, I/O error) aborts the scan
/// immediately rather than advancing to the next sequence number. If the
/// scan exhausts `99` without success, returns
/// [`ProtocolError::NotFound`] naming the Transmission ID prefix and the
/// last non-fatal reason observed.
pub fn receive_file(
    connect: impl Fn() -> Result<FrameTransport, ProtocolError>,
    base_txid: &TransmissionId,
    start_sequence: u8,
    dest: &mut impl Write,
) -> Result<ReceiveReport, ProtocolError> {
    let mut last_error = String::from("sequence scan exhausted before any attempt completed");

    for sequence in start_sequence..=99 {
        let txid = base_txid.with_sequence(sequence);
        match try_sequence(&connect, &txid, dest)? {
            SequenceOutcome::Found(report) => return Ok(report),
            SequenceOutcome::Skip(reason) => {
                last_error = reason;
            }
        }
    }

    Err(ProtocolError::NotFound {
        prefix: base_txid.prefix(),
        last_error,
    })
}

fn try_sequence(
    connect: &impl Fn() -> Result<FrameTransport, ProtocolError>,
    txid: &TransmissionId,
    dest: &mut impl Write,
) -> Result<SequenceOutcome, ProtocolError> {
    let mut transport = connect()?;

    let mut request = Vec::new();
    RequestRecord {
        txid: txid.clone(),
    }
    .write_to(&mut request);
    transport.write_framed(&request)?;

    let response = transport.read_framed()?;

    if frame_code_is(&response, "998") {
        let code = ack_return_code(&response).unwrap_or_default();
        tracing::debug!(sequence = txid.sequence, code = %code, "header request rejected");
        return Ok(SequenceOutcome::Skip(format!(
            "sequence {}: 998 return code {code}",
            txid.sequence
        )));
    }

    if !frame_code_is(&response, "004") {
        tracing::debug!(sequence = txid.sequence, "unexpected record at header slot");
        return Ok(SequenceOutcome::Skip(format!(
            "sequence {}: unexpected record code at header slot",
            txid.sequence
        )));
    }

    let (rx_txid, _expected_blocks) = HeaderRecord::extract_receive_fields(&response)?;
    let blocks_received = read_data_frames(&mut transport, dest)?;

    let mut purge = Vec::new();
    PurgeRecord {
        rx_txid: rx_txid.clone(),
    }
    .write_to(&mut purge);
    transport.write_framed(&purge)?;
    let ack_frame = transport.read_framed()?;
    if let AckOutcome::Rejected { return_code } = validate_ack(&ack_frame) {
        return Err(ProtocolError::AckRejected { return_code });
    }

    Ok(SequenceOutcome::Found(ReceiveReport {
        sequence_used: txid.sequence,
        blocks_received,
    }))
}

/// Reads data frames until the `998` trailer, writing each extracted
/// payload to `dest`. The trailer's own return code must be `00` or the
/// dialogue fails; a mismatch between its reported block count and the
/// number actually received is logged but not fatal.
fn read_data_frames(
    transport: &mut FrameTransport,
    dest: &mut impl Write,
) -> Result<u32, ProtocolError> {
    let mut blocks_received = 0u32;

    loop {
        let frame = transport.read_framed()?;

        if frame_code_is(&frame, "998") {
            let code = ack_return_code(&frame).unwrap_or_default();
            if code != "00" {
                return Err(ProtocolError::AckRejected { return_code: code });
            }
            if frame.len() >= 11 {
                if let Ok(reported) = read_u32_be(&frame[7..11]) {
                    if reported != blocks_received + 1 {
                        tracing::warn!(
                            reported,
                            actual = blocks_received + 1,
                            "trailer block count does not match blocks received"
                        );
                    }
                }
            }
            return Ok(blocks_received);
        }

        let extracted = extract_payload(&frame);
        if !extracted.direction_ok {
            tracing::warn!(
                offset = extracted.direction_offset,
                "receive-side direction indicator mismatch, tolerating"
            );
        }
        dest.write_all(extracted.body)?;
        blocks_received += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::txid::{JulianDayClock, TransmissionId};
    use ipm_wire::ebcdic;
    use std::io::Cursor;
    use std::net::{TcpListener, TcpStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    struct FixedClock(u16);
    impl JulianDayClock for FixedClock {
        fn today_julian_day(&self) -> u16 {
            self.0
        }
    }

    fn ack_with_code(code: &str) -> Vec<u8> {
        let mut out = ebcdic::encode(b"998");
        out.extend_from_slice(&ebcdic::encode(b"01"));
        out.extend_from_slice(&ebcdic::encode(code.as_bytes()));
        out.extend_from_slice(&[0, 0, 0, 0]);
        out
    }

    #[test]
    fn sequence_scan_finds_third_attempt() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let attempt = Arc::new(AtomicUsize::new(0));
        let attempt_server = attempt.clone();

        let server = thread::spawn(move || {
            for _ in 0..3 {
                let (stream, _) = listener.accept().unwrap();
                let mut transport = FrameTransport::from_stream(stream, Duration::from_secs(2))
                    .unwrap();
                let n = attempt_server.fetch_add(1, Ordering::SeqCst);

                let _request = transport.read_framed().unwrap();

                if n < 2 {
                    transport.write_framed(&ack_with_code("09")).unwrap();
                    continue;
                }

                let mut header = ebcdic::encode(b"004");
                header.extend_from_slice(&ebcdic::encode(b"01"));
                header.extend_from_slice(&ebcdic::encode(b"T1120015700103"));
                header.resize(36, 0x00);
                header.extend_from_slice(&ipm_wire::ints::write_u32_be(1));
                header.resize(60, 0x00);
                transport.write_framed(&header).unwrap();

                let mut data = vec![ipm_wire::ebcdic::DIRECTION_RECEIVE];
                data.extend_from_slice(&[0xAAu8; 1014]);
                transport.write_framed(&data).unwrap();

                let mut trailer = ebcdic::encode(b"998");
                trailer.extend_from_slice(&ebcdic::encode(b"01"));
                trailer.extend_from_slice(&ebcdic::encode(b"00"));
                trailer.extend_from_slice(&ipm_wire::ints::write_u32_be(2));
                transport.write_framed(&trailer).unwrap();

                let _purge = transport.read_framed().unwrap();
                transport.write_framed(&ack_with_code("00")).unwrap();
            }
        });

        let clock = FixedClock(1);
        let base_txid = TransmissionId::parse("T11200157", &clock).unwrap();
        let mut dest = Cursor::new(Vec::new());

        let connect = || {
            FrameTransport::connect(addr, Duration::from_secs(2), Duration::from_secs(2))
                .map_err(ProtocolError::from)
        };

        let report = receive_file(connect, &base_txid, 1, &mut dest).unwrap();
        assert_eq!(report.sequence_used, 3);
        assert_eq!(report.blocks_received, 1);
        assert_eq!(dest.into_inner().len(), 1014);

        server.join().unwrap();
    }

    #[test]
    fn scan_exhaustion_reports_not_found() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            // Always reject; stop once the client gives up.
            while let Ok((stream, _)) = listener.accept() {
                let mut transport = FrameTransport::from_stream(stream, Duration::from_secs(2))
                    .unwrap();
                if transport.read_framed().is_err() {
                    break;
                }
                if transport.write_framed(&ack_with_code("09")).is_err() {
                    break;
                }
            }
        });

        let clock = FixedClock(1);
        let base_txid = TransmissionId::parse("T11200157", &clock).unwrap();
        let mut dest = Cursor::new(Vec::new());

        let connect = || {
            FrameTransport::connect(addr, Duration::from_secs(2), Duration::from_secs(2))
                .map_err(ProtocolError::from)
        };

        let result = receive_file(connect, &base_txid, 97, &mut dest);
        assert!(matches!(result, Err(ProtocolError::NotFound { .. })));

        drop(TcpStream::connect(addr).ok());
        server.join().unwrap();
    }
}
