//! The send dialogue: push a local file to the MIP under the `R`
//! (send) direction of a Transmission ID.

use std::io::Read;

use ipm_wire::frame::FrameTransport;

use crate::ack::{validate_ack, AckOutcome};
use crate::error::ProtocolError;
use crate::records::{wrap_send_data_frame, HeaderRecord, TrailerRecord};
use crate::txid::TransmissionId;

/// Maximum number of source-file bytes carried in one data frame, before
/// the leading direction-indicator byte is prepended.
const MAX_CHUNK_LEN: usize = 1014;

/// Outcome of a successful send dialogue.
#[derive(Debug, PartialEq, Eq)]
pub struct SendReport {
    pub data_frames_sent: u32,
}

/// Connects `transport`, writes 004, streams `file` as ≤1014-byte data
/// frames, writes 998 (count = data frames + 1, trailer inclusive), and
/// validates both ACKs.
///
/// # Errors
///
/// Returns [`ProtocolError::AckRejected`] if either ACK carries a
/// non-zero return code, or a [`ProtocolError::Wire`]/`Io` error if the
/// connection fails at any point.
pub fn send_file(
    transport: &mut FrameTransport,
    txid: &TransmissionId,
    file: &mut impl Read,
) -> Result<SendReport, ProtocolError> {
    let mut header = Vec::new();
    HeaderRecord {
        txid: txid.clone(),
    }
    .write_to(&mut header);
    transport.write_framed(&header)?;
    require_ack(transport)?;

    let mut data_frames_sent = 0u32;
    let mut buf = [0u8; MAX_CHUNK_LEN];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        let frame = wrap_send_data_frame(&buf[..n]);
        transport.write_framed(&frame)?;
        data_frames_sent += 1;
    }

    let mut trailer = Vec::new();
    TrailerRecord {
        count: data_frames_sent + 1,
    }
    .write_to(&mut trailer);
    transport.write_framed(&trailer)?;
    require_ack(transport)?;

    Ok(SendReport { data_frames_sent })
}

fn require_ack(transport: &mut FrameTransport) -> Result<(), ProtocolError> {
    let frame = transport.read_framed()?;
    match validate_ack(&frame) {
        AckOutcome::Accepted => Ok(()),
        AckOutcome::Rejected { return_code } => Err(ProtocolError::AckRejected { return_code }),
        AckOutcome::NotAnAck => {
            // Tolerated: read the next frame and try again, since the
            // peer may have sent an informational frame ahead of the ACK.
            let frame = transport.read_framed()?;
            match validate_ack(&frame) {
                AckOutcome::Accepted => Ok(()),
                AckOutcome::Rejected { return_code } => {
                    Err(ProtocolError::AckRejected { return_code })
                }
                AckOutcome::NotAnAck => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::txid::{JulianDayClock, TransmissionId};
    use ipm_wire::ebcdic;
    use std::io::Cursor;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    struct FixedClock(u16);
    impl JulianDayClock for FixedClock {
        fn today_julian_day(&self) -> u16 {
            self.0
        }
    }

    fn ok_ack() -> Vec<u8> {
        let mut out = ebcdic::encode(b"998");
        out.extend_from_slice(&ebcdic::encode(b"01"));
        out.extend_from_slice(&ebcdic::encode(b"00"));
        out.extend_from_slice(&[0, 0, 0, 0]);
        out
    }

    #[test]
    fn send_splits_file_into_1015_1015_971_byte_frames() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut transport =
                ipm_wire::frame::FrameTransport::from_stream(stream, Duration::from_secs(2))
                    .unwrap();

            let header = transport.read_framed().unwrap();
            assert_eq!(header.len(), crate::records::HeaderRecord::LEN);
            transport.write_framed(&ok_ack()).unwrap();

            let mut sizes = Vec::new();
            loop {
                let frame = transport.read_framed().unwrap();
                if ipm_wire::ebcdic::decode(&frame[0..3]) == b"998" {
                    transport.write_framed(&ok_ack()).unwrap();
                    break;
                }
                sizes.push(frame.len());
            }
            sizes
        });

        let mut client = ipm_wire::frame::FrameTransport::connect(
            addr,
            Duration::from_secs(2),
            Duration::from_secs(2),
        )
        .unwrap();
        let clock = FixedClock(1);
        let txid = TransmissionId::parse("R1213456710001", &clock).unwrap();
        // Two full 1014-byte chunks plus a 970-byte remainder, yielding
        // framed sizes 1015/1015/971 once the direction byte is added.
        let mut data = Cursor::new(vec![0xC1u8; 2 * 1014 + 970]);

        let report = send_file(&mut client, &txid, &mut data).unwrap();
        assert_eq!(report.data_frames_sent, 3);

        let sizes = server.join().unwrap();
        assert_eq!(sizes, vec![1015, 1015, 971]);
    }

    #[test]
    fn rejected_ack_aborts_send() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut transport =
                ipm_wire::frame::FrameTransport::from_stream(stream, Duration::from_secs(2))
                    .unwrap();
            let _header = transport.read_framed().unwrap();
            let mut bad_ack = ebcdic::encode(b"998");
            bad_ack.extend_from_slice(&ebcdic::encode(b"01"));
            bad_ack.extend_from_slice(&ebcdic::encode(b"09"));
            bad_ack.extend_from_slice(&[0, 0, 0, 0]);
            transport.write_framed(&bad_ack).unwrap();
        });

        let mut client = ipm_wire::frame::FrameTransport::connect(
            addr,
            Duration::from_secs(2),
            Duration::from_secs(2),
        )
        .unwrap();
        let clock = FixedClock(1);
        let txid = TransmissionId::parse("R1213456710001", &clock).unwrap();
        let mut data = Cursor::new(vec![0xC1u8; 10]);

        let result = send_file(&mut client, &txid, &mut data);
        assert!(matches!(result, Err(ProtocolError::AckRejected { .. })));

        server.join().unwrap();
    }
}
