//! Length-prefixed (2-byte big-endian) record transport over a single TCP
//! connection. Connect deadline 15s, per-read deadline 20s;
//! a timeout or short read surfaces as a [`WireError`] and the caller is
//! expected to abort the current operation.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::WireError;
use crate::ints::{read_u16_be, write_u16_be};

/// Default connect deadline.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
/// Default per-read deadline.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(20);

/// A single TCP connection carrying length-prefixed frames.
///
/// Owns the socket exclusively for the lifetime of one send or receive
/// attempt; dropping it closes the connection.
pub struct FrameTransport {
    stream: TcpStream,
}

impl FrameTransport {
    /// Connect to `addr`, applying `connect_timeout` to the TCP handshake
    /// and `read_timeout` to every subsequent read.
    pub fn connect(
        addr: impl ToSocketAddrs,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, WireError> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| WireError::Io(std::io::Error::other("no address resolved")))?;
        let stream = TcpStream::connect_timeout(&addr, connect_timeout)
            .map_err(|_| WireError::Timeout("connect"))?;
        stream.set_read_timeout(Some(read_timeout))?;
        stream.set_write_timeout(Some(read_timeout))?;
        Ok(Self { stream })
    }

    /// Wrap an already-connected stream (used by tests against an
    /// in-process loopback listener).
    pub fn from_stream(stream: TcpStream, read_timeout: Duration) -> Result<Self, WireError> {
        stream.set_read_timeout(Some(read_timeout))?;
        stream.set_write_timeout(Some(read_timeout))?;
        Ok(Self { stream })
    }

    /// Write a 2-byte big-endian length prefix followed by `payload`, then
    /// flush. `payload` must be 1..=65535 bytes.
    pub fn write_framed(&mut self, payload: &[u8]) -> Result<(), WireError> {
        if payload.is_empty() || payload.len() > 0xFFFF {
            return Err(WireError::InvalidFrameLength {
                offset: 0,
                length: payload.len(),
            });
        }
        self.stream.write_all(&write_u16_be(payload.len() as u16))?;
        self.stream.write_all(payload)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Read exactly one frame: a 2-byte length prefix `L`, then `L` bytes
    /// of payload. A peer that closes mid-frame yields
    /// [`WireError::Truncated`]; a read deadline elapsing yields
    /// [`WireError::Timeout`].
    pub fn read_framed(&mut self) -> Result<Vec<u8>, WireError> {
        let mut len_buf = [0u8; 2];
        self.read_exact_mapped(&mut len_buf, "read length prefix")?;
        let len = read_u16_be(&len_buf)? as usize;
        if len == 0 {
            return Err(WireError::InvalidFrameLength { offset: 0, length: 0 });
        }

        let mut payload = vec![0u8; len];
        self.read_exact_mapped(&mut payload, "read frame payload")?;
        Ok(payload)
    }

    fn read_exact_mapped(&mut self, buf: &mut [u8], what: &'static str) -> Result<(), WireError> {
        match self.stream.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                tracing::debug!(want = buf.len(), "peer closed connection mid-frame");
                Err(WireError::Truncated {
                    expected: buf.len(),
                    got: 0,
                })
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                tracing::warn!(what, "deadline elapsed");
                Err(WireError::Timeout(what))
            }
            Err(e) => Err(WireError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn write_then_read_roundtrip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut transport =
                FrameTransport::from_stream(stream, Duration::from_secs(2)).unwrap();
            let frame = transport.read_framed().unwrap();
            transport.write_framed(&frame).unwrap();
        });

        let mut client = FrameTransport::connect(addr, Duration::from_secs(2), Duration::from_secs(2))
            .unwrap();
        client.write_framed(b"hello ipm").unwrap();
        let echoed = client.read_framed().unwrap();
        assert_eq!(echoed, b"hello ipm");

        server.join().unwrap();
    }

    #[test]
    fn truncated_peer_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            // Announce a 10-byte frame, then close without sending the body.
            stream.set_nonblocking(false).unwrap();
            let mut s = stream;
            s.write_all(&write_u16_be(10)).unwrap();
        });

        let mut client = FrameTransport::connect(addr, Duration::from_secs(2), Duration::from_secs(2))
            .unwrap();
        let result = client.read_framed();
        assert!(matches!(result, Err(WireError::Truncated { .. })));

        server.join().unwrap();
    }

    #[test]
    fn empty_payload_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let _ = listener.accept().unwrap();
        });
        let mut client = FrameTransport::connect(addr, Duration::from_secs(2), Duration::from_secs(2))
            .unwrap();
        assert!(matches!(
            client.write_framed(&[]),
            Err(WireError::InvalidFrameLength { .. })
        ));
        server.join().unwrap();
    }
}
