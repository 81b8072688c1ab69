/// Errors produced by the wire-level primitives: EBCDIC conversion,
/// integer framing, and the length-prefixed frame transport.
///
/// Higher layers (`ipm-codec`, `ipm-protocol`) wrap this via `#[from]`
/// rather than re-declaring I/O and truncation variants of their own.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A read or decode ran out of bytes before it could complete.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// A 2-byte frame length prefix was zero or exceeded the 65535 byte
    /// maximum permitted by the frame transport.
    #[error("invalid frame length {length} at offset {offset}")]
    InvalidFrameLength { offset: usize, length: usize },

    /// The peer closed the connection before delivering a full frame.
    #[error("connection truncated: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },

    /// A connect or read deadline elapsed.
    #[error("{0} timed out")]
    Timeout(&'static str),

    /// Underlying I/O failure (refused, reset, permission, etc.).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
