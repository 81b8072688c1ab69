/// Errors from Transmission ID parsing, protocol record framing, and the
/// send/receive dialogues.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A Transmission ID was neither the 9-char short form nor the
    /// 14-char full form, or its direction character was not `R`/`T`.
    #[error("invalid transmission id {raw:?}: {reason}")]
    InvalidTxId { raw: String, reason: &'static str },

    /// A fixed-layout record (004/101/998/999) failed to parse at the
    /// given byte offset.
    #[error("malformed {record} record at offset {offset}: {reason}")]
    MalformedRecord {
        record: &'static str,
        offset: usize,
        reason: &'static str,
    },

    /// A 998 acknowledgement carried a non-zero return code.
    #[error("acknowledgement rejected with return code {return_code:?}")]
    AckRejected { return_code: String },

    /// The receive-side sequence scan (sequence numbers 01..99) never
    /// found a 004 header.
    #[error("no transmission found for prefix {prefix:?} (last error: {last_error})")]
    NotFound { prefix: String, last_error: String },

    #[error(transparent)]
    Wire(#[from] ipm_wire::WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
