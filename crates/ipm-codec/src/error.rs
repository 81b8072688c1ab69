/// Errors from the block and VBS/RDW layers, plus the text↔IPM converter
/// that composes them.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A VBS length prefix was negative (impossible for a `u32`, kept for
    /// symmetry with the sibling error types) or exceeded the remaining buffer.
    #[error("invalid VBS framing at offset {offset}: length {length} exceeds remaining input")]
    InvalidFraming { offset: usize, length: u32 },

    #[error(transparent)]
    Wire(#[from] ipm_wire::WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
