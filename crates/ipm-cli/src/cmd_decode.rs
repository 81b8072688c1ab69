//! Implementation of `ipm decode`.

use anyhow::{Context, Result};

use crate::DecodeArgs;

/// Converts an IPM container file into one printable-ASCII line per
/// record.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let count = ipm_codec::decode_ipm_to_text(&args.input, &args.output)
        .with_context(|| format!("decoding {} to {}", args.input.display(), args.output.display()))?;
    println!("decoded {count} record(s) to {}", args.output.display());
    Ok(())
}
