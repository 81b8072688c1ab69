//! Implementation of `ipm encode`.

use anyhow::{Context, Result};

use crate::EncodeArgs;

/// Converts a line-oriented text file into a 1014-blocked, VBS-framed,
/// Cp500-encoded IPM container.
pub fn run(args: &EncodeArgs) -> Result<()> {
    let count = ipm_codec::encode_text_to_ipm(&args.input, &args.output)
        .with_context(|| format!("encoding {} to {}", args.input.display(), args.output.display()))?;
    println!("encoded {count} record(s) to {}", args.output.display());
    Ok(())
}
