//! Run-length codec used by most save-file segments.
//!
//! The stream is a sequence of runs, each introduced by one control byte `c`:
//! - `c < 128`: the next `c` bytes are copied verbatim (`c` may be 0)
//! - `c >= 128`: the single following byte is repeated `c - 127` times

use log::trace;

use crate::sc2k::types::error::FormatError;

/// Longest literal run a single control byte can describe.
const MAX_LITERAL_RUN: usize = 127;
/// Longest repeat run a single control byte can describe (`0xFF - 127`).
const MAX_REPEAT_RUN: usize = 128;

/// Decompresses a run-length encoded payload.
///
/// The output length is not declared up front; the buffer grows as runs are decoded.
///
/// # Errors
/// - [`FormatError::TruncatedRle`] if a repeat run has no byte to repeat.
///
/// A literal run that declares more bytes than remain copies what is left.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, FormatError> {
    let mut output = Vec::with_capacity(input.len() * 2);
    let mut pos = 0;

    while pos < input.len() {
        let control = input[pos];
        if control < 128 {
            let start = pos + 1;
            let end = (start + control as usize).min(input.len());
            output.extend_from_slice(&input[start..end]);
            pos = start + control as usize;
        } else {
            let value = *input
                .get(pos + 1)
                .ok_or(FormatError::TruncatedRle { offset: pos })?;
            let count = control as usize - 127;
            output.resize(output.len() + count, value);
            pos += 2;
        }
    }

    trace!("RLE decompressed {} bytes -> {} bytes", input.len(), output.len());
    Ok(output)
}

/// Compresses a buffer into the same run-length scheme.
///
/// Runs of three or more equal bytes become repeat runs; everything else is
/// emitted as literal runs. Used to build containers, not needed for reading.
pub fn compress(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len() + input.len() / MAX_LITERAL_RUN + 1);
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < input.len() {
        let value = input[pos];
        let run = input[pos..]
            .iter()
            .take(MAX_REPEAT_RUN)
            .take_while(|&&b| b == value)
            .count();

        if run >= 3 {
            flush_literals(&mut output, &input[literal_start..pos]);
            output.push((run + 127) as u8);
            output.push(value);
            pos += run;
            literal_start = pos;
        } else {
            pos += 1;
        }
    }
    flush_literals(&mut output, &input[literal_start..]);

    output
}

fn flush_literals(output: &mut Vec<u8>, literals: &[u8]) {
    for chunk in literals.chunks(MAX_LITERAL_RUN) {
        output.push(chunk.len() as u8);
        output.extend_from_slice(chunk);
    }
}
