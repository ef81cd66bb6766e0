//! Custom error types for the sc2k-reader crate.
//!
//! Errors fall into three groups:
//! - [`FormatError`]: the container or a segment is structurally broken. Fatal to the import.
//! - [`ImportError`]: the container is well formed but cannot produce a viewable city. Fatal to the import.
//! - [`DecodeRangeError`]: a single cell carries a value outside its lookup table. Never fatal;
//!   the decoder substitutes a default and records the error in the import report.

use thiserror::Error;

/// Structural problems with the save container or one of its segments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The 12-byte header does not carry the `FORM` / `SCDH` magics.
    #[error("Invalid container header: expected FORM....SCDH")]
    InvalidHeader,

    /// A segment declares more payload bytes than remain in the file.
    #[error("Truncated segment {tag}: declared {declared} bytes, but only {remaining} remain")]
    TruncatedSegment {
        tag: String,
        declared: u64,
        remaining: u64,
    },

    /// A repeat-run control byte was the last byte of the compressed stream.
    #[error("Truncated RLE stream: repeat run at offset {offset} has no byte to repeat")]
    TruncatedRle { offset: usize },

    /// A per-cell segment does not cover exactly the 128x128 grid (or a fixed-layout segment is too short).
    #[error("Size mismatch for segment {tag}: expected {expected} bytes, but found {found} bytes")]
    SegmentSizeMismatch {
        tag: &'static str,
        expected: usize,
        found: usize,
    },
}

/// The container parsed, but the city model cannot be built from it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Required segment {0} is missing from the save file")]
    MissingRequiredSegment(&'static str),
}

/// A per-cell value with no entry in its decoding table.
///
/// Recorded, not raised: decoding continues with the documented default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Value {value:#04x} in segment {tag} at cell {cell} is out of range; default applied")]
pub struct DecodeRangeError {
    pub tag: &'static str,
    pub cell: usize,
    pub value: u8,
}

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum Sc2kError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// A JSON document (atlas manifest, tile catalog, view config) failed to parse.
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// A convenience `Result` type alias using the crate's `Sc2kError` type.
pub type Result<T> = std::result::Result<T, Sc2kError>;
