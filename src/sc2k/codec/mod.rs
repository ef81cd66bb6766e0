//! Codec layer for segment payload compression.
//!
//! # Submodules
//!
//! - [`rle`][]: The container's run-length scheme (decompress, plus a compressor for building files)

pub mod rle;
