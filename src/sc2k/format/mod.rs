//! File format parsing layer for save containers.
//!
//! This module provides the mid-level parsing layer that bridges between
//! raw file bytes and the [`CityBuilder`](crate::sc2k::builder::CityBuilder).
//!
//! # Module Organization
//!
//! - [`container`]: Validates the header and splits the body into tagged segments
//! - [`fields`]: Decodes each segment into per-cell values
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐
//! │  FORM....SCDH   │ ← container::is_valid_container()
//! ├─────────────────┤
//! │  Segment        │ ← container::read_segments()
//! │  (tag, length,  │      └ codec::rle::decompress()
//! │   payload)      │
//! ├─────────────────┤
//! │  ...            │ ← fields::decode_*()
//! └─────────────────┘
//! ```

pub mod container;
pub mod fields;
