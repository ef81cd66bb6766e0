//! Save container parsing: header validation and tagged segment splitting.
//!
//! # Container Structure
//! ```text
//! [4 bytes]  "FORM"
//! [4 bytes]  total size (ignored)
//! [4 bytes]  "SCDH"
//! repeated until end of file:
//!   [4 bytes]  segment tag (ASCII)
//!   [4 bytes]  payload length (big-endian u32)
//!   [N bytes]  payload (RLE-compressed unless the tag is ALTM or CNAM)
//! ```

use std::collections::HashMap;

use byteorder::{BigEndian, ByteOrder};
use log::{debug, trace};

use crate::sc2k::codec::rle;
use crate::sc2k::types::error::FormatError;
use crate::sc2k::utils;

pub const CONTAINER_MAGIC: &[u8; 4] = b"FORM";
pub const APPLICATION_MAGIC: &[u8; 4] = b"SCDH";
pub const HEADER_SIZE: usize = 12;

/// Known segment tags. Anything else is carried as [`SegmentTag::Unknown`] and ignored by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentTag {
    /// City name.
    Cnam,
    /// Fixed-layout city statistics.
    Misc,
    /// Per-cell altitude words.
    Altm,
    /// Per-cell terrain shape and water.
    Xter,
    /// Per-cell building and network sprite ids.
    Xbld,
    /// Per-cell zone type and footprint corners.
    Xzon,
    /// Per-cell underground structures.
    Xund,
    /// Per-cell attribute bits.
    Xbit,
    /// Map labels.
    Xlab,
    Unknown([u8; 4]),
}

impl SegmentTag {
    pub fn from_bytes(tag: [u8; 4]) -> Self {
        match &tag {
            b"CNAM" => SegmentTag::Cnam,
            b"MISC" => SegmentTag::Misc,
            b"ALTM" => SegmentTag::Altm,
            b"XTER" => SegmentTag::Xter,
            b"XBLD" => SegmentTag::Xbld,
            b"XZON" => SegmentTag::Xzon,
            b"XUND" => SegmentTag::Xund,
            b"XBIT" => SegmentTag::Xbit,
            b"XLAB" => SegmentTag::Xlab,
            _ => SegmentTag::Unknown(tag),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SegmentTag::Cnam => "CNAM",
            SegmentTag::Misc => "MISC",
            SegmentTag::Altm => "ALTM",
            SegmentTag::Xter => "XTER",
            SegmentTag::Xbld => "XBLD",
            SegmentTag::Xzon => "XZON",
            SegmentTag::Xund => "XUND",
            SegmentTag::Xbit => "XBIT",
            SegmentTag::Xlab => "XLAB",
            SegmentTag::Unknown(_) => "unknown",
        }
    }

    /// Segments stored without run-length compression.
    pub fn is_uncompressed(&self) -> bool {
        matches!(self, SegmentTag::Altm | SegmentTag::Cnam)
    }
}

impl std::fmt::Display for SegmentTag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SegmentTag::Unknown(raw) => write!(f, "{}", utils::tag_display(raw)),
            known => write!(f, "{}", known.name()),
        }
    }
}

/// Decoded segment payloads keyed by tag. When a tag repeats, the last occurrence wins.
#[derive(Debug, Default)]
pub struct Segments {
    payloads: HashMap<SegmentTag, Vec<u8>>,
    /// Segments read from the file, duplicates and unknown tags included.
    pub segment_count: usize,
}

impl Segments {
    pub fn get(&self, tag: SegmentTag) -> Option<&[u8]> {
        self.payloads.get(&tag).map(Vec::as_slice)
    }

    pub fn contains(&self, tag: SegmentTag) -> bool {
        self.payloads.contains_key(&tag)
    }

    /// Tags present in the container that this crate does not decode.
    pub fn unknown_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .payloads
            .keys()
            .filter(|tag| matches!(tag, SegmentTag::Unknown(_)))
            .map(ToString::to_string)
            .collect();
        tags.sort();
        tags
    }

    pub fn insert(&mut self, tag: SegmentTag, payload: Vec<u8>) {
        if self.payloads.insert(tag, payload).is_some() {
            debug!("Segment {} appears more than once; keeping the last occurrence", tag);
        }
    }
}

/// Checks the fixed 12-byte header: `FORM` at 0..4 and `SCDH` at 8..12.
pub fn is_valid_container(bytes: &[u8]) -> bool {
    bytes.len() >= HEADER_SIZE
        && &bytes[0..4] == CONTAINER_MAGIC
        && &bytes[8..12] == APPLICATION_MAGIC
}

/// Splits the whole file into decoded segments.
///
/// Each payload is run through [`rle::decompress`] unless its tag is stored uncompressed.
///
/// # Errors
/// - [`FormatError::InvalidHeader`] if either magic is wrong; nothing else is parsed.
/// - [`FormatError::TruncatedSegment`] if a tag, length, or payload runs past the end of the file.
/// - [`FormatError::TruncatedRle`] if a compressed payload is malformed.
pub fn read_segments(bytes: &[u8]) -> Result<Segments, FormatError> {
    if !is_valid_container(bytes) {
        return Err(FormatError::InvalidHeader);
    }
    trace!("Container declares total size {}", BigEndian::read_u32(&bytes[4..8]));

    let mut segments = Segments::default();
    let mut rest = &bytes[HEADER_SIZE..];

    while !rest.is_empty() {
        if rest.len() < 8 {
            let mut raw = [b'?'; 4];
            let n = rest.len().min(4);
            raw[..n].copy_from_slice(&rest[..n]);
            return Err(FormatError::TruncatedSegment {
                tag: utils::tag_display(&raw),
                declared: 8,
                remaining: rest.len() as u64,
            });
        }

        let raw_tag = [rest[0], rest[1], rest[2], rest[3]];
        let length = BigEndian::read_u32(&rest[4..8]) as usize;
        let tag = SegmentTag::from_bytes(raw_tag);
        rest = &rest[8..];

        if length > rest.len() {
            return Err(FormatError::TruncatedSegment {
                tag: tag.to_string(),
                declared: length as u64,
                remaining: rest.len() as u64,
            });
        }
        let (payload, tail) = rest.split_at(length);
        rest = tail;

        let decoded = if tag.is_uncompressed() {
            payload.to_vec()
        } else {
            rle::decompress(payload)?
        };
        debug!("Segment {}: {} bytes stored, {} bytes decoded", tag, length, decoded.len());

        segments.segment_count += 1;
        segments.insert(tag, decoded);
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"FORM");
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(b"SCDH");
        bytes
    }

    fn push_segment(bytes: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
        bytes.extend_from_slice(tag);
        bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(payload);
    }

    #[test]
    fn valid_header_is_accepted() {
        assert!(is_valid_container(&header()));
    }

    #[test]
    fn any_magic_byte_mutation_is_rejected() {
        for index in (0..4).chain(8..12) {
            let mut bytes = header();
            bytes[index] ^= 0x01;
            assert!(!is_valid_container(&bytes), "mutation at {index} accepted");
        }
    }

    #[test]
    fn short_file_is_invalid_header() {
        assert_eq!(read_segments(b"FORM").unwrap_err(), FormatError::InvalidHeader);
    }

    #[test]
    fn compressed_and_raw_segments_are_split() {
        let mut bytes = header();
        push_segment(&mut bytes, b"CNAM", &[0x03, b'A', b'B', b'C']);
        push_segment(&mut bytes, b"XTXT", &[0x82, 0x05]);
        push_segment(&mut bytes, b"MISC", &[0x81, 0x00, 0x01, 0x09]);

        let segments = read_segments(&bytes).unwrap();
        assert_eq!(segments.segment_count, 3);
        assert_eq!(segments.get(SegmentTag::Cnam), Some(&[0x03, b'A', b'B', b'C'][..]));
        assert_eq!(segments.get(SegmentTag::Misc), Some(&[0x00, 0x00, 0x09][..]));
        assert_eq!(segments.unknown_tags(), vec!["XTXT".to_string()]);
    }

    #[test]
    fn last_duplicate_segment_wins() {
        let mut bytes = header();
        push_segment(&mut bytes, b"CNAM", b"first");
        push_segment(&mut bytes, b"CNAM", b"second");
        let segments = read_segments(&bytes).unwrap();
        assert_eq!(segments.get(SegmentTag::Cnam), Some(&b"second"[..]));
    }

    #[test]
    fn declared_length_past_end_is_truncated() {
        let mut bytes = header();
        bytes.extend_from_slice(b"XTER");
        bytes.extend_from_slice(&100u32.to_be_bytes());
        bytes.extend_from_slice(&[0x00; 10]);
        assert_eq!(
            read_segments(&bytes).unwrap_err(),
            FormatError::TruncatedSegment {
                tag: "XTER".to_string(),
                declared: 100,
                remaining: 10,
            }
        );
    }

    #[test]
    fn broken_rle_payload_fails_the_container() {
        let mut bytes = header();
        push_segment(&mut bytes, b"XZON", &[0x90]);
        assert!(matches!(
            read_segments(&bytes).unwrap_err(),
            FormatError::TruncatedRle { .. }
        ));
    }
}
