//! Low-level byte reading utilities

use byteorder::{BigEndian, ByteOrder};

use crate::sc2k::types::models::GRID_SIZE;

/// Reads a big-endian u32 at a fixed byte offset, or `None` if the buffer is too short.
///
/// Used for the fixed-layout miscellaneous segment.
pub fn read_u32_at(bytes: &[u8], offset: usize) -> Option<u32> {
    bytes.get(offset..offset + 4).map(BigEndian::read_u32)
}

/// Renders a 4-byte tag for log and error messages, replacing non-printable bytes.
pub fn tag_display(tag: &[u8; 4]) -> String {
    tag.iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect()
}

/// Splits a cell index into its `(x, y)` grid position.
///
/// `y` cycles fastest, `x` advances every `GRID_SIZE` cells.
pub fn cell_position(index: usize) -> (u8, u8) {
    ((index / GRID_SIZE) as u8, (index % GRID_SIZE) as u8)
}

/// The inverse of [`cell_position`].
pub fn cell_index(x: usize, y: usize) -> usize {
    x * GRID_SIZE + y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_words() {
        let bytes = [0, 0, 0, 0, 0x00, 0x00, 0x07, 0xD0];
        assert_eq!(read_u32_at(&bytes, 4), Some(2000));
        assert_eq!(read_u32_at(&bytes, 5), None);
    }

    #[test]
    fn cell_positions_are_raster_order() {
        assert_eq!(cell_position(0), (0, 0));
        assert_eq!(cell_position(127), (0, 127));
        assert_eq!(cell_position(128), (1, 0));
        assert_eq!(cell_index(1, 0), 128);
    }

    #[test]
    fn tag_display_masks_binary() {
        assert_eq!(tag_display(b"XTER"), "XTER");
        assert_eq!(tag_display(&[b'A', 0, b'B', 0xFF]), "A?B?");
    }
}
