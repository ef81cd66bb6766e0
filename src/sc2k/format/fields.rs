//! Per-segment field decoders.
//!
//! Each decoder takes the full decoded payload of one segment and turns it
//! into one semantic value per cell, in raster order (cell index `i` is grid
//! position `(i / 128, i % 128)`). Most fields are defined by numeric ranges
//! rather than named bits; values outside every range fall back to a default
//! and are reported as [`DecodeRangeError`]s instead of failing the import.

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};

use crate::sc2k::format::container::SegmentTag;
use crate::sc2k::types::error::{DecodeRangeError, FormatError};
use crate::sc2k::types::models::*;
use crate::sc2k::utils;

/// Byte offsets of the big-endian words in the miscellaneous segment.
pub mod misc_offsets {
    pub const ROTATION: usize = 0x0008;
    pub const YEAR_FOUNDED: usize = 0x000C;
    pub const DAYS_ELAPSED: usize = 0x0010;
    pub const TREASURY: usize = 0x0014;
    pub const POPULATION: usize = 0x0050;
    pub const WATER_LEVEL: usize = 0x0E40;
    pub const ZOOM: usize = 0x1014;
    pub const CENTER_X: usize = 0x1018;
    pub const CENTER_Y: usize = 0x101C;
    /// Payload length that covers every field above.
    pub const FULL_LEN: usize = CENTER_Y + 4;
    /// Shortest payload accepted: the rotation word must be present.
    pub const MIN_LEN: usize = ROTATION + 4;
}

/// Label records are a length byte followed by 24 characters.
const LABEL_RECORD_LEN: usize = 25;
const LABEL_COUNT: usize = 256;

/// Building-segment ids drawn on the transport/utility layer (power lines, roads, rails,
/// highways, tunnels, crossings) rather than as buildings.
const NETWORK_IDS: std::ops::RangeInclusive<u8> = 0x0E..=0x6B;

/// A decoded value and whether its source byte fell inside a defined range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checked<T> {
    pub value: T,
    pub in_range: bool,
}

impl<T> Checked<T> {
    fn ok(value: T) -> Self {
        Self { value, in_range: true }
    }

    fn fallback(value: T) -> Self {
        Self { value, in_range: false }
    }
}

/// The per-cell output of one decoder, plus any out-of-range values it replaced.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub cells: Vec<T>,
    pub range_errors: Vec<DecodeRangeError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerrainCell {
    pub slope: Slope,
    pub water: WaterLevel,
    pub tile_id: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneCell {
    pub corners: CornerMask,
    pub zone: ZoneType,
}

/// Where a building-segment id is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructureId {
    #[default]
    Empty,
    Building(u16),
    Network(u16),
}

/// Fields of the fixed-layout miscellaneous segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MiscFields {
    pub rotation: Rotation,
    pub year_founded: u32,
    pub days_elapsed: u32,
    pub treasury: i32,
    pub population: u32,
    pub zoom: u32,
    pub center: (u32, u32),
    pub water_level: u8,
}

/// Terrain byte decoding, by ordered range guards:
/// - `0x00..=0x3D`: slope from the low nibble, water level from the high nibble
/// - `0x3E`: flat, waterfall
/// - `0x40..`: flat, surface water
///
/// The sprite id always comes from the low nibble, whichever guard set the water level.
pub fn decode_terrain_byte(sq: u8) -> Checked<TerrainCell> {
    let slope_entry = Slope::from_nibble(sq & 0x0F);
    let tile_id = slope_entry.map_or(GRASS_TILE_ID, Slope::terrain_tile_id);

    match sq {
        0x00..=0x3D => {
            let water_entry = WaterLevel::from_index(sq >> 4);
            let cell = TerrainCell {
                slope: slope_entry.unwrap_or_default(),
                water: water_entry.unwrap_or_default(),
                tile_id,
            };
            if slope_entry.is_some() && water_entry.is_some() {
                Checked::ok(cell)
            } else {
                Checked::fallback(cell)
            }
        }
        0x3E => Checked::ok(TerrainCell { slope: Slope::Flat, water: WaterLevel::Waterfall, tile_id }),
        0x3F => Checked::fallback(TerrainCell { slope: Slope::Flat, water: WaterLevel::Dry, tile_id }),
        0x40..=0xFF => Checked::ok(TerrainCell { slope: Slope::Flat, water: WaterLevel::Surface, tile_id }),
    }
}

/// Underground byte decoding:
/// - `0x00..=0x1D`: slope from the low nibble; high nibble `0x0` marks a subway, `0x1` marks pipes
/// - `0x1F` / `0x20`: subway crossing pipes, flat; the value picks the subway orientation
/// - `0x22`: missile silo
/// - `0x23`: subway station, flat
pub fn decode_underground_byte(sq: u8) -> Checked<Underground> {
    let mut cell = Underground::default();
    match sq {
        0x00..=0x1D => {
            let slope = Slope::from_nibble(sq & 0x0F);
            cell.slope = slope.unwrap_or_default();
            match sq & 0xF0 {
                0x00 => cell.subway = true,
                _ => cell.pipes = true,
            }
            if slope.is_none() {
                return Checked::fallback(cell);
            }
        }
        0x1F | 0x20 => {
            cell.subway = true;
            cell.pipes = true;
            cell.subway_orientation = Some(if sq == 0x1F {
                SubwayOrientation::AlongX
            } else {
                SubwayOrientation::AlongY
            });
        }
        0x22 => cell.missile_silo = true,
        0x23 => cell.subway_station = true,
        _ => return Checked::fallback(cell),
    }
    Checked::ok(cell)
}

/// Zone byte decoding: high nibble is the corner mask, low nibble the zone type (`0..=9`).
/// Unmapped zone codes resolve to [`ZoneType::None`].
pub fn decode_zone_byte(sq: u8) -> Checked<ZoneCell> {
    let corners = CornerMask::new(sq >> 4);
    match ZoneType::from_code(sq & 0x0F) {
        Some(zone) => Checked::ok(ZoneCell { corners, zone }),
        None => Checked::fallback(ZoneCell { corners, zone: ZoneType::None }),
    }
}

pub fn decode_building_byte(id: u8) -> StructureId {
    match id {
        0 => StructureId::Empty,
        id if NETWORK_IDS.contains(&id) => StructureId::Network(id as u16),
        id => StructureId::Building(id as u16),
    }
}

/// Altitude word: bits 0-4 elevation, bits 5-6 global water level, bit 7 water flag,
/// bits 8-15 tunnel level.
pub fn decode_altitude_word(word: u16) -> Altitude {
    Altitude {
        elevation: (word & 0x1F) as u8,
        global_water_level: ((word >> 5) & 0x03) as u8,
        water_flag: word & 0x80 != 0,
        tunnel_level: (word >> 8) as u8,
    }
}

pub fn decode_terrain(bytes: &[u8]) -> Result<Decoded<TerrainCell>, FormatError> {
    decode_cells(SegmentTag::Xter, bytes, 1, |b| decode_terrain_byte(b[0]))
}

pub fn decode_underground(bytes: &[u8]) -> Result<Decoded<Underground>, FormatError> {
    decode_cells(SegmentTag::Xund, bytes, 1, |b| decode_underground_byte(b[0]))
}

pub fn decode_zones(bytes: &[u8]) -> Result<Decoded<ZoneCell>, FormatError> {
    decode_cells(SegmentTag::Xzon, bytes, 1, |b| decode_zone_byte(b[0]))
}

pub fn decode_buildings(bytes: &[u8]) -> Result<Decoded<StructureId>, FormatError> {
    decode_cells(SegmentTag::Xbld, bytes, 1, |b| Checked::ok(decode_building_byte(b[0])))
}

pub fn decode_bits(bytes: &[u8]) -> Result<Decoded<CellFlags>, FormatError> {
    decode_cells(SegmentTag::Xbit, bytes, 1, |b| Checked::ok(CellFlags::from_bits_retain(b[0])))
}

pub fn decode_altitude(bytes: &[u8]) -> Result<Decoded<Altitude>, FormatError> {
    decode_cells(SegmentTag::Altm, bytes, 2, |b| {
        Checked::ok(decode_altitude_word(LittleEndian::read_u16(b)))
    })
}

/// City name: the low 6 bits of the first byte give the length; non-ASCII bytes are dropped.
pub fn decode_city_name(bytes: &[u8]) -> String {
    let Some((&len_byte, text)) = bytes.split_first() else {
        return String::new();
    };
    let len = (len_byte & 0x3F) as usize;
    ascii_text(&text[..len.min(text.len())])
}

/// Map labels: 256 records of a length byte and 24 characters. Empty labels are skipped.
pub fn decode_labels(bytes: &[u8]) -> Result<Vec<String>, FormatError> {
    let expected = LABEL_RECORD_LEN * LABEL_COUNT;
    if bytes.len() != expected {
        return Err(FormatError::SegmentSizeMismatch {
            tag: SegmentTag::Xlab.name(),
            expected,
            found: bytes.len(),
        });
    }
    let labels: Vec<String> = bytes
        .chunks_exact(LABEL_RECORD_LEN)
        .map(|record| {
            let len = (record[0] as usize).min(LABEL_RECORD_LEN - 1);
            ascii_text(&record[1..1 + len])
        })
        .filter(|label| !label.is_empty())
        .collect();
    debug!("Decoded {} map labels", labels.len());
    Ok(labels)
}

/// Reads the fixed-offset words of the miscellaneous segment.
///
/// Words that lie past the end of a short payload read as 0. Only a payload too
/// short to hold the rotation word is rejected.
pub fn decode_misc(bytes: &[u8]) -> Result<MiscFields, FormatError> {
    use misc_offsets::*;

    if bytes.len() < MIN_LEN {
        return Err(FormatError::SegmentSizeMismatch {
            tag: SegmentTag::Misc.name(),
            expected: MIN_LEN,
            found: bytes.len(),
        });
    }
    if bytes.len() < FULL_LEN {
        debug!("MISC is {} bytes; words past the end read as 0", bytes.len());
    }
    let word = |offset| utils::read_u32_at(bytes, offset).unwrap_or_default();

    let raw_rotation = word(ROTATION);
    if raw_rotation > 3 {
        warn!("MISC rotation {} out of range; reducing modulo 4", raw_rotation);
    }
    let raw_water = word(WATER_LEVEL);
    if raw_water > 15 {
        warn!("MISC water level {} out of range; clamping to 15", raw_water);
    }

    Ok(MiscFields {
        rotation: Rotation::new(raw_rotation),
        year_founded: word(YEAR_FOUNDED),
        days_elapsed: word(DAYS_ELAPSED),
        treasury: word(TREASURY) as i32,
        population: word(POPULATION),
        zoom: word(ZOOM),
        center: (word(CENTER_X), word(CENTER_Y)),
        water_level: raw_water.min(15) as u8,
    })
}

fn ascii_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|b| b.is_ascii() && !b.is_ascii_control())
        .map(|&b| b as char)
        .collect()
}

/// Runs a per-cell decoder over a segment that must cover exactly [`CELL_COUNT`] cells.
fn decode_cells<T>(
    tag: SegmentTag,
    bytes: &[u8],
    width: usize,
    decode: impl Fn(&[u8]) -> Checked<T>,
) -> Result<Decoded<T>, FormatError> {
    let expected = CELL_COUNT * width;
    if bytes.len() != expected {
        return Err(FormatError::SegmentSizeMismatch {
            tag: tag.name(),
            expected,
            found: bytes.len(),
        });
    }

    let mut cells = Vec::with_capacity(CELL_COUNT);
    let mut range_errors = Vec::new();
    for (cell, raw) in bytes.chunks_exact(width).enumerate() {
        let checked = decode(raw);
        if !checked.in_range {
            range_errors.push(DecodeRangeError { tag: tag.name(), cell, value: raw[0] });
        }
        cells.push(checked.value);
    }

    if let Some(first) = range_errors.first() {
        warn!("{}", first);
        debug!("{} cells out of range in {}", range_errors.len(), tag);
    }
    debug!("Decoded {} cells from {}", cells.len(), tag);
    Ok(Decoded { cells, range_errors })
}
