//! Core data structures for the decoded city model.
//!
//! This module defines the fundamental types used throughout the library:
//! - Grid geometry constants and the map rotation value
//! - Per-cell enumerations decoded from numeric ranges (slope, water, zone, underground)
//! - The durable [`MapCell`] record and city-level [`CityMetadata`]

use bitflags::bitflags;

/// Cells along one edge of the (always square) city grid.
pub const GRID_SIZE: usize = 128;

/// Number of cells in a grid, and the byte count of every one-byte-per-cell segment.
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Sprite id used for plain grass terrain; also the base of the terrain sprite range.
pub const GRASS_TILE_ID: u16 = 256;

/// Base sprite id of the zone overlay sprites (`290 + zone type`).
pub const ZONE_TILE_BASE: u16 = 290;

/// Highest elevation step a cell can carry.
pub const MAX_ELEVATION: u8 = 31;

/// Global map-facing state: a value in `0..4` counting quarter turns.
///
/// Rotating left increments, rotating right decrements, both modulo 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rotation(u8);

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation(0), Rotation(1), Rotation(2), Rotation(3)];

    /// Builds a rotation from any integer, reducing it modulo 4.
    pub fn new(value: u32) -> Self {
        Rotation((value % 4) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn turned_left(self) -> Self {
        Rotation((self.0 + 1) % 4)
    }

    pub fn turned_right(self) -> Self {
        Rotation((self.0 + 3) % 4)
    }

    /// Rotations {0, 2} and {1, 3} form the two parity groups used for sprite mirroring.
    pub fn is_odd(self) -> bool {
        self.0 % 2 == 1
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terrain shape of a cell, shared by the terrain and underground segments.
///
/// Discriminants match the low nibble of the encoded byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slope {
    #[default]
    Flat = 0x0,
    North = 0x1,
    East = 0x2,
    South = 0x3,
    West = 0x4,
    NorthEast = 0x5,
    SouthEast = 0x6,
    SouthWest = 0x7,
    NorthWest = 0x8,
    CornerNorthEast = 0x9,
    CornerSouthEast = 0xA,
    CornerSouthWest = 0xB,
    CornerNorthWest = 0xC,
    Raised = 0xD,
}

impl Slope {
    /// The 14-entry slope table, indexed by the low nibble of a terrain byte.
    pub const TABLE: [Slope; 14] = [
        Slope::Flat,
        Slope::North,
        Slope::East,
        Slope::South,
        Slope::West,
        Slope::NorthEast,
        Slope::SouthEast,
        Slope::SouthWest,
        Slope::NorthWest,
        Slope::CornerNorthEast,
        Slope::CornerSouthEast,
        Slope::CornerSouthWest,
        Slope::CornerNorthWest,
        Slope::Raised,
    ];

    pub fn from_nibble(nibble: u8) -> Option<Self> {
        Self::TABLE.get(nibble as usize).copied()
    }

    /// Which diamond corners sit one step higher, in `[top, right, bottom, left]` order.
    ///
    /// North is the `+x` edge (top and right corners), east the `+y` edge, south the
    /// `-x` edge and west the `-y` edge.
    pub fn raised_corners(self) -> [bool; 4] {
        match self {
            Slope::Flat => [false, false, false, false],
            Slope::North => [true, true, false, false],
            Slope::East => [false, true, true, false],
            Slope::South => [false, false, true, true],
            Slope::West => [true, false, false, true],
            Slope::NorthEast => [true, true, true, false],
            Slope::SouthEast => [false, true, true, true],
            Slope::SouthWest => [true, false, true, true],
            Slope::NorthWest => [true, true, false, true],
            Slope::CornerNorthEast => [false, true, false, false],
            Slope::CornerSouthEast => [false, false, true, false],
            Slope::CornerSouthWest => [false, false, false, true],
            Slope::CornerNorthWest => [true, false, false, false],
            Slope::Raised => [true, true, true, true],
        }
    }

    /// Terrain sprite id for this shape (`256..=269`).
    pub fn terrain_tile_id(self) -> u16 {
        GRASS_TILE_ID + self as u16
    }
}

/// Per-cell water state, distinct from the city-wide baseline water level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaterLevel {
    #[default]
    Dry,
    Submerged,
    Shore,
    Surface,
    Waterfall,
}

impl WaterLevel {
    pub const TABLE: [WaterLevel; 5] = [
        WaterLevel::Dry,
        WaterLevel::Submerged,
        WaterLevel::Shore,
        WaterLevel::Surface,
        WaterLevel::Waterfall,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::TABLE.get(index as usize).copied()
    }

    pub fn is_wet(self) -> bool {
        self != WaterLevel::Dry
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ZoneType {
    #[default]
    None = 0,
    LightResidential = 1,
    DenseResidential = 2,
    LightCommercial = 3,
    DenseCommercial = 4,
    LightIndustrial = 5,
    DenseIndustrial = 6,
    MilitaryBase = 7,
    Airport = 8,
    Seaport = 9,
}

impl ZoneType {
    pub const TABLE: [ZoneType; 10] = [
        ZoneType::None,
        ZoneType::LightResidential,
        ZoneType::DenseResidential,
        ZoneType::LightCommercial,
        ZoneType::DenseCommercial,
        ZoneType::LightIndustrial,
        ZoneType::DenseIndustrial,
        ZoneType::MilitaryBase,
        ZoneType::Airport,
        ZoneType::Seaport,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Self::TABLE.get(code as usize).copied()
    }

    /// Zone overlay sprite id, or `None` for unzoned land.
    pub fn tile_id(self) -> Option<u16> {
        match self {
            ZoneType::None => None,
            zone => Some(ZONE_TILE_BASE + zone as u16),
        }
    }
}

/// Which footprint corners of a multi-cell building or zone this cell occupies.
///
/// Stored as the high nibble of the zone byte. Reading the nibble as a 4-character
/// binary string, the characters are in the order {top, bottom-left, bottom-right,
/// top-left}, one per map rotation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CornerMask(u8);

impl CornerMask {
    pub fn new(nibble: u8) -> Self {
        CornerMask(nibble & 0x0F)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether the corner for the given rotation slot is occupied.
    pub fn has_corner(self, rotation: Rotation) -> bool {
        (self.0 >> (3 - rotation.value())) & 1 == 1
    }

    /// The mask as a 4-character binary string, e.g. `"1001"`.
    pub fn as_bit_string(self) -> String {
        format!("{:04b}", self.0)
    }
}

bitflags! {
    /// Independent per-cell attribute bits from the bit-attribute segment, highest bit first.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u8 {
        const CONDUCTIVE    = 1 << 7;
        const POWERED       = 1 << 6;
        const PIPED         = 1 << 5;
        const WATERED       = 1 << 4;
        const LAND_VALUE    = 1 << 3;
        const WATER_COVERED = 1 << 2;
        const ROTATE        = 1 << 1;
        const SALT_WATER    = 1 << 0;
    }
}

/// Direction a subway runs where it crosses a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubwayOrientation {
    /// Encoded as `0x1F`.
    AlongX,
    /// Encoded as `0x20`.
    AlongY,
}

/// Decoded underground state of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Underground {
    pub slope: Slope,
    pub subway: bool,
    pub pipes: bool,
    pub subway_orientation: Option<SubwayOrientation>,
    pub missile_silo: bool,
    pub subway_station: bool,
}

/// Decoded altitude word of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Altitude {
    /// Elevation step, `0..=31`.
    pub elevation: u8,
    pub water_flag: bool,
    /// Two-bit global water level sub-field.
    pub global_water_level: u8,
    pub tunnel_level: u8,
}

/// The durable per-tile record. Exactly one exists per grid position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapCell {
    pub x: u8,
    pub y: u8,
    /// Elevation step, `0..=31`.
    pub z: u8,
    pub terrain_tile_id: u16,
    pub building_tile_id: Option<u16>,
    pub zone_tile_id: Option<u16>,
    pub network_tile_id: Option<u16>,
    pub slope: Slope,
    pub water_level: WaterLevel,
    pub zone: ZoneType,
    pub building_corners: CornerMask,
    pub rotate_flag: bool,
    /// Attribute bits, without [`CellFlags::ROTATE`] (carried by `rotate_flag`).
    pub flags: CellFlags,
    pub underground: Underground,
    pub water_flag: bool,
    pub tunnel_level: u8,
}

impl MapCell {
    /// A dry, flat grass cell at the given position.
    pub fn grass(x: u8, y: u8) -> Self {
        Self {
            x,
            y,
            z: 0,
            terrain_tile_id: GRASS_TILE_ID,
            building_tile_id: None,
            zone_tile_id: None,
            network_tile_id: None,
            slope: Slope::Flat,
            water_level: WaterLevel::Dry,
            zone: ZoneType::None,
            building_corners: CornerMask::default(),
            rotate_flag: false,
            flags: CellFlags::empty(),
            underground: Underground::default(),
            water_flag: false,
            tunnel_level: 0,
        }
    }

    /// Whether this cell is the one that draws its structure's sprite at the given rotation.
    ///
    /// Cells without any corner bits belong to single-cell structures and are always key tiles.
    pub fn is_key_tile(&self, rotation: Rotation) -> bool {
        self.building_corners.is_empty() || self.building_corners.has_corner(rotation)
    }
}

/// City-level facts decoded from the name and miscellaneous segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CityMetadata {
    pub name: String,
    pub year_founded: u32,
    pub days_elapsed: u32,
    pub treasury: i32,
    pub population: u32,
    /// Rotation the city was saved in; `None` until a baseline is known.
    pub rotation: Option<Rotation>,
    /// City-wide baseline water level in elevation units, `0..=15`.
    pub water_level: u8,
    pub zoom: u32,
    pub center: (u32, u32),
}
