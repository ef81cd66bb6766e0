//! The loaded city: a dense grid of map cells plus city-level metadata.

use crate::sc2k::types::error::DecodeRangeError;
use crate::sc2k::types::models::*;
use crate::sc2k::utils;

/// What happened while importing a city, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Segments read from the container, duplicates and unknown tags included.
    pub segment_count: usize,
    pub unknown_tags: Vec<String>,
    /// Cells whose value fell outside its decoding table and received a default.
    pub range_errors: Vec<DecodeRangeError>,
}

/// A fully decoded city. Only [`City::rotate`] mutates it after import.
#[derive(Debug, Clone)]
pub struct City {
    pub(crate) cells: Vec<MapCell>,
    pub metadata: CityMetadata,
    pub labels: Vec<String>,
    pub report: ImportReport,
    pub(crate) map_rotation: Rotation,
}

impl City {
    pub(crate) fn new(
        cells: Vec<MapCell>,
        metadata: CityMetadata,
        labels: Vec<String>,
        report: ImportReport,
    ) -> Self {
        debug_assert_eq!(cells.len(), CELL_COUNT);
        Self {
            cells,
            metadata,
            labels,
            report,
            map_rotation: Rotation::default(),
        }
    }

    /// The cell currently at grid position `(x, y)`, or `None` outside the grid.
    pub fn cell(&self, x: usize, y: usize) -> Option<&MapCell> {
        if x >= GRID_SIZE || y >= GRID_SIZE {
            return None;
        }
        self.cells.get(utils::cell_index(x, y))
    }

    /// All cells in raster order (`y` fastest).
    pub fn cells(&self) -> &[MapCell] {
        &self.cells
    }

    /// The current map rotation, `0..4`.
    pub fn map_rotation(&self) -> Rotation {
        self.map_rotation
    }

    /// Whether a rotation baseline was read from the file.
    pub fn rotation_known(&self) -> bool {
        self.metadata.rotation.is_some()
    }
}
