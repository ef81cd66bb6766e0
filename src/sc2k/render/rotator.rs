//! Quarter-turn rotation of the whole city grid.
//!
//! Rotating left sends `(x, y)` to `(127 - y, x)`; rotating right sends it to
//! `(y, 127 - x)`. The stored cell coordinates are rewritten, and flip-capable
//! buildings toggle their `rotate_flag` so the variant resolver keeps them
//! facing the right way.

use log::{debug, info};

use crate::sc2k::city::City;
use crate::sc2k::render::variants;
use crate::sc2k::types::models::{MapCell, GRID_SIZE};
use crate::sc2k::types::tiles::TileCatalog;
use crate::sc2k::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Left,
    Right,
}

impl std::str::FromStr for RotationDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(RotationDirection::Left),
            "right" | "r" => Ok(RotationDirection::Right),
            other => Err(format!("Unknown rotation direction: {}", other)),
        }
    }
}

/// Destination grid position of `(x, y)` after one quarter turn.
pub fn rotated_position(x: usize, y: usize, direction: RotationDirection) -> (usize, usize) {
    let last = GRID_SIZE - 1;
    match direction {
        RotationDirection::Left => (last - y, x),
        RotationDirection::Right => (y, last - x),
    }
}

/// Builds the rotated grid. The source grid is left untouched.
pub fn rotate_cells(
    cells: &[MapCell],
    direction: RotationDirection,
    catalog: &impl TileCatalog,
) -> Vec<MapCell> {
    let mut rotated = cells.to_vec();
    let mut toggled = 0usize;

    for cell in cells {
        let (nx, ny) = rotated_position(cell.x as usize, cell.y as usize, direction);
        let mut moved = cell.clone();
        moved.x = nx as u8;
        moved.y = ny as u8;

        // Both layers come from the building segment; either may carry a flippable sprite.
        let flips = moved
            .building_tile_id
            .or(moved.network_tile_id)
            .and_then(|id| catalog.tile(id))
            .is_some_and(variants::is_flip_capable);
        if flips {
            moved.rotate_flag = !moved.rotate_flag;
            toggled += 1;
        }

        rotated[utils::cell_index(nx, ny)] = moved;
    }

    debug!("Rotated {} cells {:?}; toggled {} rotate flags", cells.len(), direction, toggled);
    rotated
}

impl City {
    /// Rotates the city a quarter turn.
    ///
    /// The rotated grid is built in full and swapped in, so no reader ever sees a
    /// half-rotated grid. Left increments the map rotation, right decrements it.
    pub fn rotate(&mut self, direction: RotationDirection, catalog: &impl TileCatalog) {
        self.cells = rotate_cells(&self.cells, direction, catalog);
        self.map_rotation = match direction {
            RotationDirection::Left => self.map_rotation.turned_left(),
            RotationDirection::Right => self.map_rotation.turned_right(),
        };
        info!("Map rotated {:?}; rotation is now {}", direction, self.map_rotation);
    }
}
