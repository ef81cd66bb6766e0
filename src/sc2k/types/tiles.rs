//! Static tile metadata consumed by the projector and the variant resolver.
//!
//! The catalog itself lives outside this crate; [`TileCatalog`] is the
//! "lookup tile metadata by id" seam. [`TileTable`] is an in-memory
//! implementation that can be filled from a JSON document.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;

use super::error::Result;

/// Per-sprite static facts. Read-only for the core.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TileDefinition {
    pub id: u16,
    /// Footprint edge length in cells. Carried for catalog consumers; the grid's
    /// corner masks already mark which cells a building covers.
    #[serde(default = "default_size")]
    pub size: u8,
    /// Animation frame count.
    #[serde(default = "default_frames")]
    pub frames: u8,
    #[serde(default)]
    pub rotate_0: Option<u16>,
    #[serde(default)]
    pub rotate_1: Option<u16>,
    #[serde(default)]
    pub rotate_2: Option<u16>,
    #[serde(default)]
    pub rotate_3: Option<u16>,
    /// The sprite can be drawn horizontally mirrored.
    #[serde(default)]
    pub flip_h: bool,
    /// A dedicated sprite to use instead of mirroring this one.
    #[serde(default)]
    pub flip_alt_tile: Option<u16>,
    /// Present for tiles drawn as filled polygons rather than raster sprites.
    #[serde(default)]
    pub vector: Option<VectorStyle>,
}

/// Fill and outline colors for vector-drawn tiles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VectorStyle {
    pub fill: String,
    #[serde(default)]
    pub stroke: Option<String>,
    /// Lift the top polygon's corners to follow the cell's slope.
    #[serde(default)]
    pub follow_slope: bool,
    /// Fill used instead of `fill` on sloped cells.
    #[serde(default)]
    pub slope_fill: Option<String>,
}

fn default_size() -> u8 {
    1
}

fn default_frames() -> u8 {
    1
}

impl TileDefinition {
    /// A plain single-cell, single-frame sprite with no rotation variants.
    pub fn simple(id: u16) -> Self {
        Self {
            id,
            size: 1,
            frames: 1,
            rotate_0: None,
            rotate_1: None,
            rotate_2: None,
            rotate_3: None,
            flip_h: false,
            flip_alt_tile: None,
            vector: None,
        }
    }

    /// The rotation-table entry for a slot, if set.
    pub fn rotation_slot(&self, slot: usize) -> Option<u16> {
        match slot % 4 {
            0 => self.rotate_0,
            1 => self.rotate_1,
            2 => self.rotate_2,
            _ => self.rotate_3,
        }
    }

    /// The rotation-table entry for a slot, falling back to this tile's own id.
    pub fn sprite_for_slot(&self, slot: usize) -> u16 {
        self.rotation_slot(slot).unwrap_or(self.id)
    }

    pub fn is_vector(&self) -> bool {
        self.vector.is_some()
    }
}

/// Lookup of static tile metadata by sprite id.
pub trait TileCatalog {
    fn tile(&self, id: u16) -> Option<&TileDefinition>;
}

/// An in-memory tile catalog keyed by sprite id.
#[derive(Debug, Default, Clone)]
pub struct TileTable {
    tiles: HashMap<u16, TileDefinition>,
}

impl TileTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tile: TileDefinition) {
        self.tiles.insert(tile.id, tile);
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Parses a JSON array of tile definitions.
    pub fn from_json(json: &str) -> Result<Self> {
        let defs: Vec<TileDefinition> = serde_json::from_str(json)?;
        debug!("Parsed {} tile definitions", defs.len());
        Ok(defs.into_iter().collect())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading tile catalog: {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl FromIterator<TileDefinition> for TileTable {
    fn from_iter<I: IntoIterator<Item = TileDefinition>>(iter: I) -> Self {
        let mut table = TileTable::new();
        for tile in iter {
            table.insert(tile);
        }
        table
    }
}

impl TileCatalog for TileTable {
    fn tile(&self, id: u16) -> Option<&TileDefinition> {
        self.tiles.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_defaults_fill_missing_fields() {
        let table = TileTable::from_json(
            r#"[
                {"id": 256},
                {"id": 140, "size": 2, "frames": 4, "rotate_1": 141, "flip_h": true, "flip_alt_tile": 142},
                {"id": 300, "vector": {"fill": "34a853"}}
            ]"#,
        )
        .expect("valid catalog");

        assert_eq!(table.len(), 3);
        let grass = table.tile(256).expect("grass");
        assert_eq!(grass.size, 1);
        assert_eq!(grass.frames, 1);
        assert!(!grass.flip_h);

        let building = table.tile(140).expect("building");
        assert_eq!(building.sprite_for_slot(0), 140);
        assert_eq!(building.sprite_for_slot(1), 141);
        assert_eq!(building.flip_alt_tile, Some(142));
        assert_eq!(building.size, 2);

        let vector = table.tile(300).expect("vector");
        assert!(vector.is_vector());
        assert_eq!(vector.vector.as_ref().map(|v| v.follow_slope), Some(false));
    }

    #[test]
    fn vector_style_reads_slope_fields() {
        let table = TileTable::from_json(
            r#"[{"id": 256, "vector": {"fill": "2e7d32", "follow_slope": true, "slope_fill": "1b5e20"}}]"#,
        )
        .expect("valid catalog");
        let style = table.tile(256).and_then(|t| t.vector.as_ref()).expect("style");
        assert!(style.follow_slope);
        assert_eq!(style.slope_fill.as_deref(), Some("1b5e20"));
        assert_eq!(style.stroke, None);
    }

    #[test]
    fn malformed_catalog_is_a_manifest_error() {
        let err = TileTable::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::sc2k::Sc2kError::Manifest(_)));
    }
}
