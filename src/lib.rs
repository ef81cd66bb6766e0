//! # sc2k-reader
//!
//! A reader for legacy city-simulation save files (`FORM`/`SCDH` containers).
//! Decodes the tagged, run-length compressed segments into a 128x128 grid of
//! map cells plus city metadata, and provides the isometric projection,
//! sprite-variant resolution and map rotation needed to draw it.
//!
//! This is a viewer core: no simulation, and no writing save files back out.
pub mod sc2k;

// Re-export the main types for convenience
pub use sc2k::{
    City, CityReader, Viewer, Sc2kError, Result,
    types::{
        models::{CityMetadata, MapCell, Rotation, WaterLevel, Slope, ZoneType, CELL_COUNT, GRID_SIZE},
        tiles::{TileCatalog, TileDefinition, TileTable},
    },
    render::{
        projector::{ViewConfig, TilePolygon, Point},
        rotator::RotationDirection,
        atlas::{AtlasManifest, SpriteAtlas},
    },
};
