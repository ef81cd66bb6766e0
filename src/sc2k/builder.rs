//! Assembles decoded segments into a [`City`].
//!
//! [`CityBuilder`] is a value threaded through one decode step per segment.
//! Segments are independent, so the order they are applied in does not matter;
//! only [`CityBuilder::finish`] checks that the model is viewable.

use log::{debug, info};

use crate::sc2k::city::{City, ImportReport};
use crate::sc2k::format::container::{SegmentTag, Segments};
use crate::sc2k::format::fields::{self, Decoded, MiscFields, StructureId, TerrainCell, ZoneCell};
use crate::sc2k::types::error::{FormatError, ImportError, Result};
use crate::sc2k::types::models::*;
use crate::sc2k::utils;

/// Segments that feed the model, in the order they are applied.
const DECODED_TAGS: [SegmentTag; 9] = [
    SegmentTag::Xter,
    SegmentTag::Altm,
    SegmentTag::Xzon,
    SegmentTag::Xbld,
    SegmentTag::Xund,
    SegmentTag::Xbit,
    SegmentTag::Misc,
    SegmentTag::Cnam,
    SegmentTag::Xlab,
];

#[derive(Debug, Default)]
pub struct CityBuilder {
    terrain: Option<Vec<TerrainCell>>,
    altitude: Option<Vec<Altitude>>,
    zones: Option<Vec<ZoneCell>>,
    structures: Option<Vec<StructureId>>,
    underground: Option<Vec<Underground>>,
    bits: Option<Vec<CellFlags>>,
    misc: Option<MiscFields>,
    name: Option<String>,
    labels: Vec<String>,
    report: ImportReport,
}

impl CityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a city from every segment in a parsed container.
    pub fn from_segments(segments: &Segments) -> Result<City> {
        let mut builder = CityBuilder::new();
        builder.report.segment_count = segments.segment_count;
        builder.report.unknown_tags = segments.unknown_tags();

        for tag in DECODED_TAGS {
            if let Some(payload) = segments.get(tag) {
                builder = builder.with_segment(tag, payload)?;
            }
        }
        builder.finish()
    }

    /// Decodes one segment into the builder.
    ///
    /// Unknown tags are ignored. Out-of-range cell values are kept in the import report.
    pub fn with_segment(mut self, tag: SegmentTag, payload: &[u8]) -> std::result::Result<Self, FormatError> {
        match tag {
            SegmentTag::Xter => self.terrain = Some(self.collect(fields::decode_terrain(payload)?)),
            SegmentTag::Altm => self.altitude = Some(self.collect(fields::decode_altitude(payload)?)),
            SegmentTag::Xzon => self.zones = Some(self.collect(fields::decode_zones(payload)?)),
            SegmentTag::Xbld => self.structures = Some(self.collect(fields::decode_buildings(payload)?)),
            SegmentTag::Xund => self.underground = Some(self.collect(fields::decode_underground(payload)?)),
            SegmentTag::Xbit => self.bits = Some(self.collect(fields::decode_bits(payload)?)),
            SegmentTag::Misc => self.misc = Some(fields::decode_misc(payload)?),
            SegmentTag::Cnam => self.name = Some(fields::decode_city_name(payload)),
            SegmentTag::Xlab => self.labels = fields::decode_labels(payload)?,
            SegmentTag::Unknown(_) => debug!("Ignoring segment {}", tag),
        }
        Ok(self)
    }

    fn collect<T>(&mut self, decoded: Decoded<T>) -> Vec<T> {
        self.report.range_errors.extend(decoded.range_errors);
        decoded.cells
    }

    /// Produces the city grid and metadata.
    ///
    /// # Errors
    /// - [`ImportError::MissingRequiredSegment`] if no terrain segment was supplied.
    pub fn finish(self) -> Result<City> {
        let terrain = self
            .terrain
            .ok_or(ImportError::MissingRequiredSegment(SegmentTag::Xter.name()))?;

        let cells: Vec<MapCell> = terrain
            .iter()
            .enumerate()
            .map(|(index, ground)| {
                let (x, y) = utils::cell_position(index);
                let altitude = pick(&self.altitude, index);
                let zone = pick(&self.zones, index);
                let bits = pick(&self.bits, index);

                let (building_tile_id, network_tile_id) = match pick(&self.structures, index) {
                    StructureId::Empty => (None, None),
                    StructureId::Building(id) => (Some(id), None),
                    StructureId::Network(id) => (None, Some(id)),
                };

                MapCell {
                    x,
                    y,
                    z: altitude.elevation,
                    terrain_tile_id: ground.tile_id,
                    building_tile_id,
                    zone_tile_id: zone.zone.tile_id(),
                    network_tile_id,
                    slope: ground.slope,
                    water_level: ground.water,
                    zone: zone.zone,
                    building_corners: zone.corners,
                    rotate_flag: bits.contains(CellFlags::ROTATE),
                    flags: bits.difference(CellFlags::ROTATE),
                    underground: pick(&self.underground, index),
                    water_flag: altitude.water_flag,
                    tunnel_level: altitude.tunnel_level,
                }
            })
            .collect();

        let misc = self.misc.unwrap_or_default();
        let metadata = CityMetadata {
            name: self.name.unwrap_or_default(),
            year_founded: misc.year_founded,
            days_elapsed: misc.days_elapsed,
            treasury: misc.treasury,
            population: misc.population,
            rotation: self.misc.map(|m| m.rotation),
            water_level: misc.water_level,
            zoom: misc.zoom,
            center: misc.center,
        };

        info!(
            "Built city '{}': {} cells, rotation baseline {:?}, {} out-of-range values",
            metadata.name,
            cells.len(),
            metadata.rotation.map(Rotation::value),
            self.report.range_errors.len()
        );

        Ok(City::new(cells, metadata, self.labels, self.report))
    }
}

/// The decoded value for a cell, or the "no data" default when the segment is absent.
fn pick<T: Copy + Default>(layer: &Option<Vec<T>>, index: usize) -> T {
    layer
        .as_ref()
        .and_then(|cells| cells.get(index).copied())
        .unwrap_or_default()
}
