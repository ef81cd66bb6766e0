//! Layered drawing of a city onto an abstract surface.
//!
//! Cells are visited back to front. Each cell draws its terrain, zone, network
//! and building layers in that order; a building is only drawn from its key tile.

use log::{debug, trace};

use crate::sc2k::city::City;
use crate::sc2k::render::atlas::{AtlasKey, AtlasRect, SpriteAtlas};
use crate::sc2k::render::projector::{self, Point, TilePolygon, ViewConfig};
use crate::sc2k::render::variants;
use crate::sc2k::types::models::{MapCell, Slope, GRID_SIZE};
use crate::sc2k::types::tiles::{TileCatalog, VectorStyle};

/// Color used for the placeholder outline while the atlas loads.
const PLACEHOLDER_COLOR: &str = "808080";

/// The drawing primitives the pipeline needs from the host canvas.
pub trait Surface {
    /// Copies a source rectangle from an atlas page to a destination point.
    fn draw_sprite(&mut self, source: &AtlasRect, dest: Point);
    /// Fills (and optionally strokes) a closed polygon.
    fn fill_polygon(&mut self, points: &[Point], fill: &str, stroke: Option<&str>);
    fn stroke_line(&mut self, from: Point, to: Point, color: &str);
}

/// Per-frame drawing counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub sprites: usize,
    pub polygons: usize,
    /// Sprites with no manifest entry.
    pub missing: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The atlas is still loading; only the placeholder was drawn.
    Placeholder,
    Drawn(FrameStats),
}

/// Draws one frame of the city.
///
/// `tick` selects the animation frame of animated sprites.
pub fn render_city(
    city: &City,
    catalog: &impl TileCatalog,
    atlas: &SpriteAtlas,
    view: &ViewConfig,
    surface: &mut impl Surface,
    tick: u32,
) -> FrameOutcome {
    if !atlas.is_ready() {
        draw_placeholder(view, surface);
        return FrameOutcome::Placeholder;
    }

    let rotation = city.map_rotation();
    let mut painter = Painter {
        city,
        catalog,
        atlas,
        surface,
        tick,
        layer_offset: view.layer_offset,
        stats: FrameStats::default(),
    };

    for (x, y) in projector::painter_order() {
        let Some(cell) = city.cell(x, y) else { continue };
        let polygon = projector::project_cell(cell, view);

        painter.draw_layer(cell, &polygon, Some(cell.terrain_tile_id));
        painter.draw_layer(cell, &polygon, cell.zone_tile_id);
        painter.draw_layer(cell, &polygon, cell.network_tile_id);
        if cell.is_key_tile(rotation) {
            painter.draw_layer(cell, &polygon, cell.building_tile_id);
        }
    }

    let stats = painter.stats;
    debug!(
        "Frame drawn at rotation {}: {} sprites, {} polygons, {} missing",
        rotation, stats.sprites, stats.polygons, stats.missing
    );
    FrameOutcome::Drawn(stats)
}

/// Outlines the map boundary so the host has something to show while loading.
fn draw_placeholder(view: &ViewConfig, surface: &mut impl Surface) {
    let last = (GRID_SIZE - 1) as u8;
    let corners = [
        projector::project(0, 0, 0, view).left,
        projector::project(last, 0, 0, view).top,
        projector::project(last, last, 0, view).right,
        projector::project(0, last, 0, view).bottom,
    ];
    for (i, from) in corners.iter().enumerate() {
        surface.stroke_line(*from, corners[(i + 1) % corners.len()], PLACEHOLDER_COLOR);
    }
}

struct Painter<'a, C: TileCatalog, S: Surface> {
    city: &'a City,
    catalog: &'a C,
    atlas: &'a SpriteAtlas,
    surface: &'a mut S,
    tick: u32,
    layer_offset: f32,
    stats: FrameStats,
}

impl<C: TileCatalog, S: Surface> Painter<'_, C, S> {
    fn draw_layer(&mut self, cell: &MapCell, polygon: &TilePolygon, sprite_id: Option<u16>) {
        let Some(sprite_id) = sprite_id else { return };

        let catalog = self.catalog;
        let tile = catalog.tile(sprite_id);
        if let Some(style) = tile.and_then(|t| t.vector.as_ref()) {
            self.draw_vector(cell, polygon, sprite_id, style);
            return;
        }

        let resolved = variants::resolve(
            catalog,
            sprite_id,
            self.city.map_rotation(),
            cell.rotate_flag,
            self.city.rotation_known(),
        );
        let frames = tile.map_or(1, |t| t.frames.max(1));
        let frame = (self.tick % frames as u32) as u8;
        let key = AtlasKey::sprite(resolved.sprite_id, frame, resolved.flipped);

        match self.atlas.lookup(key) {
            Some(rect) => {
                // Anchor the sprite's bottom centre on the tile's bottom vertex.
                let dest = Point::new(
                    polygon.center.x - rect.width as f32 / 2.0,
                    polygon.bottom.y - rect.height as f32,
                );
                self.surface.draw_sprite(rect, dest);
                self.stats.sprites += 1;
            }
            None => {
                trace!("No atlas entry for {} at ({}, {})", key, cell.x, cell.y);
                self.stats.missing += 1;
            }
        }
    }

    fn draw_vector(&mut self, cell: &MapCell, polygon: &TilePolygon, sprite_id: u16, style: &VectorStyle) {
        let stroke = style.stroke.as_deref();
        if cell.z > 1 {
            self.surface.fill_polygon(&polygon.face(), &style.fill, stroke);
            self.stats.polygons += 1;
            self.draw_overlay(AtlasKey::VectorWall { id: sprite_id, elevation: cell.z }, polygon);
        }

        let sloped = style.follow_slope && cell.slope != Slope::Flat;
        if sloped {
            let fill = style.slope_fill.as_deref().unwrap_or(&style.fill);
            let top = polygon.sloped_diamond(cell.slope, self.layer_offset);
            self.surface.fill_polygon(&top, fill, stroke);
        } else {
            self.surface.fill_polygon(&polygon.diamond(), &style.fill, stroke);
        }
        self.stats.polygons += 1;
        if cell.z > 0 {
            self.draw_overlay(AtlasKey::VectorTop { id: sprite_id, elevation: cell.z }, polygon);
        }
    }

    /// Height-map overlays are optional; a missing entry is not counted.
    fn draw_overlay(&mut self, key: AtlasKey, polygon: &TilePolygon) {
        if let Some(rect) = self.atlas.lookup(key) {
            self.surface.draw_sprite(rect, polygon.left);
            self.stats.sprites += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sc2k::builder::CityBuilder;
    use crate::sc2k::format::container::SegmentTag;
    use crate::sc2k::render::atlas::AtlasManifest;
    use crate::sc2k::types::models::CELL_COUNT;
    use crate::sc2k::types::tiles::TileTable;
    use crate::sc2k::utils;

    #[derive(Default)]
    struct Recorder {
        sprites: Vec<(AtlasRect, Point)>,
        polygons: usize,
        fills: Vec<(Vec<Point>, String)>,
        lines: usize,
    }

    impl Surface for Recorder {
        fn draw_sprite(&mut self, source: &AtlasRect, dest: Point) {
            self.sprites.push((*source, dest));
        }
        fn fill_polygon(&mut self, points: &[Point], fill: &str, _stroke: Option<&str>) {
            self.polygons += 1;
            self.fills.push((points.to_vec(), fill.to_string()));
        }
        fn stroke_line(&mut self, _from: Point, _to: Point, _color: &str) {
            self.lines += 1;
        }
    }

    fn atlas(loaded: bool) -> SpriteAtlas {
        let manifest = AtlasManifest::from_json(
            r#"{
                "256_0": {"page": 0, "x": 0, "y": 0, "width": 64, "height": 32},
                "150_0": {"page": 0, "x": 64, "y": 0, "width": 64, "height": 80}
            }"#,
        )
        .unwrap();
        let mut atlas = SpriteAtlas::new(manifest);
        if loaded {
            atlas.mark_page_loaded(0);
        }
        atlas
    }

    fn city_with_building() -> City {
        let mut zones = vec![0u8; CELL_COUNT];
        let mut buildings = vec![0u8; CELL_COUNT];
        // A 2x2 building: only the cell with the rotation-0 corner bit is the key tile.
        for (x, y, corners) in [(10, 10, 0b1000), (10, 11, 0b0100), (11, 10, 0b0001), (11, 11, 0b0010)] {
            zones[utils::cell_index(x, y)] = corners << 4;
            buildings[utils::cell_index(x, y)] = 150;
        }
        CityBuilder::new()
            .with_segment(SegmentTag::Xter, &vec![0u8; CELL_COUNT])
            .and_then(|b| b.with_segment(SegmentTag::Xzon, &zones))
            .and_then(|b| b.with_segment(SegmentTag::Xbld, &buildings))
            .unwrap()
            .finish()
            .unwrap()
    }

    #[test]
    fn loading_atlas_draws_placeholder_only() {
        let mut surface = Recorder::default();
        let outcome = render_city(
            &city_with_building(),
            &TileTable::new(),
            &atlas(false),
            &ViewConfig::default(),
            &mut surface,
            0,
        );
        assert_eq!(outcome, FrameOutcome::Placeholder);
        assert_eq!(surface.lines, 4);
        assert!(surface.sprites.is_empty());
    }

    #[test]
    fn buildings_draw_once_from_their_key_tile() {
        let mut surface = Recorder::default();
        let outcome = render_city(
            &city_with_building(),
            &TileTable::new(),
            &atlas(true),
            &ViewConfig::default(),
            &mut surface,
            0,
        );
        let FrameOutcome::Drawn(stats) = outcome else {
            panic!("atlas was ready");
        };
        assert_eq!(stats.sprites, CELL_COUNT + 1);
        assert_eq!(stats.missing, 0);
        assert_eq!(surface.sprites.iter().filter(|(rect, _)| rect.height == 80).count(), 1);
    }

    #[test]
    fn vector_tiles_fill_polygons() {
        let catalog = TileTable::from_json(r#"[{"id": 256, "vector": {"fill": "2e7d32"}}]"#).unwrap();
        let mut surface = Recorder::default();
        let outcome = render_city(
            &city_with_building(),
            &catalog,
            &atlas(true),
            &ViewConfig::default(),
            &mut surface,
            0,
        );
        let FrameOutcome::Drawn(stats) = outcome else {
            panic!("atlas was ready");
        };
        assert_eq!(stats.polygons, CELL_COUNT);
        assert_eq!(surface.polygons, CELL_COUNT);
        assert_eq!(stats.sprites, 1);
    }

    #[test]
    fn sloped_vector_terrain_lifts_its_corners() {
        let mut terrain = vec![0u8; CELL_COUNT];
        terrain[utils::cell_index(20, 30)] = 0x01;
        let city = CityBuilder::new()
            .with_segment(SegmentTag::Xter, &terrain)
            .unwrap()
            .finish()
            .unwrap();
        let catalog = TileTable::from_json(
            r#"[
                {"id": 256, "vector": {"fill": "2e7d32", "follow_slope": true}},
                {"id": 257, "vector": {"fill": "2e7d32", "follow_slope": true, "slope_fill": "1b5e20"}}
            ]"#,
        )
        .unwrap();
        let view = ViewConfig::default();
        let mut surface = Recorder::default();

        render_city(&city, &catalog, &atlas(true), &view, &mut surface, 0);

        let sloped: Vec<_> = surface.fills.iter().filter(|(_, fill)| fill == "1b5e20").collect();
        assert_eq!(sloped.len(), 1);
        let cell = city.cell(20, 30).unwrap();
        let expected = projector::project_cell(cell, &view).sloped_diamond(Slope::North, view.layer_offset);
        assert_eq!(sloped[0].0, expected.to_vec());
        assert_eq!(surface.fills.len(), CELL_COUNT);
    }
}
