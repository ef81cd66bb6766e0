//! Grid-to-screen projection for the isometric view.
//!
//! Projection is a pure function of the cell position, its elevation and the
//! [`ViewConfig`]. The same inputs always produce the same polygon, which hit
//! testing and redraws depend on.

use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::sc2k::city::City;
use crate::sc2k::types::error::Result;
use crate::sc2k::types::models::{MapCell, Slope, GRID_SIZE};

/// Screen geometry of the isometric view.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub tile_width: f32,
    pub tile_height: f32,
    /// Vertical screen distance of one elevation step.
    pub layer_offset: f32,
    pub origin_x: f32,
    pub origin_y: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            tile_width: 64.0,
            tile_height: 32.0,
            layer_offset: 12.0,
            origin_x: 0.0,
            origin_y: GRID_SIZE as f32 * 16.0,
        }
    }
}

impl ViewConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading view config: {}", path.display());
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// The same view shifted by a camera offset.
    pub fn panned(self, dx: f32, dy: f32) -> Self {
        Self {
            origin_x: self.origin_x + dx,
            origin_y: self.origin_y + dy,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Screen outline of one cell: the top diamond, its center, and the lower edge of the
/// vertical face that a raised tile shows below its right, bottom and left corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePolygon {
    pub top: Point,
    pub right: Point,
    pub bottom: Point,
    pub left: Point,
    pub center: Point,
    pub right_low: Point,
    pub bottom_low: Point,
    pub left_low: Point,
}

impl TilePolygon {
    /// The top diamond, clockwise from the top vertex.
    pub fn diamond(&self) -> [Point; 4] {
        [self.top, self.right, self.bottom, self.left]
    }

    /// The top diamond with the corners a slope raises lifted by `lift`.
    pub fn sloped_diamond(&self, slope: Slope, lift: f32) -> [Point; 4] {
        let raised = slope.raised_corners();
        let mut points = self.diamond();
        for (point, up) in points.iter_mut().zip(raised) {
            if up {
                point.y -= lift;
            }
        }
        points
    }

    /// The visible side faces, clockwise from the left vertex.
    pub fn face(&self) -> [Point; 6] {
        [self.left, self.bottom, self.right, self.right_low, self.bottom_low, self.left_low]
    }

    /// Whether a screen point lies inside the top diamond (edges included).
    pub fn contains(&self, point: Point) -> bool {
        let half_w = self.right.x - self.center.x;
        let half_h = self.bottom.y - self.center.y;
        if half_w <= 0.0 || half_h <= 0.0 {
            return false;
        }
        let dx = (point.x - self.center.x).abs() / half_w;
        let dy = (point.y - self.center.y).abs() / half_h;
        dx + dy <= 1.0
    }
}

/// Projects grid position `(x, y)` at elevation `z` onto the screen.
///
/// `offX = (x + y) * w/2 + originX`, `offY = (y - x) * h/2 + originY`; cells above the
/// first elevation step rise by `layer_offset * (z - 1)`.
pub fn project(x: u8, y: u8, z: u8, view: &ViewConfig) -> TilePolygon {
    let (w, h, layer) = (view.tile_width, view.tile_height, view.layer_offset);
    let off_x = (x as f32 + y as f32) * w / 2.0 + view.origin_x;
    let mut off_y = (y as f32 - x as f32) * h / 2.0 + view.origin_y;
    if z > 1 {
        off_y -= layer * (z as f32 - 1.0);
    }

    let top = Point::new(off_x + w / 2.0, off_y);
    let right = Point::new(off_x + w, off_y + h / 2.0);
    let bottom = Point::new(off_x + w / 2.0, off_y + h);
    let left = Point::new(off_x, off_y + h / 2.0);
    TilePolygon {
        top,
        right,
        bottom,
        left,
        center: Point::new(off_x + w / 2.0, off_y + h / 2.0),
        right_low: Point::new(right.x, right.y + layer),
        bottom_low: Point::new(bottom.x, bottom.y + layer),
        left_low: Point::new(left.x, left.y + layer),
    }
}

pub fn project_cell(cell: &MapCell, view: &ViewConfig) -> TilePolygon {
    project(cell.x, cell.y, cell.z, view)
}

/// Grid positions in back-to-front drawing order.
pub fn painter_order() -> impl Iterator<Item = (usize, usize)> {
    (0..GRID_SIZE)
        .rev()
        .flat_map(|x| (0..GRID_SIZE).map(move |y| (x, y)))
}

/// The top-most cell whose diamond contains a screen point.
pub fn pick_cell<'a>(city: &'a City, view: &ViewConfig, point: Point) -> Option<&'a MapCell> {
    // Front to back: the reverse of `painter_order`.
    (0..GRID_SIZE)
        .flat_map(|x| (0..GRID_SIZE).rev().map(move |y| (x, y)))
        .filter_map(|(x, y)| city.cell(x, y))
        .find(|cell| project_cell(cell, view).contains(point))
}
