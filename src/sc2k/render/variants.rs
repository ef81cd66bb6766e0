//! Sprite variant resolution: rotation table, mirroring, and alternate flip tiles.
//!
//! The decision is split in two. [`choose_variant`] is a pure function over a
//! small set of booleans and the map rotation, returning which rotation slot
//! to use, whether to take the base or the alternate tile, and whether to
//! mirror. [`resolve`] looks the chosen slot up in the tile catalog.

use log::trace;

use crate::sc2k::types::models::Rotation;
use crate::sc2k::types::tiles::{TileCatalog, TileDefinition};

/// Mirrored variants only exist for building-segment sprites; terrain and zone
/// sprites (256 and up) are never flipped.
pub const FLIP_MAX_TILE_ID: u16 = 255;

/// Everything the variant decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantQuery {
    pub rotation: Rotation,
    /// The sprite is at or below [`FLIP_MAX_TILE_ID`] and marked `flip_h`.
    pub flip_capable: bool,
    /// The sprite names a `flip_alt_tile`.
    pub has_alt_tile: bool,
    /// A city rotation baseline has been read.
    pub rotation_known: bool,
    /// The cell's own `rotate_flag`.
    pub cell_flag: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteSource {
    Base,
    Alternate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantChoice {
    /// Rotation-table slot, `0..4`.
    pub slot: usize,
    pub source: SpriteSource,
    /// Draw the horizontally mirrored atlas entry.
    pub mirrored: bool,
}

/// A concrete sprite to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSprite {
    pub sprite_id: u16,
    pub flipped: bool,
}

/// Decides the variant for one cell.
///
/// - No flip decision is made for sprites that cannot flip or before a rotation baseline is known.
/// - Rotations {0, 2} and {1, 3} form two parity groups; the odd group flips, and the cell's
///   `rotate_flag` toggles that outcome.
/// - When an alternate tile exists, the rotation slot advances by one (3 wraps to 0), and a flip
///   selects the alternate tile instead of mirroring the base sprite.
pub fn choose_variant(query: VariantQuery) -> VariantChoice {
    let slot = query.rotation.index();
    let eligible = query.flip_capable && query.rotation_known;
    if !eligible {
        return VariantChoice { slot, source: SpriteSource::Base, mirrored: false };
    }

    let flip = query.rotation.is_odd() != query.cell_flag;
    if query.has_alt_tile {
        let source = if flip { SpriteSource::Alternate } else { SpriteSource::Base };
        VariantChoice { slot: (slot + 1) % 4, source, mirrored: false }
    } else {
        VariantChoice { slot, source: SpriteSource::Base, mirrored: flip }
    }
}

pub fn is_flip_capable(tile: &TileDefinition) -> bool {
    tile.id <= FLIP_MAX_TILE_ID && tile.flip_h
}

/// Resolves a base sprite id to the sprite to draw at the given map rotation.
///
/// Sprites missing from the catalog resolve to themselves, unflipped.
pub fn resolve(
    catalog: &impl TileCatalog,
    sprite_id: u16,
    rotation: Rotation,
    cell_flag: bool,
    rotation_known: bool,
) -> ResolvedSprite {
    let Some(tile) = catalog.tile(sprite_id) else {
        return ResolvedSprite { sprite_id, flipped: false };
    };

    let choice = choose_variant(VariantQuery {
        rotation,
        flip_capable: is_flip_capable(tile),
        has_alt_tile: tile.flip_alt_tile.is_some(),
        rotation_known,
        cell_flag,
    });

    let resolved_id = match (choice.source, tile.flip_alt_tile) {
        (SpriteSource::Alternate, Some(alt)) => catalog
            .tile(alt)
            .map_or(alt, |alt_tile| alt_tile.sprite_for_slot(choice.slot)),
        _ => tile.sprite_for_slot(choice.slot),
    };
    trace!("Sprite {} at rotation {} -> {:?} ({})", sprite_id, rotation, choice, resolved_id);

    ResolvedSprite { sprite_id: resolved_id, flipped: choice.mirrored }
}
