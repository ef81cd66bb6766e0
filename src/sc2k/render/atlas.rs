//! Sprite atlas manifest and page-load tracking.
//!
//! The manifest maps string keys to source rectangles on one of a fixed number
//! of atlas pages. Pages are loaded asynchronously by the host; nothing may be
//! drawn from the atlas until [`SpriteAtlas::is_ready`] reports every page loaded.

use std::collections::HashMap;
use std::fmt;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::sc2k::types::error::Result;

/// A source rectangle within one atlas page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AtlasRect {
    pub page: u8,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Manifest keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtlasKey {
    /// `{id}_{frame}`
    Frame { id: u16, frame: u8 },
    /// `{id}_{frame}_H`, the horizontally mirrored frame.
    Flipped { id: u16, frame: u8 },
    /// `{id}_VT_{elevation}`, height-map top overlay of a vector tile.
    VectorTop { id: u16, elevation: u8 },
    /// `{id}_VW_{elevation}`, height-map wall overlay of a vector tile.
    VectorWall { id: u16, elevation: u8 },
}

impl AtlasKey {
    pub fn sprite(id: u16, frame: u8, flipped: bool) -> Self {
        if flipped {
            AtlasKey::Flipped { id, frame }
        } else {
            AtlasKey::Frame { id, frame }
        }
    }
}

impl fmt::Display for AtlasKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AtlasKey::Frame { id, frame } => write!(f, "{}_{}", id, frame),
            AtlasKey::Flipped { id, frame } => write!(f, "{}_{}_H", id, frame),
            AtlasKey::VectorTop { id, elevation } => write!(f, "{}_VT_{}", id, elevation),
            AtlasKey::VectorWall { id, elevation } => write!(f, "{}_VW_{}", id, elevation),
        }
    }
}

/// The parsed manifest: key string to source rectangle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AtlasManifest {
    entries: HashMap<String, AtlasRect>,
}

impl AtlasManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: AtlasManifest = serde_json::from_str(json)?;
        debug!("Parsed atlas manifest with {} entries", manifest.entries.len());
        Ok(manifest)
    }

    pub fn get(&self, key: AtlasKey) -> Option<&AtlasRect> {
        self.entries.get(&key.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pages referenced by the manifest (highest page index plus one).
    pub fn page_count(&self) -> usize {
        self.entries
            .values()
            .map(|rect| rect.page as usize + 1)
            .max()
            .unwrap_or(0)
    }
}

/// The manifest plus the load state of each page.
#[derive(Debug, Clone)]
pub struct SpriteAtlas {
    manifest: AtlasManifest,
    loaded: Vec<bool>,
}

impl SpriteAtlas {
    pub fn new(manifest: AtlasManifest) -> Self {
        let pages = manifest.page_count();
        info!("Sprite atlas: {} entries across {} pages", manifest.len(), pages);
        Self {
            manifest,
            loaded: vec![false; pages],
        }
    }

    /// Records that the host finished loading a page.
    pub fn mark_page_loaded(&mut self, page: usize) {
        match self.loaded.get_mut(page) {
            Some(slot) => {
                *slot = true;
                debug!("Atlas page {} loaded ({}/{})", page, self.pages_loaded(), self.loaded.len());
            }
            None => warn!("Atlas page {} is not referenced by the manifest", page),
        }
    }

    pub fn pages_loaded(&self) -> usize {
        self.loaded.iter().filter(|&&loaded| loaded).count()
    }

    /// True once every page is loaded. Draw calls must check this first.
    pub fn is_ready(&self) -> bool {
        self.loaded.iter().all(|&loaded| loaded)
    }

    /// The source rectangle for a key, only once the atlas is ready.
    pub fn lookup(&self, key: AtlasKey) -> Option<&AtlasRect> {
        if !self.is_ready() {
            return None;
        }
        self.manifest.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "256_0": {"page": 0, "x": 0, "y": 0, "width": 64, "height": 32},
        "140_1_H": {"page": 1, "x": 64, "y": 0, "width": 128, "height": 96},
        "300_VT_4": {"page": 2, "x": 0, "y": 32, "width": 64, "height": 44}
    }"#;

    #[test]
    fn keys_format_like_the_manifest() {
        assert_eq!(AtlasKey::sprite(256, 0, false).to_string(), "256_0");
        assert_eq!(AtlasKey::sprite(140, 1, true).to_string(), "140_1_H");
        assert_eq!(AtlasKey::VectorTop { id: 300, elevation: 4 }.to_string(), "300_VT_4");
        assert_eq!(AtlasKey::VectorWall { id: 300, elevation: 2 }.to_string(), "300_VW_2");
    }

    #[test]
    fn manifest_parses_rectangles() {
        let manifest = AtlasManifest::from_json(MANIFEST).unwrap();
        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest.page_count(), 3);
        let rect = manifest.get(AtlasKey::sprite(140, 1, true)).unwrap();
        assert_eq!((rect.page, rect.x, rect.width, rect.height), (1, 64, 128, 96));
        assert!(manifest.get(AtlasKey::sprite(140, 1, false)).is_none());
    }

    #[test]
    fn atlas_is_not_ready_until_every_page_loads() {
        let mut atlas = SpriteAtlas::new(AtlasManifest::from_json(MANIFEST).unwrap());
        assert!(!atlas.is_ready());
        assert!(atlas.lookup(AtlasKey::sprite(256, 0, false)).is_none());

        atlas.mark_page_loaded(0);
        atlas.mark_page_loaded(2);
        atlas.mark_page_loaded(9);
        assert!(!atlas.is_ready());
        assert_eq!(atlas.pages_loaded(), 2);

        atlas.mark_page_loaded(1);
        assert!(atlas.is_ready());
        assert!(atlas.lookup(AtlasKey::sprite(256, 0, false)).is_some());
    }
}
