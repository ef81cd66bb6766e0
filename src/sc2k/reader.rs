use std::path::Path;

use log::{info, warn};

use super::builder::CityBuilder;
use super::city::City;
use super::format::container;
use super::types::error::Result;

/// Reads save files into [`City`] models.
///
/// Import runs synchronously to completion. A city is only returned once every
/// segment has been decoded and the model is complete.
pub struct CityReader;

impl CityReader {
    /// Read a save file from the given path.
    ///
    /// # Errors
    /// Returns an error if:
    /// - File cannot be opened
    /// - The container header or a segment is malformed
    /// - The terrain segment is missing
    pub fn open(path: impl AsRef<Path>) -> Result<City> {
        let path = path.as_ref();
        info!("Opening save file: {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Decode a save file already held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<City> {
        let segments = container::read_segments(bytes)?;
        info!(
            "Container parsed: {} segments, {} bytes",
            segments.segment_count,
            bytes.len()
        );
        CityBuilder::from_segments(&segments)
    }
}

/// The active city of a viewing session.
///
/// A new import replaces the active city wholesale, and only on success: a failed
/// import leaves the previous city in place and reports a single message.
#[derive(Debug, Default)]
pub struct Viewer {
    city: Option<City>,
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn city(&self) -> Option<&City> {
        self.city.as_ref()
    }

    pub fn city_mut(&mut self) -> Option<&mut City> {
        self.city.as_mut()
    }

    /// Imports a save file, replacing the active city if it decodes.
    ///
    /// On failure the returned message is human readable and the active city is untouched.
    pub fn import(&mut self, bytes: &[u8]) -> std::result::Result<&City, String> {
        match CityReader::from_bytes(bytes) {
            Ok(city) => Ok(self.city.insert(city)),
            Err(e) => {
                warn!("Import rejected: {}", e);
                Err(format!("Could not load this city: {}", e))
            }
        }
    }

    pub fn clear(&mut self) {
        self.city = None;
    }
}
