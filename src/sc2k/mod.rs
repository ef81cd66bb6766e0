//! Core save-file reader and isometric view engine.

pub mod builder;
pub mod city;
pub mod codec;
pub mod format;
pub mod reader;
pub mod render;
pub mod types;
mod utils;

pub use city::{City, ImportReport};
pub use reader::{CityReader, Viewer};
pub use types::error::{DecodeRangeError, FormatError, ImportError, Result, Sc2kError};
