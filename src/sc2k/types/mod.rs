//! Foundational data structures, error types, and tile metadata.

pub mod error;
pub mod models;
pub mod tiles;
