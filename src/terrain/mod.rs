//! Procedural terrain elevation

pub mod generator;
pub use generator::{HeightMap, TerrainNoiseGenerator, TerrainParams};
