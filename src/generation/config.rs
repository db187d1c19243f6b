//! World configuration consumed at construction time.

use std::path::Path;

use glam::UVec3;
use serde::{Deserialize, Serialize};

use super::bands::ElevationBands;
use crate::core::{Error, Result};
use crate::terrain::generator::TerrainParams;
use crate::voxel::voxel::IdRanges;

/// Configuration for a voxel world and its generation pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Random seed for terrain noise and band blending.
    pub seed: u32,
    /// Chunks along X and along Z.
    pub world_size_xz: u32,
    /// Chunks along Y.
    pub world_size_y: u32,
    /// Voxels per chunk side.
    pub chunk_size: u32,
    /// Terrain noise parameters.
    pub terrain: TerrainParams,
    /// Elevation band classification table.
    pub bands: ElevationBands,
    /// Voxel id ranges (solid, light, glass).
    pub ids: IdRanges,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            world_size_xz: 4,
            world_size_y: 2,
            chunk_size: 16,
            terrain: TerrainParams::default(),
            bands: ElevationBands::default(),
            ids: IdRanges::default(),
        }
    }
}

impl WorldConfig {
    /// Default configuration with a given seed and extent.
    pub fn with_extent(seed: u32, world_size_xz: u32, world_size_y: u32, chunk_size: u32) -> Self {
        Self {
            seed,
            world_size_xz,
            world_size_y,
            chunk_size,
            ..Default::default()
        }
    }

    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of chunks along each axis
    pub fn chunk_dims(&self) -> UVec3 {
        UVec3::new(self.world_size_xz, self.world_size_y, self.world_size_xz)
    }

    /// Voxel columns per side of the height map
    pub fn height_map_size(&self) -> usize {
        self.world_size_xz as usize * self.chunk_size as usize
    }

    /// Total world height in voxels
    pub fn world_height(&self) -> u32 {
        self.world_size_y * self.chunk_size
    }

    /// Reject malformed configurations before any storage is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be positive".into()));
        }
        if self.world_size_xz == 0 || self.world_size_y == 0 {
            return Err(Error::InvalidConfig(format!(
                "world extent must be positive, got {}x{}x{} chunks",
                self.world_size_xz, self.world_size_y, self.world_size_xz
            )));
        }

        // Voxel coordinates are i32 and storage is a single Vec.
        let xz = self.world_size_xz as u64 * self.chunk_size as u64;
        let y = self.world_size_y as u64 * self.chunk_size as u64;
        if xz > i32::MAX as u64 || y > i32::MAX as u64 {
            return Err(Error::InvalidConfig("world extent overflows voxel coordinates".into()));
        }
        let total = xz
            .checked_mul(xz)
            .and_then(|v| v.checked_mul(y))
            .filter(|&v| v <= isize::MAX as u64);
        if total.is_none() {
            return Err(Error::InvalidConfig("world voxel count overflows memory".into()));
        }

        if !self.ids.is_well_formed() {
            return Err(Error::InvalidConfig(format!("malformed id ranges {:?}", self.ids)));
        }

        if self.terrain.octaves == 0 {
            return Err(Error::InvalidConfig("terrain needs at least one octave".into()));
        }
        if !(self.terrain.base_frequency.is_finite() && self.terrain.base_frequency > 0.0) {
            return Err(Error::InvalidConfig("terrain base_frequency must be positive".into()));
        }
        if !self.terrain.fudge.is_finite() || !self.terrain.redistribution.is_finite() {
            return Err(Error::InvalidConfig("terrain fudge/redistribution must be finite".into()));
        }

        self.bands.validate(&self.ids)
    }
}
