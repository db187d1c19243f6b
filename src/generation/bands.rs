//! Elevation band table used to pick a voxel id for generated terrain.
//!
//! Bands are checked in order against the voxel's normalized height. A band
//! may blend into a neighbouring id: when `height * draw` exceeds the blend
//! threshold the blend id wins, which softens the strata boundaries.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::voxel::voxel::{ids, IdRanges, VoxelId};

/// Per-voxel perturbation of a band boundary
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandBlend {
    pub threshold: f32,
    pub id: VoxelId,
}

/// One elevation band: applies to normalized heights below `upper`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElevationBand {
    pub upper: f32,
    pub id: VoxelId,
    #[serde(default)]
    pub blend: Option<BandBlend>,
}

impl ElevationBand {
    pub fn solid(upper: f32, id: VoxelId) -> Self {
        Self { upper, id, blend: None }
    }

    pub fn blended(upper: f32, id: VoxelId, threshold: f32, blend_id: VoxelId) -> Self {
        Self {
            upper,
            id,
            blend: Some(BandBlend { threshold, id: blend_id }),
        }
    }
}

/// Ordered band table plus the id used above the last band
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElevationBands {
    pub bands: Vec<ElevationBand>,
    pub top: VoxelId,
}

impl Default for ElevationBands {
    fn default() -> Self {
        Self {
            bands: vec![
                ElevationBand::solid(0.10, ids::STONE),
                ElevationBand::blended(0.15, ids::CLAY, 0.05, ids::STONE),
                ElevationBand::blended(0.25, ids::SAND, 0.12, ids::CLAY),
                ElevationBand::blended(0.55, ids::GRASS, 0.35, ids::DIRT),
                ElevationBand::blended(0.70, ids::DIRT, 0.45, ids::SNOW),
            ],
            top: ids::SNOW,
        }
    }
}

impl ElevationBands {
    /// Pick the id for normalized height `height` given a uniform draw in `[0, 1)`.
    pub fn classify(&self, height: f32, draw: f32) -> VoxelId {
        for band in &self.bands {
            if height < band.upper {
                return match band.blend {
                    Some(blend) if height * draw > blend.threshold => blend.id,
                    _ => band.id,
                };
            }
        }
        self.top
    }

    /// Every id the table can produce
    pub fn ids(&self) -> impl Iterator<Item = VoxelId> + '_ {
        self.bands
            .iter()
            .flat_map(|b| std::iter::once(b.id).chain(b.blend.map(|bl| bl.id)))
            .chain(std::iter::once(self.top))
    }

    /// Check thresholds are finite and ascending, and every id is registered.
    pub fn validate(&self, ranges: &IdRanges) -> Result<()> {
        let mut prev = f32::NEG_INFINITY;
        for (i, band) in self.bands.iter().enumerate() {
            if !band.upper.is_finite() || band.upper < prev {
                return Err(Error::InvalidConfig(format!(
                    "elevation band {} has upper bound {} (must be finite and ascending)",
                    i, band.upper
                )));
            }
            if let Some(blend) = band.blend {
                if !blend.threshold.is_finite() {
                    return Err(Error::InvalidConfig(format!(
                        "elevation band {} has a non-finite blend threshold", i
                    )));
                }
            }
            prev = band.upper;
        }
        for id in self.ids() {
            if id.is_empty() || !ranges.is_registered(id) {
                return Err(Error::UnregisteredVoxel(id.raw()));
            }
        }
        Ok(())
    }
}
