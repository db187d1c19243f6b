//! Noise-based elevation field
//!
//! Elevation is a normalized sum of Perlin octaves (amplitude `0.5^i`,
//! frequency `base_frequency * 2^i`), each sample remapped from [-1, 1] into
//! [0, 1], followed by `(e * fudge)^redistribution` to sharpen plateaus and
//! valleys. The result is a pure function of coordinates and seed.

use noise::{NoiseFn, Perlin};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Parameters controlling the elevation field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    pub octaves: u32,        // Number of summed noise layers
    pub base_frequency: f64, // Frequency of the first octave
    pub fudge: f64,          // Multiplier applied before redistribution
    pub redistribution: f64, // Exponent (>1 flattens lowlands, steepens peaks)
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            octaves: 15,
            base_frequency: 3.0,
            fudge: 1.2,
            redistribution: 2.2,
        }
    }
}

/// Seeded elevation generator.
///
/// Owns its noise source; nothing is shared through global state.
pub struct TerrainNoiseGenerator {
    seed: u32,
    params: TerrainParams,
    noise: Perlin,
}

impl TerrainNoiseGenerator {
    /// Create a new generator with the given seed and parameters
    pub fn new(seed: u32, params: TerrainParams) -> Self {
        Self {
            seed,
            params,
            noise: Perlin::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Elevation in [0, 1] at normalized coordinates `(nx, nz)`.
    pub fn elevation(&self, nx: f64, nz: f64) -> f32 {
        let mut sum = 0.0;
        let mut amplitude_sum = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.params.base_frequency;

        for _ in 0..self.params.octaves {
            let sample = self.noise.get([nx * frequency, nz * frequency]);
            sum += amplitude * shift(sample);
            amplitude_sum += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        if amplitude_sum == 0.0 {
            return 0.0;
        }
        let normalized = sum / amplitude_sum;
        let redistributed = (normalized * self.params.fudge).powf(self.params.redistribution);
        // Redistribution can overshoot 1 for high plateaus
        redistributed.clamp(0.0, 1.0) as f32
    }

    /// Evaluate the elevation field for a `size` x `size` grid of world columns.
    ///
    /// Column `i` is sampled at `i / (size - 1)`; a 1-column map samples 0.
    pub fn generate_height_map(&self, size: usize) -> HeightMap {
        let mut values = vec![0.0f32; size * size];
        if size == 0 {
            return HeightMap { size, values };
        }

        values
            .par_chunks_mut(size)
            .enumerate()
            .for_each(|(z, row)| {
                let nz = normalize(z, size);
                for (x, value) in row.iter_mut().enumerate() {
                    *value = self.elevation(normalize(x, size), nz);
                }
            });

        HeightMap { size, values }
    }
}

/// Remap a noise sample from [-1, 1] into [0, 1]
fn shift(value: f64) -> f64 {
    ((value + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Column index to [0, 1]
fn normalize(position: usize, size: usize) -> f64 {
    if size <= 1 {
        0.0
    } else {
        position as f64 / (size - 1) as f64
    }
}

/// 2D elevation field, one value in [0, 1] per (x, z) world column
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
    size: usize,
    values: Vec<f32>,
}

impl HeightMap {
    /// Build from raw row-major (z-major) values; `None` if the length mismatches.
    pub fn from_values(size: usize, values: Vec<f32>) -> Option<Self> {
        (values.len() == size * size).then_some(Self { size, values })
    }

    /// Columns per side
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, x: usize, z: usize) -> Option<f32> {
        if x >= self.size || z >= self.size {
            return None;
        }
        Some(self.values[z * self.size + x])
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Highest elevation and the column it occurs at
    pub fn peak(&self) -> Option<(usize, usize, f32)> {
        self.values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, h)| (i % self.size, i / self.size, *h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_params_default() {
        let params = TerrainParams::default();
        assert_eq!(params.octaves, 15);
        assert_eq!(params.base_frequency, 3.0);
        assert_eq!(params.fudge, 1.2);
        assert_eq!(params.redistribution, 2.2);
    }

    #[test]
    fn test_empty_map() {
        let generator = TerrainNoiseGenerator::new(1, TerrainParams::default());
        let map = generator.generate_height_map(0);
        assert!(map.is_empty());
        assert_eq!(map.size(), 0);
        assert_eq!(map.get(0, 0), None);
        assert_eq!(map.peak(), None);
    }

    #[test]
    fn test_single_column_map() {
        let generator = TerrainNoiseGenerator::new(1, TerrainParams::default());
        let map = generator.generate_height_map(1);
        assert_eq!(map.values().len(), 1);
        assert_eq!(map.get(0, 0), Some(generator.elevation(0.0, 0.0)));
    }

    #[test]
    fn test_values_in_unit_range() {
        let generator = TerrainNoiseGenerator::new(12345, TerrainParams::default());
        let map = generator.generate_height_map(32);
        assert_eq!(map.values().len(), 32 * 32);
        for &h in map.values() {
            assert!((0.0..=1.0).contains(&h), "elevation {} out of range", h);
        }
    }

    #[test]
    fn test_height_map_deterministic() {
        let a = TerrainNoiseGenerator::new(7, TerrainParams::default()).generate_height_map(24);
        let b = TerrainNoiseGenerator::new(7, TerrainParams::default()).generate_height_map(24);
        assert_eq!(a, b);
        let bits_a: Vec<u32> = a.values().iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u32> = b.values().iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = TerrainNoiseGenerator::new(1, TerrainParams::default()).generate_height_map(16);
        let b = TerrainNoiseGenerator::new(2, TerrainParams::default()).generate_height_map(16);
        assert_ne!(a, b);
    }

    #[test]
    fn test_map_matches_point_evaluation() {
        let generator = TerrainNoiseGenerator::new(99, TerrainParams::default());
        let map = generator.generate_height_map(9);
        assert_eq!(map.get(4, 2), Some(generator.elevation(0.5, 0.25)));
        assert_eq!(map.get(8, 8), Some(generator.elevation(1.0, 1.0)));
    }

    #[test]
    fn test_zero_octaves_is_flat_zero() {
        let params = TerrainParams { octaves: 0, ..Default::default() };
        let generator = TerrainNoiseGenerator::new(3, params);
        assert_eq!(generator.elevation(0.3, 0.7), 0.0);
    }

    #[test]
    fn test_peak() {
        let map = HeightMap::from_values(2, vec![0.1, 0.9, 0.3, 0.2]).unwrap();
        assert_eq!(map.peak(), Some((1, 0, 0.9)));
        assert!(HeightMap::from_values(2, vec![0.0; 3]).is_none());
    }
}
