//! Fills one chunk's voxels from the height map and the band table.

use crate::core::{Error, Result};
use crate::terrain::generator::HeightMap;
use crate::voxel::brickmap::Occupancy;
use crate::voxel::chunk::ChunkCoord;
use crate::voxel::voxel::VoxelId;

use super::bands::ElevationBands;
use super::config::WorldConfig;

/// Generates chunks into caller-provided chunk-local slices.
///
/// Holds only shared references, so one generator serves every worker thread;
/// each call writes nothing but its own `out` slice.
pub struct ChunkGenerator<'a> {
    height_map: &'a HeightMap,
    bands: &'a ElevationBands,
    chunk_size: u32,
    world_height: u32,
    seed: u32,
}

impl<'a> ChunkGenerator<'a> {
    /// Validate the band table and height map against the config.
    pub fn new(config: &'a WorldConfig, height_map: &'a HeightMap, seed: u32) -> Result<Self> {
        config.bands.validate(&config.ids)?;
        if height_map.size() != config.height_map_size() {
            return Err(Error::InvalidConfig(format!(
                "height map has {} columns per side, world needs {}",
                height_map.size(),
                config.height_map_size()
            )));
        }
        Ok(Self {
            height_map,
            bands: &config.bands,
            chunk_size: config.chunk_size,
            world_height: config.world_height(),
            seed,
        })
    }

    /// Fill `out` (chunk-local, x fastest) for the chunk at `coord`.
    ///
    /// Returns `Filled` if any voxel was set non-empty.
    pub fn generate(&self, coord: ChunkCoord, out: &mut [VoxelId]) -> Occupancy {
        let cs = self.chunk_size as i32;
        debug_assert_eq!(out.len(), (self.chunk_size as usize).pow(3));
        out.fill(VoxelId::EMPTY);

        let origin = coord.voxel_origin(self.chunk_size);
        let height_denom = self.world_height.saturating_sub(1).max(1) as f32;
        let mut filled = false;

        for lz in 0..cs {
            let wz = origin.z + lz;
            for lx in 0..cs {
                let wx = origin.x + lx;
                let elevation = self
                    .height_map
                    .get(wx as usize, wz as usize)
                    .unwrap_or(0.0);
                let column_top = (elevation * self.world_height as f32).floor() as i32;
                let local_top = (column_top - origin.y).clamp(0, cs);

                for ly in 0..local_top {
                    let wy = origin.y + ly;
                    let height = wy as f32 / height_denom;
                    let id = self.bands.classify(height, uniform_draw(wx, wy, wz, self.seed));
                    let idx = (lx + cs * (ly + cs * lz)) as usize;
                    out[idx] = id;
                    filled |= !id.is_empty();
                }
            }
        }

        Occupancy::from_filled(filled)
    }

    /// World column top (exclusive) in voxels for a height map column.
    pub fn column_height(&self, x: usize, z: usize) -> Option<u32> {
        self.height_map
            .get(x, z)
            .map(|e| (e * self.world_height as f32).floor() as u32)
    }
}

/// Deterministic uniform value in [0, 1) for one voxel.
///
/// Depends only on position and seed, so the result is independent of which
/// worker generates the chunk and in what order.
fn uniform_draw(x: i32, y: i32, z: i32, seed: u32) -> f32 {
    let mut h = seed;
    h ^= x as u32;
    h = h.wrapping_mul(0x45d9f3b);
    h ^= h >> 16;
    h ^= y as u32;
    h = h.wrapping_mul(0x45d9f3b);
    h ^= h >> 16;
    h ^= z as u32;
    h = h.wrapping_mul(0x45d9f3b);
    h ^= h >> 16;
    (h >> 8) as f32 / (1u32 << 24) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::grid::local_position;
    use crate::voxel::voxel::ids;

    fn flat_map(config: &WorldConfig, elevation: f32) -> HeightMap {
        let size = config.height_map_size();
        HeightMap::from_values(size, vec![elevation; size * size]).unwrap()
    }

    #[test]
    fn test_uniform_draw_range_and_determinism() {
        for i in 0..1000 {
            let v = uniform_draw(i, i * 7 - 300, i / 3, 12345);
            assert!((0.0..1.0).contains(&v));
            assert_eq!(v, uniform_draw(i, i * 7 - 300, i / 3, 12345));
        }
        assert_ne!(uniform_draw(1, 2, 3, 1), uniform_draw(1, 2, 3, 2));
    }

    #[test]
    fn test_flat_terrain_fill_height() {
        // 2 chunks high of size 4 -> world height 8; elevation 0.5 -> 4 voxels
        let config = WorldConfig::with_extent(1, 1, 2, 4);
        let map = flat_map(&config, 0.5);
        let generator = ChunkGenerator::new(&config, &map, config.seed).unwrap();

        let mut lower = vec![VoxelId::EMPTY; 64];
        let mut upper = vec![VoxelId::EMPTY; 64];
        assert_eq!(generator.generate(ChunkCoord::new(0, 0, 0), &mut lower), Occupancy::Filled);
        assert_eq!(generator.generate(ChunkCoord::new(0, 1, 0), &mut upper), Occupancy::Empty);

        assert!(lower.iter().all(|v| !v.is_empty()));
        assert!(upper.iter().all(|v| v.is_empty()));
    }

    #[test]
    fn test_column_top_clamped_into_chunk() {
        let config = WorldConfig::with_extent(1, 1, 2, 4);
        // 0.7 * 8 = 5.6 -> 5 voxels: full lower chunk + 1 layer of the upper
        let map = flat_map(&config, 0.7);
        let generator = ChunkGenerator::new(&config, &map, config.seed).unwrap();
        assert_eq!(generator.column_height(0, 0), Some(5));

        let mut upper = vec![VoxelId::EMPTY; 64];
        assert_eq!(generator.generate(ChunkCoord::new(0, 1, 0), &mut upper), Occupancy::Filled);
        for (i, v) in upper.iter().enumerate() {
            let local = local_position(i, 4);
            assert_eq!(!v.is_empty(), local.y == 0, "local {:?}", local);
        }
    }

    #[test]
    fn test_zero_elevation_is_empty() {
        let config = WorldConfig::with_extent(1, 2, 1, 4);
        let map = flat_map(&config, 0.0);
        let generator = ChunkGenerator::new(&config, &map, config.seed).unwrap();

        let mut out = vec![ids::STONE; 64];
        assert_eq!(generator.generate(ChunkCoord::new(1, 0, 1), &mut out), Occupancy::Empty);
        assert!(out.iter().all(|v| v.is_empty()), "stale voxels must be cleared");
    }

    #[test]
    fn test_low_voxels_are_stone() {
        let config = WorldConfig::with_extent(1, 1, 4, 8);
        let map = flat_map(&config, 1.0);
        let generator = ChunkGenerator::new(&config, &map, config.seed).unwrap();

        let mut out = vec![VoxelId::EMPTY; 512];
        generator.generate(ChunkCoord::new(0, 0, 0), &mut out);
        // Normalized height below 0.10 of 31 -> y <= 3
        for (i, v) in out.iter().enumerate() {
            if local_position(i, 8).y <= 3 {
                assert_eq!(*v, ids::STONE);
            }
        }
    }

    #[test]
    fn test_generation_deterministic() {
        let config = WorldConfig::with_extent(3, 1, 1, 8);
        let map = flat_map(&config, 0.9);
        let generator = ChunkGenerator::new(&config, &map, config.seed).unwrap();

        let mut a = vec![VoxelId::EMPTY; 512];
        let mut b = vec![VoxelId::EMPTY; 512];
        generator.generate(ChunkCoord::new(0, 0, 0), &mut a);
        generator.generate(ChunkCoord::new(0, 0, 0), &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_mismatched_height_map_rejected() {
        let config = WorldConfig::with_extent(1, 2, 1, 4);
        let map = HeightMap::from_values(3, vec![0.5; 9]).unwrap();
        assert!(matches!(
            ChunkGenerator::new(&config, &map, 1),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unregistered_band_fails_before_generation() {
        let mut config = WorldConfig::with_extent(1, 1, 1, 4);
        config.bands.bands[0].id = VoxelId(250);
        let map = flat_map(&config, 0.5);
        assert!(matches!(
            ChunkGenerator::new(&config, &map, 1),
            Err(Error::UnregisteredVoxel(250))
        ));
    }
}
