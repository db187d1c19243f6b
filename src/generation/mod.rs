//! World generation pipeline: height map, then every chunk in parallel.
//!
//! The pipeline:
//! 1. Builds the height map once from the terrain noise generator
//! 2. Validates the band table (unregistered ids fail before any chunk runs)
//! 3. Generates every chunk on the rayon pool into its own grid slice
//! 4. Writes each chunk's occupancy flag and resyncs the light registry
//!
//! The height map is dropped once generation returns.

pub mod bands;
pub mod chunk_gen;
pub mod config;

pub use bands::{BandBlend, ElevationBand, ElevationBands};
pub use chunk_gen::ChunkGenerator;
pub use config::WorldConfig;

use std::time::{Duration, Instant};

use crate::core::Result;
use crate::terrain::generator::TerrainNoiseGenerator;
use crate::voxel::world::VoxelWorld;

/// Summary of one `generate_world` run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationStats {
    pub chunks: usize,
    pub filled_chunks: usize,
    pub elapsed: Duration,
}

/// Regenerate every chunk of `world` from `noise`.
///
/// Returns once all chunks are written; the world is ready afterwards.
pub fn generate_world(world: &mut VoxelWorld, noise: &TerrainNoiseGenerator) -> Result<GenerationStats> {
    let config = world.config().clone();
    let start = Instant::now();

    let height_map = noise.generate_height_map(config.height_map_size());
    let generator = ChunkGenerator::new(&config, &height_map, noise.seed())?;

    let chunks = world.grid().chunk_count();
    log::info!(
        "Generating {} chunks ({}x{} height map, seed {})...",
        chunks, height_map.size(), height_map.size(), noise.seed()
    );

    world.fill_chunks(|coord, voxels| generator.generate(coord, voxels));

    let stats = GenerationStats {
        chunks,
        filled_chunks: world.brickmap().filled_count(),
        elapsed: start.elapsed(),
    };
    log::info!(
        "Generated {} chunks ({} with geometry, {} lights) in {:.1}ms ({:.0} chunks/sec)",
        stats.chunks,
        stats.filled_chunks,
        world.lights().len(),
        stats.elapsed.as_secs_f64() * 1000.0,
        stats.chunks as f64 / stats.elapsed.as_secs_f64().max(f64::EPSILON)
    );

    Ok(stats)
}
