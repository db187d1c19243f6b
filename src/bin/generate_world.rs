//! World generator binary: builds a terrain world and optionally saves it.
//!
//! Usage: cargo run --release --bin generate_world -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>      JSON world config (flags below override it)
//!   --seed <SEED>        Random seed (default: 12345)
//!   --chunks <N>         Chunks along X and Z (default: 4)
//!   --height <N>         Chunks along Y (default: 2)
//!   --chunk-size <N>     Voxels per chunk side (default: 16)
//!   --out <PATH>         Save the generated world to PATH

use std::path::PathBuf;
use std::process::ExitCode;

use glam::Vec3;

use brickworld::core::{logging, Result};
use brickworld::generation::{self, WorldConfig};
use brickworld::math::Ray;
use brickworld::storage::disk_io;
use brickworld::terrain::TerrainNoiseGenerator;
use brickworld::voxel::VoxelWorld;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> Result<()> {
    let mut config = match parse_str_arg(args, "--config") {
        Some(path) => WorldConfig::from_json_file(path)?,
        None => WorldConfig::default(),
    };
    if let Some(seed) = parse_u32_arg(args, "--seed") {
        config.seed = seed;
    }
    if let Some(chunks) = parse_u32_arg(args, "--chunks") {
        config.world_size_xz = chunks;
    }
    if let Some(height) = parse_u32_arg(args, "--height") {
        config.world_size_y = height;
    }
    if let Some(size) = parse_u32_arg(args, "--chunk-size") {
        config.chunk_size = size;
    }
    let output = parse_str_arg(args, "--out").map(PathBuf::from);

    let dims = config.chunk_dims();
    println!("=== Brickworld Generator ===");
    println!("Seed:   {}", config.seed);
    println!("Chunks: {} x {} x {} of {}^3", dims.x, dims.y, dims.z, config.chunk_size);
    if let Some(path) = &output {
        println!("Output: {}", path.display());
    }
    println!();

    let noise = TerrainNoiseGenerator::new(config.seed, config.terrain.clone());
    let mut world = VoxelWorld::new(config)?;
    let stats = generation::generate_world(&mut world, &noise)?;

    println!(
        "Generated {} chunks ({} filled) in {:.2}s",
        stats.chunks,
        stats.filled_chunks,
        stats.elapsed.as_secs_f64()
    );
    println!("Filled voxels: {}", world.grid().filled_count());
    println!("Lights:        {}", world.lights().len());

    // Probe the tallest column from above
    let height_map = noise.generate_height_map(world.config().height_map_size());
    if let Some((x, z, peak)) = height_map.peak() {
        let top = world.extent().y as f32;
        let ray = Ray::new(Vec3::new(x as f32 + 0.5, top + 1.0, z as f32 + 0.5), Vec3::NEG_Y);
        match world.pick_voxel(&ray, top + 2.0) {
            Some(hit) => println!(
                "Peak at ({}, {}) elevation {:.3}: surface voxel {} ({})",
                x, z, peak, hit.position, world.query(hit.position)
            ),
            None => println!("Peak at ({}, {}) elevation {:.3}: no surface", x, z, peak),
        }
    }

    if let Some(path) = output {
        disk_io::save_world(&path, &world).await?;
    }

    Ok(())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
