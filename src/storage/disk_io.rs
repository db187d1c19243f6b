//! World serialization and disk I/O
//!
//! A saved world is the config (as JSON) plus the dense voxel buffer, archived
//! with rkyv and compressed with LZ4. The brickmap and light registry are not
//! stored; they are rebuilt from the grid on load.

use std::path::Path;

use rkyv::{Archive, Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::generation::WorldConfig;
use crate::voxel::grid::VoxelGrid;
use crate::voxel::voxel::VoxelId;
use crate::voxel::world::VoxelWorld;

/// Bumped whenever the archived layout changes
pub const WORLD_FORMAT_VERSION: u32 = 1;

/// Serializable world data
#[derive(Archive, Deserialize, Serialize)]
struct WorldFile {
    version: u32,
    config_json: String,
    /// Dense x-major voxel ids
    voxels: Vec<u8>,
}

/// Serialize and compress a world
pub fn encode_world(world: &VoxelWorld) -> Result<Vec<u8>> {
    let dense = world.grid().dense_buffer();
    let data = WorldFile {
        version: WORLD_FORMAT_VERSION,
        config_json: serde_json::to_string(world.config())?,
        voxels: bytemuck::cast_slice::<VoxelId, u8>(&dense).to_vec(),
    };

    let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&data)
        .map_err(|e| Error::Format(e.to_string()))?;

    Ok(lz4_flex::compress_prepend_size(&bytes))
}

/// Decompress and deserialize a world, rebuilding its indices
pub fn decode_world(data: &[u8]) -> Result<VoxelWorld> {
    let decompressed = lz4_flex::decompress_size_prepended(data)
        .map_err(|e| Error::Format(format!("LZ4 decompression failed: {}", e)))?;

    // rkyv validation needs an aligned buffer
    let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(decompressed.len());
    aligned.extend_from_slice(&decompressed);

    let archived = rkyv::access::<ArchivedWorldFile, rkyv::rancor::Error>(&aligned)
        .map_err(|e| Error::Format(e.to_string()))?;
    let file: WorldFile = rkyv::deserialize::<WorldFile, rkyv::rancor::Error>(archived)
        .map_err(|e| Error::Format(e.to_string()))?;

    if file.version != WORLD_FORMAT_VERSION {
        return Err(Error::Format(format!(
            "unsupported world version {} (expected {})",
            file.version, WORLD_FORMAT_VERSION
        )));
    }

    let config: WorldConfig = serde_json::from_str(&file.config_json)?;
    config.validate()?;

    let dense: &[VoxelId] = bytemuck::cast_slice(&file.voxels);
    let grid = VoxelGrid::from_dense(config.chunk_dims(), config.chunk_size, dense).ok_or_else(|| {
        Error::Format(format!(
            "voxel buffer has {} entries, config needs {}",
            dense.len(),
            config.height_map_size() * config.height_map_size() * config.world_height() as usize
        ))
    })?;

    VoxelWorld::from_grid(config, grid)
}

/// Save a world to disk (compressed)
pub async fn save_world(path: &Path, world: &VoxelWorld) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let compressed = encode_world(world)?;
    let size = compressed.len();
    tokio::fs::write(path, compressed).await?;

    log::info!("Saved world to {} ({} bytes)", path.display(), size);
    Ok(())
}

/// Load a world from disk
pub async fn load_world(path: &Path) -> Result<VoxelWorld> {
    let compressed = tokio::fs::read(path).await?;
    let world = decode_world(&compressed)?;

    log::info!(
        "Loaded world from {} ({} filled chunks, {} lights)",
        path.display(),
        world.brickmap().filled_count(),
        world.lights().len()
    );
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::voxel::ids;
    use glam::IVec3;

    fn small_world() -> VoxelWorld {
        VoxelWorld::generated(WorldConfig::with_extent(31, 2, 1, 8)).unwrap()
    }

    #[test]
    fn test_encode_decode_restores_world() {
        let mut world = small_world();
        world.set_voxel(IVec3::new(2, 7, 9), ids::LAMP_BLUE).unwrap();

        let bytes = encode_world(&world).unwrap();
        let loaded = decode_world(&bytes).unwrap();

        assert_eq!(loaded.config(), world.config());
        assert_eq!(loaded.grid().dense_buffer(), world.grid().dense_buffer());
        assert_eq!(loaded.light_list(), world.light_list());
        assert!(loaded.lights().contains(IVec3::new(2, 7, 9)));
        assert!(loaded.brickmap().verify(loaded.grid()));
    }

    #[test]
    fn test_compression_shrinks_sparse_world() {
        let world = VoxelWorld::new(WorldConfig::with_extent(1, 2, 2, 8)).unwrap();
        let bytes = encode_world(&world).unwrap();
        assert!(bytes.len() < world.grid().len());
    }

    #[test]
    fn test_corrupt_data_rejected() {
        let bytes = encode_world(&small_world()).unwrap();

        assert!(matches!(decode_world(&bytes[..bytes.len() / 2]), Err(Error::Format(_))));
        assert!(matches!(decode_world(&[1, 2, 3]), Err(Error::Format(_))));
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let data = WorldFile {
            version: WORLD_FORMAT_VERSION + 1,
            config_json: serde_json::to_string(&WorldConfig::default()).unwrap(),
            voxels: Vec::new(),
        };
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&data).unwrap();
        let compressed = lz4_flex::compress_prepend_size(&bytes);
        assert!(matches!(decode_world(&compressed), Err(Error::Format(_))));
    }

    #[test]
    fn test_buffer_size_mismatch_rejected() {
        let data = WorldFile {
            version: WORLD_FORMAT_VERSION,
            config_json: serde_json::to_string(&WorldConfig::with_extent(1, 1, 1, 4)).unwrap(),
            voxels: vec![0; 10],
        };
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&data).unwrap();
        let compressed = lz4_flex::compress_prepend_size(&bytes);
        assert!(matches!(decode_world(&compressed), Err(Error::Format(_))));
    }

    #[test]
    fn test_unregistered_voxel_in_file_rejected() {
        let mut voxels = vec![0u8; 64];
        voxels[5] = 200;
        let data = WorldFile {
            version: WORLD_FORMAT_VERSION,
            config_json: serde_json::to_string(&WorldConfig::with_extent(1, 1, 1, 4)).unwrap(),
            voxels,
        };
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&data).unwrap();
        let compressed = lz4_flex::compress_prepend_size(&bytes);
        assert!(matches!(decode_world(&compressed), Err(Error::UnregisteredVoxel(200))));
    }

    #[tokio::test]
    async fn test_save_and_load_world() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worlds").join("test.bkw");
        let world = small_world();

        save_world(&path, &world).await.unwrap();
        assert!(path.exists());

        let loaded = load_world(&path).await.unwrap();
        assert_eq!(loaded.grid().dense_buffer(), world.grid().dense_buffer());
        assert_eq!(loaded.brickmap().filled_count(), world.brickmap().filled_count());
    }

    #[tokio::test]
    async fn test_load_missing_world() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_world(&dir.path().join("nope.bkw")).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
