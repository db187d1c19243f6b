//! Voxel data structures and operations

pub mod voxel;
pub mod chunk;
pub mod grid;
pub mod brickmap;
pub mod world;
pub mod raycast;

pub use voxel::{ids, IdRanges, VoxelId, VoxelKind};
pub use chunk::ChunkCoord;
pub use grid::VoxelGrid;
pub use brickmap::{Brickmap, Occupancy};
pub use world::VoxelWorld;
pub use raycast::{RayHit, RayMarcher};
