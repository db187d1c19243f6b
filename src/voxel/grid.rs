//! Dense voxel grid with chunk-major storage
//!
//! Every chunk's `chunk_size³` voxels are stored contiguously, so the grid can
//! be split into one disjoint mutable slice per chunk for parallel generation.
//! The renderer-facing export (`dense_buffer`) uses plain x-major order.

use glam::{IVec3, UVec3};
use rayon::prelude::*;

use super::chunk::ChunkCoord;
use super::voxel::VoxelId;

/// Dense 3D array of voxel ids covering the whole world
#[derive(Clone)]
pub struct VoxelGrid {
    chunk_size: u32,
    chunk_dims: UVec3,
    voxels: Vec<VoxelId>,
}

impl VoxelGrid {
    /// Create an all-empty grid of `chunk_dims` chunks with `chunk_size` voxels per side.
    ///
    /// Dimensions are expected to have been validated by the world config.
    pub fn new(chunk_dims: UVec3, chunk_size: u32) -> Self {
        let chunk_volume = (chunk_size as usize).pow(3);
        let chunk_count = chunk_dims.x as usize * chunk_dims.y as usize * chunk_dims.z as usize;
        Self {
            chunk_size,
            chunk_dims,
            voxels: vec![VoxelId::EMPTY; chunk_volume * chunk_count],
        }
    }

    /// Rebuild a grid from an x-major (`[x][y][z]`) dense buffer.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn from_dense(chunk_dims: UVec3, chunk_size: u32, dense: &[VoxelId]) -> Option<Self> {
        let mut grid = Self::new(chunk_dims, chunk_size);
        if dense.len() != grid.voxels.len() {
            return None;
        }
        let extent = grid.extent();
        let mut i = 0;
        for x in 0..extent.x {
            for y in 0..extent.y {
                for z in 0..extent.z {
                    let idx = grid.storage_index(IVec3::new(x, y, z));
                    grid.voxels[idx] = dense[i];
                    i += 1;
                }
            }
        }
        Some(grid)
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Number of chunks along each axis
    pub fn chunk_dims(&self) -> UVec3 {
        self.chunk_dims
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_dims.x as usize * self.chunk_dims.y as usize * self.chunk_dims.z as usize
    }

    pub fn chunk_volume(&self) -> usize {
        (self.chunk_size as usize).pow(3)
    }

    /// Extent in voxels along each axis
    pub fn extent(&self) -> IVec3 {
        (self.chunk_dims * self.chunk_size).as_ivec3()
    }

    /// Total number of voxels
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// True iff every coordinate lies in `[0, extent)`.
    pub fn in_bounds(&self, pos: IVec3) -> bool {
        pos.cmpge(IVec3::ZERO).all() && pos.cmplt(self.extent()).all()
    }

    /// Storage index of an in-bounds position
    fn storage_index(&self, pos: IVec3) -> usize {
        let cs = self.chunk_size as i32;
        let chunk = ChunkCoord::new((pos.x / cs) as u32, (pos.y / cs) as u32, (pos.z / cs) as u32);
        let local = pos - chunk.voxel_origin(self.chunk_size);
        let cs = cs as usize;
        let local_index =
            local.x as usize + cs * (local.y as usize + cs * local.z as usize);
        chunk.index(self.chunk_dims) * self.chunk_volume() + local_index
    }

    /// Voxel position of a storage index (inverse of `storage_index`).
    fn position_of(&self, index: usize) -> IVec3 {
        let volume = self.chunk_volume();
        let chunk = ChunkCoord::from_index(index / volume, self.chunk_dims);
        chunk.voxel_origin(self.chunk_size) + local_position(index % volume, self.chunk_size)
    }

    /// Read one voxel; `None` when out of bounds.
    pub fn get(&self, pos: IVec3) -> Option<VoxelId> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(self.voxels[self.storage_index(pos)])
    }

    /// Write one voxel and return the previous id; `None` when out of bounds.
    pub(crate) fn set(&mut self, pos: IVec3, id: VoxelId) -> Option<VoxelId> {
        if !self.in_bounds(pos) {
            return None;
        }
        let idx = self.storage_index(pos);
        Some(std::mem::replace(&mut self.voxels[idx], id))
    }

    /// All voxels of one chunk, in chunk-local x-fastest order.
    pub fn chunk_slice(&self, coord: ChunkCoord) -> &[VoxelId] {
        let volume = self.chunk_volume();
        let start = coord.index(self.chunk_dims) * volume;
        &self.voxels[start..start + volume]
    }

    /// True if any voxel in the chunk is non-empty.
    pub fn chunk_has_content(&self, coord: ChunkCoord) -> bool {
        self.chunk_slice(coord).iter().any(|v| !v.is_empty())
    }

    /// Disjoint mutable slices, one per chunk, in chunk index order.
    pub(crate) fn par_chunks_mut(&mut self) -> rayon::slice::ChunksMut<'_, VoxelId> {
        let volume = self.chunk_volume();
        self.voxels.par_chunks_mut(volume)
    }

    /// Iterate `(position, id)` over every non-empty voxel.
    pub fn iter_filled(&self) -> impl Iterator<Item = (IVec3, VoxelId)> + '_ {
        self.voxels
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_empty())
            .map(|(i, v)| (self.position_of(i), *v))
    }

    /// Count of non-empty voxels
    pub fn filled_count(&self) -> usize {
        self.voxels.par_iter().filter(|v| !v.is_empty()).count()
    }

    /// Export the grid as one id per cell in x-major (`[x][y][z]`) order.
    pub fn dense_buffer(&self) -> Vec<VoxelId> {
        let extent = self.extent();
        let mut out = Vec::with_capacity(self.voxels.len());
        for x in 0..extent.x {
            for y in 0..extent.y {
                for z in 0..extent.z {
                    out.push(self.voxels[self.storage_index(IVec3::new(x, y, z))]);
                }
            }
        }
        out
    }
}

/// Chunk-local position of a chunk-local storage index.
pub fn local_position(local_index: usize, chunk_size: u32) -> IVec3 {
    let cs = chunk_size as usize;
    IVec3::new(
        (local_index % cs) as i32,
        ((local_index / cs) % cs) as i32,
        (local_index / (cs * cs)) as i32,
    )
}

impl std::fmt::Debug for VoxelGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelGrid")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_dims", &self.chunk_dims)
            .field("voxels", &format_args!("<{} voxels>", self.voxels.len()))
            .finish()
    }
}
