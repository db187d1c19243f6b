//! Chunk addressing for the fixed-size cubic partitions of the grid

use glam::{IVec3, UVec3};

/// Integer coordinate identifying a chunk in the world grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Chunk containing an in-bounds voxel position.
    ///
    /// Returns `None` for negative coordinates.
    pub fn from_voxel(pos: IVec3, chunk_size: u32) -> Option<Self> {
        if pos.cmplt(IVec3::ZERO).any() {
            return None;
        }
        let cs = chunk_size as i32;
        Some(Self::new((pos.x / cs) as u32, (pos.y / cs) as u32, (pos.z / cs) as u32))
    }

    /// Rebuild a coordinate from its linear index in a `dims`-sized chunk grid.
    pub fn from_index(index: usize, dims: UVec3) -> Self {
        let dx = dims.x as usize;
        let dy = dims.y as usize;
        Self::new(
            (index % dx) as u32,
            ((index / dx) % dy) as u32,
            (index / (dx * dy)) as u32,
        )
    }

    /// Linear index, x fastest then y then z
    pub fn index(&self, dims: UVec3) -> usize {
        self.x as usize
            + dims.x as usize * (self.y as usize + dims.y as usize * self.z as usize)
    }

    /// Minimum-corner voxel of this chunk
    pub fn voxel_origin(&self, chunk_size: u32) -> IVec3 {
        IVec3::new(
            (self.x * chunk_size) as i32,
            (self.y * chunk_size) as i32,
            (self.z * chunk_size) as i32,
        )
    }

    pub fn as_uvec3(&self) -> UVec3 {
        UVec3::new(self.x, self.y, self.z)
    }
}

/// Iterate every chunk coordinate of a `dims`-sized chunk grid in index order.
pub fn iter_coords(dims: UVec3) -> impl Iterator<Item = ChunkCoord> {
    let count = dims.x as usize * dims.y as usize * dims.z as usize;
    (0..count).map(move |i| ChunkCoord::from_index(i, dims))
}
