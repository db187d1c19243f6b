//! Coarse per-chunk occupancy index
//!
//! The brickmap is derived from the grid, never the other way round.
//! `Filled` whenever the chunk holds at least one non-empty voxel; it may only
//! read `Filled` for an empty chunk between an edit and its rescan.

use glam::UVec3;
use rayon::prelude::*;

use super::chunk::ChunkCoord;
use super::grid::VoxelGrid;

/// Occupancy flag of one chunk
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Occupancy {
    #[default]
    Empty = 0,
    Filled = 1,
}

impl Occupancy {
    pub fn is_filled(self) -> bool {
        self == Occupancy::Filled
    }

    pub fn from_filled(filled: bool) -> Self {
        if filled { Occupancy::Filled } else { Occupancy::Empty }
    }
}

/// Dense 3D array of one occupancy flag per chunk
#[derive(Clone, Debug)]
pub struct Brickmap {
    dims: UVec3,
    cells: Vec<Occupancy>,
}

impl Brickmap {
    /// All-empty brickmap for a `dims`-sized chunk grid
    pub fn new(dims: UVec3) -> Self {
        let count = dims.x as usize * dims.y as usize * dims.z as usize;
        Self {
            dims,
            cells: vec![Occupancy::Empty; count],
        }
    }

    /// Derive the brickmap from grid content by scanning every chunk.
    pub fn rebuild(grid: &VoxelGrid) -> Self {
        let dims = grid.chunk_dims();
        let cells = (0..grid.chunk_count())
            .into_par_iter()
            .map(|i| Occupancy::from_filled(grid.chunk_has_content(ChunkCoord::from_index(i, dims))))
            .collect();
        Self { dims, cells }
    }

    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Occupancy of a chunk; chunks outside the map read as `Empty`.
    pub fn get(&self, coord: ChunkCoord) -> Occupancy {
        if !coord.as_uvec3().cmplt(self.dims).all() {
            return Occupancy::Empty;
        }
        self.cells[coord.index(self.dims)]
    }

    pub fn is_filled(&self, coord: ChunkCoord) -> bool {
        self.get(coord).is_filled()
    }

    pub(crate) fn set(&mut self, coord: ChunkCoord, occupancy: Occupancy) {
        let idx = coord.index(self.dims);
        self.cells[idx] = occupancy;
    }

    /// Mutable flags in chunk index order, for parallel generation.
    pub(crate) fn cells_mut(&mut self) -> &mut [Occupancy] {
        &mut self.cells
    }

    /// Number of chunks marked `Filled`
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_filled()).count()
    }

    /// Iterate `(coord, occupancy)` in chunk index order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, Occupancy)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (ChunkCoord::from_index(i, self.dims), *c))
    }

    /// Check the brickmap agrees exactly with the grid content.
    pub fn verify(&self, grid: &VoxelGrid) -> bool {
        self.dims == grid.chunk_dims()
            && self
                .iter()
                .all(|(coord, occ)| occ.is_filled() == grid.chunk_has_content(coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::voxel::ids;
    use glam::IVec3;

    #[test]
    fn test_new_is_all_empty() {
        let map = Brickmap::new(UVec3::new(2, 3, 4));
        assert_eq!(map.len(), 24);
        assert_eq!(map.filled_count(), 0);
        assert!(!map.is_filled(ChunkCoord::new(1, 2, 3)));
    }

    #[test]
    fn test_out_of_range_reads_empty() {
        let mut map = Brickmap::new(UVec3::new(1, 1, 1));
        map.set(ChunkCoord::new(0, 0, 0), Occupancy::Filled);
        assert_eq!(map.get(ChunkCoord::new(1, 0, 0)), Occupancy::Empty);
        assert_eq!(map.get(ChunkCoord::new(0, 0, 0)), Occupancy::Filled);
    }

    #[test]
    fn test_rebuild_from_grid() {
        let mut grid = VoxelGrid::new(UVec3::new(2, 2, 2), 4);
        grid.set(IVec3::new(1, 1, 1), ids::STONE);
        grid.set(IVec3::new(6, 5, 7), ids::GRASS);

        let map = Brickmap::rebuild(&grid);
        assert_eq!(map.filled_count(), 2);
        assert!(map.is_filled(ChunkCoord::new(0, 0, 0)));
        assert!(map.is_filled(ChunkCoord::new(1, 1, 1)));
        assert!(map.verify(&grid));
    }

    #[test]
    fn test_verify_detects_drift() {
        let mut grid = VoxelGrid::new(UVec3::new(2, 1, 1), 4);
        let mut map = Brickmap::new(grid.chunk_dims());
        assert!(map.verify(&grid));

        // Stale Filled flag
        map.set(ChunkCoord::new(1, 0, 0), Occupancy::Filled);
        assert!(!map.verify(&grid));

        // Missing Filled flag
        let mut map = Brickmap::new(grid.chunk_dims());
        grid.set(IVec3::new(0, 0, 0), ids::STONE);
        assert!(!map.verify(&grid));
        map.set(ChunkCoord::new(0, 0, 0), Occupancy::Filled);
        assert!(map.verify(&grid));
    }
}
