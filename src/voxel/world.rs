//! The voxel world: dense grid, brickmap occupancy index and light registry
//!
//! The grid is the single source of truth. The brickmap and the light
//! registry are derived indices, updated synchronously inside every edit so
//! all three agree again before `set_voxel` returns.

use std::time::Instant;

use glam::{IVec3, UVec3};
use rayon::prelude::*;

use super::brickmap::{Brickmap, Occupancy};
use super::chunk::ChunkCoord;
use super::grid::VoxelGrid;
use super::raycast::{RayHit, RayMarcher};
use super::voxel::{IdRanges, VoxelId, VoxelKind};
use crate::core::{Error, Result};
use crate::generation::{self, GenerationStats, WorldConfig};
use crate::lighting::LightRegistry;
use crate::math::Ray;
use crate::terrain::TerrainNoiseGenerator;

/// A fixed-extent chunked voxel world
pub struct VoxelWorld {
    config: WorldConfig,
    grid: VoxelGrid,
    brickmap: Brickmap,
    lights: LightRegistry,
    /// Bumped on every successful mutation
    revision: u64,
}

impl VoxelWorld {
    /// Create an empty world. Fails fast on a malformed configuration.
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let dims = config.chunk_dims();
        let grid = VoxelGrid::new(dims, config.chunk_size);
        log::info!(
            "Created world {}x{}x{} chunks of {} ({} voxels)",
            dims.x, dims.y, dims.z, config.chunk_size, grid.len()
        );
        Ok(Self {
            brickmap: Brickmap::new(dims),
            lights: LightRegistry::new(config.ids),
            grid,
            config,
            revision: 0,
        })
    }

    /// Restore a world from an existing grid; both indices are rebuilt by rescan.
    pub(crate) fn from_grid(config: WorldConfig, grid: VoxelGrid) -> Result<Self> {
        config.validate()?;
        if grid.chunk_dims() != config.chunk_dims() || grid.chunk_size() != config.chunk_size {
            return Err(Error::Format(format!(
                "grid of {:?} chunks (size {}) does not match config",
                grid.chunk_dims(),
                grid.chunk_size()
            )));
        }
        if let Some((_, id)) = grid.iter_filled().find(|(_, id)| !config.ids.is_registered(*id)) {
            return Err(Error::UnregisteredVoxel(id.raw()));
        }
        let mut world = Self {
            brickmap: Brickmap::new(grid.chunk_dims()),
            lights: LightRegistry::new(config.ids),
            grid,
            config,
            revision: 0,
        };
        world.rebuild_indices();
        Ok(world)
    }

    /// Create a world and generate its terrain from the configured seed.
    pub fn generated(config: WorldConfig) -> Result<Self> {
        let mut world = Self::new(config)?;
        world.generate()?;
        Ok(world)
    }

    /// Generate terrain using a noise generator built from the config.
    pub fn generate(&mut self) -> Result<GenerationStats> {
        let noise = TerrainNoiseGenerator::new(self.config.seed, self.config.terrain.clone());
        generation::generate_world(self, &noise)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn id_ranges(&self) -> &IdRanges {
        &self.config.ids
    }

    /// Extent in voxels along each axis
    pub fn extent(&self) -> IVec3 {
        self.grid.extent()
    }

    pub fn chunk_dims(&self) -> UVec3 {
        self.grid.chunk_dims()
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn brickmap(&self) -> &Brickmap {
        &self.brickmap
    }

    pub fn lights(&self) -> &LightRegistry {
        &self.lights
    }

    /// Registered lights for the renderer
    pub fn light_list(&self) -> Vec<(IVec3, VoxelId)> {
        self.lights.to_list()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn in_bounds(&self, pos: IVec3) -> bool {
        self.grid.in_bounds(pos)
    }

    /// Stored id at `pos`. Out-of-bounds positions read as `VoxelId::EMPTY`.
    pub fn query(&self, pos: IVec3) -> VoxelId {
        self.grid.get(pos).unwrap_or(VoxelId::EMPTY)
    }

    /// Write `id` at `pos` and resynchronize the brickmap and light registry.
    ///
    /// Out-of-bounds positions and unregistered ids are rejected with an
    /// error and leave the world untouched.
    pub fn set_voxel(&mut self, pos: IVec3, id: VoxelId) -> Result<()> {
        if !self.config.ids.is_registered(id) {
            log::warn!("Rejected edit at {}: unregistered id {}", pos, id);
            return Err(Error::UnregisteredVoxel(id.raw()));
        }
        let Some(previous) = self.grid.set(pos, id) else {
            log::warn!("Rejected edit at {}: outside world extent {}", pos, self.extent());
            return Err(Error::OutOfBounds { pos });
        };

        let chunk_size = self.grid.chunk_size();
        if let Some(coord) = ChunkCoord::from_voxel(pos, chunk_size) {
            if !id.is_empty() {
                self.brickmap.set(coord, Occupancy::Filled);
            } else if !previous.is_empty() {
                // Clearing a voxel may empty the chunk; only a rescan can tell.
                let occupancy = Occupancy::from_filled(self.grid.chunk_has_content(coord));
                self.brickmap.set(coord, occupancy);
            }
        }

        self.lights.on_voxel_changed(pos, id);
        self.revision += 1;
        log::debug!("Set voxel {} to {} (was {})", pos, id, previous);
        Ok(())
    }

    /// Cast `ray` and return the first non-empty voxel within `max_range`.
    pub fn pick_voxel(&self, ray: &Ray, max_range: f32) -> Option<RayHit> {
        RayMarcher::new(self).pick(ray, max_range)
    }

    /// Place `id` against the face `normal` of the voxel at `hit`.
    ///
    /// `normal` must be a unit axis vector (a pick that started inside a
    /// voxel has none) and the target cell must be empty, so that removing
    /// the returned position restores the grid. Returns the position written.
    pub fn place_voxel(&mut self, hit: IVec3, normal: IVec3, id: VoxelId) -> Result<IVec3> {
        if !is_axis_unit(normal) {
            log::warn!("Rejected placement against {}: normal {} is not a face", hit, normal);
            return Err(Error::InvalidNormal { normal });
        }
        let target = hit.wrapping_add(normal);
        if !self.in_bounds(target) {
            log::warn!("Rejected placement at {}: outside world", target);
            return Err(Error::OutOfBounds { pos: target });
        }
        if !self.query(target).is_empty() {
            log::warn!("Rejected placement at {}: cell holds {}", target, self.query(target));
            return Err(Error::Occupied { pos: target });
        }
        self.set_voxel(target, id)?;
        Ok(target)
    }

    /// Clear the voxel at `hit`.
    pub fn remove_voxel(&mut self, hit: IVec3) -> Result<()> {
        self.set_voxel(hit, VoxelId::EMPTY)
    }

    /// Kind of the voxel at `pos` (out of bounds reads as empty).
    pub fn kind_at(&self, pos: IVec3) -> VoxelKind {
        self.config.ids.kind(self.query(pos))
    }

    /// Re-derive brickmap and light registry from the grid.
    pub fn rebuild_indices(&mut self) {
        self.brickmap = Brickmap::rebuild(&self.grid);
        self.lights.rebuild(&self.grid);
    }

    /// Run `fill` once per chunk in parallel, each with its own disjoint slice.
    ///
    /// Returns only after every chunk has finished.
    pub(crate) fn fill_chunks<F>(&mut self, fill: F)
    where
        F: Fn(ChunkCoord, &mut [VoxelId]) -> Occupancy + Sync,
    {
        let dims = self.grid.chunk_dims();
        let start = Instant::now();
        self.grid
            .par_chunks_mut()
            .zip(self.brickmap.cells_mut().par_iter_mut())
            .enumerate()
            .for_each(|(index, (voxels, occupancy))| {
                *occupancy = fill(ChunkCoord::from_index(index, dims), voxels);
            });
        self.lights.rebuild(&self.grid);
        self.revision += 1;
        log::debug!("Filled {} chunks in {:.1}ms", self.grid.chunk_count(),
            start.elapsed().as_secs_f64() * 1000.0);
    }
}

/// Exactly one component is +-1, the others zero.
fn is_axis_unit(v: IVec3) -> bool {
    let in_range = v.cmpge(IVec3::NEG_ONE).all() && v.cmple(IVec3::ONE).all();
    in_range && v.abs().element_sum() == 1
}

impl std::fmt::Debug for VoxelWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelWorld")
            .field("grid", &self.grid)
            .field("filled_chunks", &self.brickmap.filled_count())
            .field("lights", &self.lights.len())
            .field("revision", &self.revision)
            .finish()
    }
}
