//! DDA voxel traversal for picking
//!
//! Walks the grid one voxel boundary at a time, always crossing the nearest
//! boundary first. Ties go to the lowest axis (x, then y, then z) so the
//! walk is fully deterministic for a given ray, range and grid.

use glam::{DVec3, IVec3, Vec3};

use super::brickmap::Brickmap;
use super::chunk::ChunkCoord;
use super::grid::VoxelGrid;
use super::world::VoxelWorld;
use crate::math::Ray;

/// Beyond this magnitude an origin cannot be floored into voxel coordinates.
const MAX_ORIGIN: f32 = (1 << 30) as f32;

/// First non-empty voxel struck by a ray
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayHit {
    /// Voxel that was hit
    pub position: IVec3,
    /// Outward normal of the face the ray entered through.
    ///
    /// Zero when the ray started inside the hit voxel (no entry face).
    pub normal: IVec3,
}

impl RayHit {
    /// Cell adjacent to the entered face, where a new voxel would be placed
    pub fn adjacent(&self) -> IVec3 {
        self.position + self.normal
    }

    /// True if the ray started inside the hit voxel
    pub fn started_inside(&self) -> bool {
        self.normal == IVec3::ZERO
    }
}

/// Read-only traversal over a grid and its brickmap.
///
/// The grid must not change for the duration of a `pick` call; the shared
/// borrows enforce that.
pub struct RayMarcher<'a> {
    grid: &'a VoxelGrid,
    brickmap: &'a Brickmap,
}

impl<'a> RayMarcher<'a> {
    pub fn new(world: &'a VoxelWorld) -> Self {
        Self::from_parts(world.grid(), world.brickmap())
    }

    pub fn from_parts(grid: &'a VoxelGrid, brickmap: &'a Brickmap) -> Self {
        Self { grid, brickmap }
    }

    /// Find the first non-empty voxel along `ray` whose centre lies within
    /// `max_range` of the origin.
    pub fn pick(&self, ray: &Ray, max_range: f32) -> Option<RayHit> {
        if !ray.origin.is_finite() || !ray.direction.is_finite() || !max_range.is_finite() {
            return None;
        }
        if max_range < 0.0 || ray.origin.abs().max_element() > MAX_ORIGIN {
            return None;
        }

        // Re-apply the epsilon clamp in case the fields were set directly.
        let ray = Ray::new(ray.origin, ray.direction);
        let dir = ray.direction;
        let origin = ray.origin.as_dvec3();
        let max_range = max_range as f64;
        let extent = self.grid.extent();

        // Jump straight to where the ray enters the grid. Done in f64 so far
        // origins keep voxel precision; the march below then runs on small
        // local offsets.
        let (t_entry, mut entry_axis) = grid_entry(origin, dir.as_dvec3(), extent.as_dvec3())?;
        let start = origin + dir.as_dvec3() * t_entry;
        let mut map_pos = start.floor().as_ivec3().clamp(IVec3::ZERO, extent - IVec3::ONE);
        let local = (start - map_pos.as_dvec3()).as_vec3();

        let step = IVec3::new(sign(dir.x), sign(dir.y), sign(dir.z));
        let step_f = step.as_vec3();
        let delta_dist = (Vec3::splat(dir.length()) / dir).abs();
        let mut side_dist = (step_f * 0.5 + 0.5 - step_f * local) * delta_dist;

        // The starting voxel is only range-checked when the ray came from outside
        if entry_axis.is_some() && beyond_range(map_pos, origin, max_range) {
            return None;
        }

        loop {
            if self.is_filled(map_pos) {
                let mut normal = IVec3::ZERO;
                if let Some(axis) = entry_axis {
                    normal[axis] = -step[axis];
                }
                return Some(RayHit { position: map_pos, normal });
            }

            let axis = nearest_axis(side_dist);
            map_pos[axis] += step[axis];
            side_dist[axis] += delta_dist[axis];
            entry_axis = Some(axis);

            // A ray clipped to the box cannot come back once it leaves
            if !self.grid.in_bounds(map_pos) || beyond_range(map_pos, origin, max_range) {
                return None;
            }
        }
    }

    /// Non-empty and in bounds. In chunks the brickmap marks empty the
    /// voxel is rejected without touching the grid; traversal itself still
    /// visits every voxel along the ray.
    fn is_filled(&self, pos: IVec3) -> bool {
        if !self.grid.in_bounds(pos) {
            return false;
        }
        match ChunkCoord::from_voxel(pos, self.grid.chunk_size()) {
            Some(chunk) if self.brickmap.is_filled(chunk) => {
                self.grid.get(pos).is_some_and(|id| !id.is_empty())
            }
            _ => false,
        }
    }
}

fn sign(v: f32) -> i32 {
    if v < 0.0 { -1 } else { 1 }
}

/// Axis with the smallest side distance; lowest index wins ties.
fn nearest_axis(side_dist: Vec3) -> usize {
    if side_dist.x <= side_dist.y && side_dist.x <= side_dist.z {
        0
    } else if side_dist.y <= side_dist.z {
        1
    } else {
        2
    }
}

/// Voxel centre farther than `max_range` from the ray origin
fn beyond_range(pos: IVec3, origin: DVec3, max_range: f64) -> bool {
    (pos.as_dvec3() + DVec3::splat(0.5)).distance(origin) > max_range
}

/// Ray parameter at which the ray enters the `[0, extent)` box, with the axis
/// of the entry face. `(0, None)` when the origin is already inside.
///
/// Slab test; on an edge or corner the highest axis wins, matching the last
/// boundary the voxel walk would have crossed.
fn grid_entry(origin: DVec3, dir: DVec3, extent: DVec3) -> Option<(f64, Option<usize>)> {
    if (0..3).all(|a| origin[a] >= 0.0 && origin[a] < extent[a]) {
        return Some((0.0, None));
    }

    let mut t_near = f64::NEG_INFINITY;
    let mut t_far = f64::INFINITY;
    let mut axis = 0;
    for a in 0..3 {
        let t0 = -origin[a] / dir[a];
        let t1 = (extent[a] - origin[a]) / dir[a];
        let (lo, hi) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
        if lo >= t_near {
            t_near = lo;
            axis = a;
        }
        t_far = t_far.min(hi);
    }

    if t_far <= 0.0 || t_near >= t_far {
        return None;
    }
    Some((t_near.max(0.0), Some(axis)))
}
