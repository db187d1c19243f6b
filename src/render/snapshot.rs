//! Read-only snapshots of the grid and light list for the renderer.
//!
//! The renderer consumes these fire-and-forget; it never writes back into the
//! world. A new snapshot is produced only after the world revision changes,
//! so a batch of edits results in a single upload before the next frame.

use bytemuck::{Pod, Zeroable};
use glam::IVec3;

use crate::voxel::voxel::VoxelId;
use crate::voxel::world::VoxelWorld;

/// GPU-side layout of one light entry (16 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct LightRecord {
    pub position: [i32; 3],
    pub id: u32,
}

impl LightRecord {
    pub fn new(position: IVec3, id: VoxelId) -> Self {
        Self {
            position: position.to_array(),
            id: id.raw() as u32,
        }
    }
}

/// Dense grid plus light list, captured at one world revision
#[derive(Clone, Debug)]
pub struct WorldSnapshot {
    pub revision: u64,
    /// Grid extent in voxels
    pub extent: IVec3,
    /// One id per cell, x-major (`[x][y][z]`)
    pub voxels: Vec<VoxelId>,
    pub lights: Vec<LightRecord>,
}

impl WorldSnapshot {
    pub fn capture(world: &VoxelWorld) -> Self {
        Self {
            revision: world.revision(),
            extent: world.extent(),
            voxels: world.grid().dense_buffer(),
            lights: world
                .light_list()
                .into_iter()
                .map(|(pos, id)| LightRecord::new(pos, id))
                .collect(),
        }
    }

    /// Grid as raw bytes for upload
    pub fn voxel_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.voxels)
    }

    /// Light list as raw bytes for upload
    pub fn light_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.lights)
    }
}

/// Tracks the last revision handed to the renderer
#[derive(Clone, Copy, Debug, Default)]
pub struct SnapshotTracker {
    last_revision: Option<u64>,
}

impl SnapshotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot if the world changed since the last call (always on the first).
    pub fn poll(&mut self, world: &VoxelWorld) -> Option<WorldSnapshot> {
        if self.last_revision == Some(world.revision()) {
            return None;
        }
        self.last_revision = Some(world.revision());
        Some(WorldSnapshot::capture(world))
    }

    /// Force the next `poll` to produce a snapshot.
    pub fn invalidate(&mut self) {
        self.last_revision = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::WorldConfig;
    use crate::voxel::voxel::ids;

    fn world() -> VoxelWorld {
        VoxelWorld::new(WorldConfig::with_extent(1, 1, 1, 4)).unwrap()
    }

    #[test]
    fn test_light_record_layout() {
        assert_eq!(std::mem::size_of::<LightRecord>(), 16);
        let record = LightRecord::new(IVec3::new(1, -2, 3), ids::LAMP_WARM);
        let words: &[u32] = bytemuck::cast_slice(std::slice::from_ref(&record));
        assert_eq!(words, &[1, (-2i32) as u32, 3, ids::LAMP_WARM.raw() as u32]);
    }

    #[test]
    fn test_capture_contents() {
        let mut world = world();
        world.set_voxel(IVec3::new(1, 2, 3), ids::LAMP_WHITE).unwrap();
        world.set_voxel(IVec3::new(0, 0, 0), ids::STONE).unwrap();

        let snap = WorldSnapshot::capture(&world);
        assert_eq!(snap.extent, IVec3::new(4, 4, 4));
        assert_eq!(snap.voxel_bytes().len(), 64);
        assert_eq!(snap.voxel_bytes()[0], ids::STONE.raw());
        assert_eq!(snap.voxel_bytes()[(1 * 4 + 2) * 4 + 3], ids::LAMP_WHITE.raw());
        assert_eq!(snap.lights, vec![LightRecord::new(IVec3::new(1, 2, 3), ids::LAMP_WHITE)]);
        assert_eq!(snap.light_bytes().len(), 16);
    }

    #[test]
    fn test_tracker_only_pushes_on_change() {
        let mut world = world();
        let mut tracker = SnapshotTracker::new();

        assert!(tracker.poll(&world).is_some());
        assert!(tracker.poll(&world).is_none());

        world.set_voxel(IVec3::ZERO, ids::DIRT).unwrap();
        world.set_voxel(IVec3::ONE, ids::SAND).unwrap();
        let snap = tracker.poll(&world).unwrap();
        assert_eq!(snap.revision, 2);
        assert!(tracker.poll(&world).is_none());

        // Rejected edits do not change the revision
        assert!(world.set_voxel(IVec3::splat(10), ids::DIRT).is_err());
        assert!(tracker.poll(&world).is_none());

        tracker.invalidate();
        assert!(tracker.poll(&world).is_some());
    }
}
