//! Sparse index of placed light voxels, kept in sync with the grid
//!
//! Invariant: `pos` is registered iff `grid[pos]` currently holds an id in the
//! light range. The owning world calls `on_voxel_changed` inside every edit.

use std::collections::HashMap;

use glam::IVec3;

use crate::voxel::grid::VoxelGrid;
use crate::voxel::voxel::{IdRanges, VoxelId};

/// Mapping from voxel position to the light id stored there
#[derive(Clone, Debug)]
pub struct LightRegistry {
    ranges: IdRanges,
    lights: HashMap<IVec3, VoxelId>,
}

impl LightRegistry {
    pub fn new(ranges: IdRanges) -> Self {
        Self {
            ranges,
            lights: HashMap::new(),
        }
    }

    /// Upsert when `new_id` is a light, erase a previous entry otherwise.
    pub fn on_voxel_changed(&mut self, pos: IVec3, new_id: VoxelId) {
        if self.ranges.is_light(new_id) {
            self.lights.insert(pos, new_id);
        } else {
            self.lights.remove(&pos);
        }
    }

    /// Replace all entries with the lights found in `grid`.
    pub fn rebuild(&mut self, grid: &VoxelGrid) {
        self.lights.clear();
        let ranges = self.ranges;
        self.lights.extend(grid.iter_filled().filter(|(_, id)| ranges.is_light(*id)));
        log::debug!("Light registry rebuilt: {} lights", self.lights.len());
    }

    pub fn get(&self, pos: IVec3) -> Option<VoxelId> {
        self.lights.get(&pos).copied()
    }

    pub fn contains(&self, pos: IVec3) -> bool {
        self.lights.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// All registered lights, sorted by position so repeated calls agree.
    pub fn to_list(&self) -> Vec<(IVec3, VoxelId)> {
        let mut list: Vec<_> = self.lights.iter().map(|(p, id)| (*p, *id)).collect();
        list.sort_unstable_by_key(|(p, _)| (p.x, p.y, p.z));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::voxel::ids;
    use glam::UVec3;

    #[test]
    fn test_light_upsert() {
        let mut reg = LightRegistry::new(IdRanges::default());
        let pos = IVec3::new(1, 2, 3);

        reg.on_voxel_changed(pos, ids::LAMP_WHITE);
        assert_eq!(reg.get(pos), Some(ids::LAMP_WHITE));

        reg.on_voxel_changed(pos, ids::LAMP_BLUE);
        assert_eq!(reg.get(pos), Some(ids::LAMP_BLUE));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_overwrite_with_non_light_erases() {
        let mut reg = LightRegistry::new(IdRanges::default());
        let pos = IVec3::new(4, 0, 4);
        reg.on_voxel_changed(pos, ids::LAMP_WARM);

        reg.on_voxel_changed(pos, ids::STONE);
        assert!(!reg.contains(pos));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_non_light_on_unregistered_pos_is_noop() {
        let mut reg = LightRegistry::new(IdRanges::default());
        reg.on_voxel_changed(IVec3::ZERO, ids::GLASS_CLEAR);
        reg.on_voxel_changed(IVec3::ONE, VoxelId::EMPTY);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_to_list_sorted_without_duplicates() {
        let mut reg = LightRegistry::new(IdRanges::default());
        reg.on_voxel_changed(IVec3::new(5, 0, 0), ids::LAMP_WHITE);
        reg.on_voxel_changed(IVec3::new(0, 9, 0), ids::LAMP_WARM);
        reg.on_voxel_changed(IVec3::new(5, 0, 0), ids::LAMP_BLUE);

        let list = reg.to_list();
        assert_eq!(
            list,
            vec![
                (IVec3::new(0, 9, 0), ids::LAMP_WARM),
                (IVec3::new(5, 0, 0), ids::LAMP_BLUE),
            ]
        );
        assert_eq!(reg.to_list(), list);
    }

    #[test]
    fn test_rebuild_from_grid() {
        let mut grid = VoxelGrid::new(UVec3::new(1, 1, 1), 4);
        grid.set(IVec3::new(0, 0, 0), ids::LAMP_WHITE);
        grid.set(IVec3::new(1, 0, 0), ids::STONE);
        grid.set(IVec3::new(3, 3, 3), ids::LAMP_BLUE);

        let mut reg = LightRegistry::new(IdRanges::default());
        reg.on_voxel_changed(IVec3::new(2, 2, 2), ids::LAMP_WARM);
        reg.rebuild(&grid);

        assert_eq!(
            reg.to_list(),
            vec![
                (IVec3::new(0, 0, 0), ids::LAMP_WHITE),
                (IVec3::new(3, 3, 3), ids::LAMP_BLUE),
            ]
        );
    }
}
