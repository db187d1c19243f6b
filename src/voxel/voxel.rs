//! Voxel id type and the id-range classification

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Material kind stored in one grid cell - exactly 1 byte
#[repr(transparent)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
    Pod, Zeroable, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VoxelId(pub u8);

impl VoxelId {
    /// Empty/air voxel
    pub const EMPTY: VoxelId = VoxelId(0);

    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Check if voxel is empty (air)
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<u8> for VoxelId {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for VoxelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default palette. Ordering is solid kinds, then lights, then glass.
pub mod ids {
    use super::VoxelId;

    pub const STONE: VoxelId = VoxelId(1);
    pub const CLAY: VoxelId = VoxelId(2);
    pub const SAND: VoxelId = VoxelId(3);
    pub const DIRT: VoxelId = VoxelId(4);
    pub const GRASS: VoxelId = VoxelId(5);
    pub const SNOW: VoxelId = VoxelId(6);

    pub const LAMP_WHITE: VoxelId = VoxelId(7);
    pub const LAMP_WARM: VoxelId = VoxelId(8);
    pub const LAMP_BLUE: VoxelId = VoxelId(9);

    pub const GLASS_CLEAR: VoxelId = VoxelId(10);
    pub const GLASS_TINTED: VoxelId = VoxelId(11);
}

/// Closed classification of a voxel id
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoxelKind {
    Empty,
    Solid,
    Light,
    Glass,
    /// Outside every configured range
    Unregistered,
}

/// Contiguous id ranges: solids `1..light_start`, lights
/// `light_start..glass_start`, glass `glass_start..=max_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRanges {
    pub light_start: u8,
    pub glass_start: u8,
    pub max_id: u8,
}

impl Default for IdRanges {
    fn default() -> Self {
        Self {
            light_start: ids::LAMP_WHITE.0,
            glass_start: ids::GLASS_CLEAR.0,
            max_id: ids::GLASS_TINTED.0,
        }
    }
}

impl IdRanges {
    /// Classify an id. Reduces to range checks.
    pub fn kind(&self, id: VoxelId) -> VoxelKind {
        let raw = id.0;
        if raw == 0 {
            VoxelKind::Empty
        } else if raw < self.light_start {
            VoxelKind::Solid
        } else if raw < self.glass_start {
            VoxelKind::Light
        } else if raw <= self.max_id {
            VoxelKind::Glass
        } else {
            VoxelKind::Unregistered
        }
    }

    pub fn is_light(&self, id: VoxelId) -> bool {
        self.kind(id) == VoxelKind::Light
    }

    pub fn is_glass(&self, id: VoxelId) -> bool {
        self.kind(id) == VoxelKind::Glass
    }

    /// Empty or any configured kind
    pub fn is_registered(&self, id: VoxelId) -> bool {
        self.kind(id) != VoxelKind::Unregistered
    }

    /// Check the ranges are ordered and leave room for at least the empty id.
    pub fn is_well_formed(&self) -> bool {
        self.light_start >= 1
            && self.light_start <= self.glass_start
            && self.glass_start as u16 <= self.max_id as u16 + 1
    }
}
