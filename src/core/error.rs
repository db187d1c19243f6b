//! Error types for the voxel world

use glam::IVec3;
use thiserror::Error;

/// Main error type for world construction, edits and persistence
#[derive(Debug, Error)]
pub enum Error {
    /// A voxel coordinate outside the grid extent was addressed by an edit.
    #[error("voxel position {pos} is outside the world")]
    OutOfBounds { pos: IVec3 },

    /// A voxel id that is not part of the configured id ranges.
    #[error("voxel id {0} is not registered")]
    UnregisteredVoxel(u8),

    /// Placement against a face normal that is not a unit axis vector.
    #[error("placement normal {normal} is not a unit axis vector")]
    InvalidNormal { normal: IVec3 },

    /// Placement target already holds a voxel.
    #[error("voxel position {pos} is already occupied")]
    Occupied { pos: IVec3 },

    #[error("invalid world configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Save data that is corrupt or written by an incompatible version.
    #[error("world format error: {0}")]
    Format(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
