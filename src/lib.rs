//! Brickworld - a chunked voxel world with brickmap-accelerated ray picking

pub mod core;
pub mod math;
pub mod voxel;
pub mod terrain;
pub mod generation;
pub mod lighting;
pub mod render;
pub mod storage;
