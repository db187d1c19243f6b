//! Light-emitting voxel bookkeeping

pub mod registry;

pub use registry::LightRegistry;
