//! Hand-off of world state to the external renderer

pub mod snapshot;

pub use snapshot::{LightRecord, SnapshotTracker, WorldSnapshot};
