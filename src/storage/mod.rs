//! World persistence

pub mod disk_io;

pub use disk_io::{decode_world, encode_world, load_world, save_world, WORLD_FORMAT_VERSION};
