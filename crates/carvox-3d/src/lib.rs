#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Calibrated camera model and world-to-pixel projection.
pub mod camera;

/// Space-carving consistency predicates and sweep passes.
pub mod carve;

/// Voxel grid geometry.
pub mod grid;

/// I/O utilities for scene descriptions and carved point clouds.
pub mod io;

/// Carved point cloud container.
pub mod pointcloud;
