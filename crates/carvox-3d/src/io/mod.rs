/// Scene description reader (camera calibration text files).
pub mod scene;

/// PLY point cloud writer.
pub mod ply;
