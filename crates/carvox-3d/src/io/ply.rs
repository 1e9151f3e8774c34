use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::pointcloud::PointCloud;

/// Error types for the PLY module.
#[derive(Debug, thiserror::Error)]
pub enum PlyError {
    /// Failed to write PLY file
    #[error("Failed to write PLY file")]
    Io(#[from] std::io::Error),
}

/// Write a point cloud as a binary little-endian PLY file.
///
/// Each vertex carries `x y z` float positions and `red green blue` uchar
/// colors; the `[0, 1]` colors of the cloud are scaled to `0..=255`.
///
/// # Arguments
///
/// * `path` - The output file path.
/// * `pointcloud` - The cloud to serialize.
pub fn write_ply_binary(path: impl AsRef<Path>, pointcloud: &PointCloud) -> Result<(), PlyError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    write!(
        writer,
        "ply\nformat binary_little_endian 1.0\nelement vertex {}\nproperty float x\nproperty float y\nproperty float z\nproperty uchar red\nproperty uchar green\nproperty uchar blue\nend_header\n",
        pointcloud.len()
    )?;

    for (point, color) in pointcloud.points().iter().zip(pointcloud.colors()) {
        for v in point {
            writer.write_all(&v.to_le_bytes())?;
        }
        for c in color {
            writer.write_all(&[(c * 255.0).round().clamp(0.0, 255.0) as u8])?;
        }
    }
    writer.flush()?;

    Ok(())
}
