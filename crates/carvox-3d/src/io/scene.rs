use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use glam::Mat4;

/// Error types for the scene module.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Error reading or writing file
    #[error("error reading or writing file {0}")]
    IoError(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error {0}")]
    ParseError(String),

    /// A camera file holds the wrong number of matrix entries
    #[error("camera file {0} holds {1} values, expected 32")]
    InvalidMatrixCount(PathBuf, usize),
}

/// One camera calibration record of a scene: the model-view and projection
/// matrices of a calibrated view.
#[derive(Debug, Clone)]
pub struct CameraRecord {
    /// The 4x4 world-to-camera transform.
    pub model_view: Mat4,
    /// The 4x4 camera-to-clip transform.
    pub projection: Mat4,
}

/// Read the number of cameras from a scene's `num.txt`.
///
/// # Arguments
///
/// * `path` - The path to the `num.txt` file.
pub fn read_camera_count(path: impl AsRef<Path>) -> Result<usize, SceneError> {
    let contents = read_to_string(path)?;
    let token = contents
        .split_whitespace()
        .next()
        .ok_or_else(|| SceneError::ParseError("empty num.txt".to_string()))?;
    parse_part(token)
}

/// Read one `camN.txt` calibration file.
///
/// The file holds 32 whitespace-separated floats: the model-view matrix
/// followed by the projection matrix, both in column-major order.
///
/// # Arguments
///
/// * `path` - The path to the camera file.
pub fn read_camera_txt(path: impl AsRef<Path>) -> Result<CameraRecord, SceneError> {
    let contents = read_to_string(&path)?;
    let values = contents
        .split_whitespace()
        .map(parse_part::<f32>)
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() != 32 {
        return Err(SceneError::InvalidMatrixCount(
            path.as_ref().to_path_buf(),
            values.len(),
        ));
    }

    let mut model_view = [0.0f32; 16];
    model_view.copy_from_slice(&values[..16]);
    let mut projection = [0.0f32; 16];
    projection.copy_from_slice(&values[16..]);

    Ok(CameraRecord {
        model_view: Mat4::from_cols_array(&model_view),
        projection: Mat4::from_cols_array(&projection),
    })
}

/// Read all camera records of a scene directory.
///
/// The directory layout is `num.txt` plus `cam0.txt .. camN-1.txt`; the
/// matching images (`img0.png` ..) are decoded by the caller.
///
/// # Arguments
///
/// * `dir` - The path to the scene directory.
pub fn read_scene_cameras(dir: impl AsRef<Path>) -> Result<Vec<CameraRecord>, SceneError> {
    let dir = dir.as_ref();
    let count = read_camera_count(dir.join("num.txt"))?;

    let mut records = Vec::with_capacity(count);
    for i in 0..count {
        records.push(read_camera_txt(dir.join(format!("cam{i}.txt")))?);
    }

    Ok(records)
}

fn read_to_string(path: impl AsRef<Path>) -> Result<String, SceneError> {
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    Ok(contents)
}

fn parse_part<T: std::str::FromStr>(s: &str) -> Result<T, SceneError>
where
    T::Err: std::fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| SceneError::ParseError(format!("{}: {}", s, e)))
}
