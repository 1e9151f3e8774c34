use carvox_image::Image;
use glam::{Mat4, Vec3, Vec4};

/// Homogeneous `w` magnitude below which a projection is treated as degenerate.
const MIN_HOMOGENEOUS_W: f32 = 1e-6;

/// A calibrated view: an RGB image plus the combined matrix that projects
/// world space directly into its pixel coordinates.
///
/// The texture matrix folds model-view, projection and the viewport
/// scale/flip into a single 4x4 transform, so projecting a voxel center is
/// one matrix-vector product followed by the perspective divide.
#[derive(Debug, Clone)]
pub struct Camera {
    image: Image<u8, 3>,
    texture_matrix: Mat4,
    position: Vec3,
}

impl Camera {
    /// Create a camera from its calibration matrices.
    ///
    /// # Arguments
    ///
    /// * `image` - The RGB image captured by this camera.
    /// * `model_view` - The 4x4 world-to-camera transform.
    /// * `projection` - The 4x4 camera-to-clip transform.
    ///
    /// The world-space camera position is recovered as the translation
    /// component of the inverse model-view matrix.
    pub fn new(image: Image<u8, 3>, model_view: Mat4, projection: Mat4) -> Self {
        let viewport = viewport_matrix(image.width(), image.height());
        let texture_matrix = viewport * projection * model_view;
        let position = (model_view.inverse() * Vec4::new(0.0, 0.0, 0.0, 1.0)).truncate();
        Self {
            image,
            texture_matrix,
            position,
        }
    }

    /// Create a camera from an explicit texture matrix and world position.
    ///
    /// Useful when the combined world-to-pixel transform is already known,
    /// e.g. for synthetic setups.
    pub fn from_texture_matrix(image: Image<u8, 3>, texture_matrix: Mat4, position: Vec3) -> Self {
        Self {
            image,
            texture_matrix,
            position,
        }
    }

    /// The image captured by this camera.
    pub fn image(&self) -> &Image<u8, 3> {
        &self.image
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.image.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.image.height()
    }

    /// The combined world-to-pixel transform.
    pub fn texture_matrix(&self) -> &Mat4 {
        &self.texture_matrix
    }

    /// The camera center in world coordinates.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Project a world-space point to the nearest integer pixel coordinates.
    ///
    /// Returns `None` when the homogeneous `w` component is near zero and the
    /// perspective divide is undefined. The returned coordinates are not
    /// clamped to the image bounds.
    pub fn project(&self, point: Vec3) -> Option<(i32, i32)> {
        let h = self.texture_matrix * point.extend(1.0);
        if h.w.abs() < MIN_HOMOGENEOUS_W {
            return None;
        }
        Some(((h.x / h.w).round() as i32, (h.y / h.w).round() as i32))
    }
}

/// The viewport transform mapping clip space to pixel coordinates.
///
/// Composed of the normalized-device scale/offset into `[0, 1]`, the scale
/// to pixel units and the image-space y-flip, so that clip `(-1, 1)` lands on
/// pixel `(0, 0)`.
fn viewport_matrix(width: usize, height: usize) -> Mat4 {
    let width = width as f32;
    let height = height as f32;
    let flip = Mat4::from_translation(Vec3::new(0.0, height, 0.0));
    let img_scale = Mat4::from_scale(Vec3::new(width, -height, 1.0));
    let translate = Mat4::from_translation(Vec3::splat(0.5));
    let scale = Mat4::from_scale(Vec3::splat(0.5));
    flip * img_scale * translate * scale
}
