use glam::Vec3;

/// Error types for the voxel grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The grid resolution would produce a degenerate step size.
    #[error("grid resolution must be at least 2, got {0}")]
    InvalidResolution(usize),
}

/// A cubic grid of candidate voxel centers spanning `[-0.5, 0.5]^3`.
///
/// Voxel `(0, 0, 0)` sits at `(-0.5, -0.5, -0.5)` and voxel
/// `(r-1, r-1, r-1)` at `(0.5, 0.5, 0.5)`, with a step of `1 / (r - 1)`
/// between neighboring centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoxelGrid {
    resolution: usize,
}

impl VoxelGrid {
    /// Create a grid with `resolution` voxels per axis.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidResolution`] if `resolution < 2`.
    pub fn new(resolution: usize) -> Result<Self, GridError> {
        if resolution < 2 {
            return Err(GridError::InvalidResolution(resolution));
        }
        Ok(Self { resolution })
    }

    /// Number of voxels per axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Distance between neighboring voxel centers.
    pub fn step(&self) -> f32 {
        1.0 / (self.resolution - 1) as f32
    }

    /// Total number of candidate voxels in the grid.
    pub fn num_voxels(&self) -> usize {
        self.resolution * self.resolution * self.resolution
    }

    /// World-space center of the voxel at the given grid index.
    pub fn world_position(&self, index: [usize; 3]) -> Vec3 {
        let step = self.step();
        Vec3::new(
            -0.5 + index[0] as f32 * step,
            -0.5 + index[1] as f32 * step,
            -0.5 + index[2] as f32 * step,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grid_corners() -> Result<(), GridError> {
        let grid = VoxelGrid::new(5)?;
        assert_eq!(grid.resolution(), 5);
        assert_eq!(grid.num_voxels(), 125);
        assert_relative_eq!(grid.step(), 0.25, epsilon = 1e-6);

        let lo = grid.world_position([0, 0, 0]);
        assert_relative_eq!(lo.x, -0.5, epsilon = 1e-6);
        assert_relative_eq!(lo.y, -0.5, epsilon = 1e-6);
        assert_relative_eq!(lo.z, -0.5, epsilon = 1e-6);

        let hi = grid.world_position([4, 4, 4]);
        assert_relative_eq!(hi.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(hi.y, 0.5, epsilon = 1e-6);
        assert_relative_eq!(hi.z, 0.5, epsilon = 1e-6);

        Ok(())
    }

    #[test]
    fn grid_minimal_resolution() {
        assert!(VoxelGrid::new(0).is_err());
        assert!(VoxelGrid::new(1).is_err());

        let grid = VoxelGrid::new(2).unwrap();
        assert_relative_eq!(grid.step(), 1.0, epsilon = 1e-6);
        let hi = grid.world_position([1, 1, 1]);
        assert_relative_eq!(hi.x, 0.5, epsilon = 1e-6);
    }
}
