use glam::Vec3;

/// A carved point cloud with per-point colors.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f32; 3]>,
    // The colors of the points, per channel in [0, 1].
    colors: Vec<[f32; 3]>,
}

impl PointCloud {
    /// Create a new point cloud from points and their colors.
    ///
    /// PRECONDITION: `points` and `colors` have the same length.
    pub fn new(points: Vec<[f32; 3]>, colors: Vec<[f32; 3]>) -> Self {
        debug_assert_eq!(points.len(), colors.len());
        Self { points, colors }
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    /// Get as reference the colors of the points in the point cloud.
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Get the minimum bound of the point cloud.
    pub fn get_min_bound(&self) -> Vec3 {
        let Some(first) = self.points.first() else {
            return Vec3::ZERO;
        };
        self.points
            .iter()
            .copied()
            .map(Vec3::from_array)
            .fold(Vec3::from_array(*first), |a, b| a.min(b))
    }

    /// Get the maximum bound of the point cloud.
    pub fn get_max_bound(&self) -> Vec3 {
        let Some(first) = self.points.first() else {
            return Vec3::ZERO;
        };
        self.points
            .iter()
            .copied()
            .map(Vec3::from_array)
            .fold(Vec3::from_array(*first), |a, b| a.max(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointcloud() {
        let pointcloud = PointCloud::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, -1.0]],
            vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        );

        assert_eq!(pointcloud.len(), 2);
        assert!(!pointcloud.is_empty());
        assert_eq!(pointcloud.points().len(), 2);
        assert_eq!(pointcloud.colors().len(), 2);

        assert_eq!(pointcloud.get_min_bound(), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(pointcloud.get_max_bound(), Vec3::new(1.0, 0.0, 0.0));
    }
}
