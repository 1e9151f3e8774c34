use std::cmp::Ordering;
use std::collections::{btree_map::Entry, BTreeMap};

use glam::Vec3;
use rayon::prelude::*;

use carvox_image::Image;

use crate::camera::Camera;
use crate::grid::VoxelGrid;
use crate::pointcloud::PointCloud;

/// Error types for the carving module.
///
/// All variants are raised by input validation before any voxel is visited;
/// per-voxel numeric edge cases (degenerate projections) reject the single
/// voxel instead of failing the run.
#[derive(Debug, thiserror::Error)]
pub enum CarveError {
    /// The camera list is empty.
    #[error("at least one camera is required")]
    NoCameras,

    /// A camera image has no pixels.
    #[error("camera {0} has an empty image ({1}x{2})")]
    EmptyImage(usize, usize, usize),
}

/// How the color-consistency predicate selects the views it compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorConsistency {
    /// Every candidate view must agree pairwise; the voxel color is the mean
    /// of all samples.
    AllViews,

    /// Keep only the `n` views whose sample is closest to the mean color and
    /// require pairwise agreement among those. This reduces the influence of
    /// occluded or grazing views on the assigned color.
    ClosestViews(usize),
}

/// Parameters of a carving run.
#[derive(Debug, Clone, Copy)]
pub struct CarveConfig {
    /// Maximum allowed per-channel difference (0-255 scale) between views
    /// considered color-consistent.
    pub color_threshold: u8,

    /// Per-channel distance to pure white below which a pixel is classified
    /// as background.
    pub background_tolerance: u8,

    /// View selection strategy for the color predicate.
    pub color_consistency: ColorConsistency,
}

impl Default for CarveConfig {
    fn default() -> Self {
        Self {
            color_threshold: 100,
            background_tolerance: 5,
            color_consistency: ColorConsistency::ClosestViews(3),
        }
    }
}

/// Axis a carving plane advances along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Planes of constant x.
    X,
    /// Planes of constant y.
    Y,
    /// Planes of constant z.
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// One directional pass of the carving plane across the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sweep {
    /// The axis the plane advances along.
    pub axis: Axis,
    /// Whether the plane travels toward increasing coordinates.
    pub positive: bool,
}

impl Sweep {
    /// The six signed axis directions.
    pub const ALL: [Sweep; 6] = [
        Sweep {
            axis: Axis::X,
            positive: true,
        },
        Sweep {
            axis: Axis::X,
            positive: false,
        },
        Sweep {
            axis: Axis::Y,
            positive: true,
        },
        Sweep {
            axis: Axis::Y,
            positive: false,
        },
        Sweep {
            axis: Axis::Z,
            positive: true,
        },
        Sweep {
            axis: Axis::Z,
            positive: false,
        },
    ];

    /// Whether a camera at `position` lies behind the plane at `plane_coord`
    /// with respect to the direction of travel.
    ///
    /// The region behind the plane has already been swept, so visibility
    /// toward those cameras is resolved; a camera exactly on the plane counts
    /// as behind.
    fn camera_behind(&self, position: Vec3, plane_coord: f32) -> bool {
        let c = position[self.axis.index()];
        if self.positive {
            c <= plane_coord
        } else {
            c >= plane_coord
        }
    }
}

/// Accepted voxels keyed by their integer grid index.
///
/// Keying by index rather than float position makes deduplication exact, and
/// the map ordering is lexicographic in `(x, y, z)`, which matches the
/// position ordering of the final cloud. On duplicate insertion the first
/// color wins.
#[derive(Debug, Default)]
pub struct VoxelSet {
    voxels: BTreeMap<[usize; 3], [f32; 3]>,
}

impl VoxelSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a voxel; returns `false` if the index was already present, in
    /// which case the existing color is kept.
    pub fn insert(&mut self, index: [usize; 3], color: [f32; 3]) -> bool {
        match self.voxels.entry(index) {
            Entry::Vacant(entry) => {
                entry.insert(color);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Number of voxels in the set.
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Union with another set, keeping this set's color on collisions.
    pub fn merge(&mut self, other: VoxelSet) {
        for (index, color) in other.voxels {
            self.voxels.entry(index).or_insert(color);
        }
    }

    /// Convert into a point cloud ordered lexicographically by grid index.
    pub fn into_pointcloud(self, grid: &VoxelGrid) -> PointCloud {
        let mut points = Vec::with_capacity(self.voxels.len());
        let mut colors = Vec::with_capacity(self.voxels.len());
        for (index, color) in self.voxels {
            points.push(grid.world_position(index).to_array());
            colors.push(color);
        }
        PointCloud::new(points, colors)
    }
}

/// Per-predicate rejection counters for a pass.
#[derive(Debug, Default, Clone, Copy)]
struct Rejections {
    bounds: usize,
    silhouette: usize,
    color: usize,
}

impl Rejections {
    fn add(&mut self, other: Rejections) {
        self.bounds += other.bounds;
        self.silhouette += other.silhouette;
        self.color += other.color;
    }
}

/// Carve the grid in a single pass, considering every camera for every
/// predicate.
///
/// A voxel survives when its projection lands inside every camera frame, no
/// camera samples a background pixel, and the sampled colors agree per
/// [`CarveConfig::color_consistency`]. Accepted voxels carry the mean color
/// of the agreeing views, scaled to `[0, 1]`.
///
/// # Errors
///
/// Fails with [`CarveError`] if the camera list is empty or any camera image
/// has no pixels.
pub fn carve(
    cameras: &[Camera],
    grid: &VoxelGrid,
    config: &CarveConfig,
) -> Result<PointCloud, CarveError> {
    validate_cameras(cameras)?;

    let accepted = carve_pass(cameras, grid, config, None);
    log::info!("carved {} consistent voxels", accepted.len());

    Ok(accepted.into_pointcloud(grid))
}

/// Carve the grid with six directional sweeps, one per signed axis.
///
/// Within each sweep only cameras behind the current plane, with respect to
/// the direction of travel, take part in the color-consistency predicate.
/// This approximates occlusion ordering: the swept half-space has already
/// been carved, so those cameras have an unobstructed view of the plane. The
/// result is the deduplicated union of the voxels accepted by any sweep.
///
/// # Errors
///
/// Same input validation as [`carve`].
pub fn carve_sweeps(
    cameras: &[Camera],
    grid: &VoxelGrid,
    config: &CarveConfig,
) -> Result<PointCloud, CarveError> {
    validate_cameras(cameras)?;

    let mut accepted = VoxelSet::new();
    for sweep in Sweep::ALL {
        let pass = carve_pass(cameras, grid, config, Some(sweep));
        accepted.merge(pass);
    }
    log::info!(
        "carved {} consistent voxels over {} sweeps",
        accepted.len(),
        Sweep::ALL.len()
    );

    Ok(accepted.into_pointcloud(grid))
}

fn validate_cameras(cameras: &[Camera]) -> Result<(), CarveError> {
    if cameras.is_empty() {
        return Err(CarveError::NoCameras);
    }
    for (i, camera) in cameras.iter().enumerate() {
        if camera.width() == 0 || camera.height() == 0 {
            return Err(CarveError::EmptyImage(i, camera.width(), camera.height()));
        }
    }
    Ok(())
}

/// Evaluate one full pass over the grid, plane by plane along the sweep axis
/// (the positive z axis when no sweep is given).
///
/// Planes are independent, so they are evaluated in parallel; the partial
/// sets are merged in plane order, which keeps the outcome deterministic.
fn carve_pass(
    cameras: &[Camera],
    grid: &VoxelGrid,
    config: &CarveConfig,
    sweep: Option<Sweep>,
) -> VoxelSet {
    let resolution = grid.resolution();

    let partials: Vec<(VoxelSet, Rejections)> = (0..resolution)
        .into_par_iter()
        .map(|plane| carve_plane(cameras, grid, config, sweep, plane))
        .collect();

    let mut accepted = VoxelSet::new();
    let mut rejections = Rejections::default();
    for (partial, partial_rejections) in partials {
        accepted.merge(partial);
        rejections.add(partial_rejections);
    }

    log::debug!(
        "pass {:?}: accepted {} voxels, rejected {} bounds / {} silhouette / {} color",
        sweep,
        accepted.len(),
        rejections.bounds,
        rejections.silhouette,
        rejections.color
    );

    accepted
}

/// Evaluate every voxel of one grid plane.
fn carve_plane(
    cameras: &[Camera],
    grid: &VoxelGrid,
    config: &CarveConfig,
    sweep: Option<Sweep>,
    plane: usize,
) -> (VoxelSet, Rejections) {
    let resolution = grid.resolution();
    let axis = sweep.map_or(Axis::Z, |s| s.axis);

    let mut accepted = VoxelSet::new();
    let mut rejections = Rejections::default();

    // Cameras taking part in the color predicate for this plane. Bounds and
    // silhouette always test against every camera.
    let color_cameras: Vec<usize> = match sweep {
        None => (0..cameras.len()).collect(),
        Some(sweep) => {
            let plane_coord = -0.5 + plane as f32 * grid.step();
            (0..cameras.len())
                .filter(|&i| sweep.camera_behind(cameras[i].position(), plane_coord))
                .collect()
        }
    };

    let mut pixel_positions = vec![(0i32, 0i32); cameras.len()];
    let mut samples = Vec::with_capacity(color_cameras.len());

    for u in 0..resolution {
        'voxel: for v in 0..resolution {
            let index = grid_index(axis, plane, u, v);
            let position = grid.world_position(index);

            // project into every camera; a degenerate homogeneous w counts
            // as landing outside the frame
            for (i, camera) in cameras.iter().enumerate() {
                match camera.project(position) {
                    Some((x, y)) if in_bounds(x, y, camera.width(), camera.height()) => {
                        pixel_positions[i] = (x, y);
                    }
                    _ => {
                        rejections.bounds += 1;
                        continue 'voxel;
                    }
                }
            }

            for (camera, &(x, y)) in cameras.iter().zip(&pixel_positions) {
                if is_background(sample(camera.image(), x, y), config.background_tolerance) {
                    rejections.silhouette += 1;
                    continue 'voxel;
                }
            }

            samples.clear();
            for &i in &color_cameras {
                let (x, y) = pixel_positions[i];
                samples.push(sample(cameras[i].image(), x, y));
            }

            match consistent_color(&samples, config) {
                Some(color) => {
                    accepted.insert(index, color);
                }
                None => rejections.color += 1,
            }
        }
    }

    (accepted, rejections)
}

/// Map a (plane, u, v) plane-iteration coordinate back to a grid index.
fn grid_index(axis: Axis, plane: usize, u: usize, v: usize) -> [usize; 3] {
    match axis {
        Axis::X => [plane, u, v],
        Axis::Y => [u, plane, v],
        Axis::Z => [u, v, plane],
    }
}

fn in_bounds(x: i32, y: i32, width: usize, height: usize) -> bool {
    x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height
}

/// Read the RGB triple at pixel `(x, y)`.
///
/// The bounds predicate guarantees the coordinates are valid here; an
/// out-of-range access is a contract violation and panics.
fn sample(image: &Image<u8, 3>, x: i32, y: i32) -> [u8; 3] {
    debug_assert!(in_bounds(x, y, image.width(), image.height()));
    let (x, y) = (x as usize, y as usize);
    [
        *image.get_unchecked([y, x, 0]),
        *image.get_unchecked([y, x, 1]),
        *image.get_unchecked([y, x, 2]),
    ]
}

fn is_background(rgb: [u8; 3], tolerance: u8) -> bool {
    rgb.iter().all(|&c| 255 - c <= tolerance)
}

/// Test the sampled colors for consistency and return the assigned voxel
/// color, per channel in `[0, 1]`, or `None` when the voxel is rejected.
///
/// Fewer than two candidate views can never qualify.
fn consistent_color(samples: &[[u8; 3]], config: &CarveConfig) -> Option<[f32; 3]> {
    if samples.len() < 2 {
        return None;
    }

    let selected = match config.color_consistency {
        ColorConsistency::AllViews => (0..samples.len()).collect::<Vec<_>>(),
        ColorConsistency::ClosestViews(n) => closest_to_mean(samples, n),
    };
    if selected.len() < 2 {
        return None;
    }

    // pairwise per-channel agreement among the selected views
    let threshold = config.color_threshold as i16;
    for (pos, &a) in selected.iter().enumerate() {
        for &b in &selected[pos + 1..] {
            for c in 0..3 {
                if (samples[a][c] as i16 - samples[b][c] as i16).abs() > threshold {
                    return None;
                }
            }
        }
    }

    let mut mean = [0.0f32; 3];
    for &i in &selected {
        for c in 0..3 {
            mean[c] += samples[i][c] as f32;
        }
    }
    let scale = 255.0 * selected.len() as f32;
    Some([mean[0] / scale, mean[1] / scale, mean[2] / scale])
}

/// Indices of the `n` samples nearest the mean color, measured by the
/// largest per-channel distance. Ties are broken by view order.
fn closest_to_mean(samples: &[[u8; 3]], n: usize) -> Vec<usize> {
    let count = samples.len() as f32;
    let mut mean = [0.0f32; 3];
    for s in samples {
        for c in 0..3 {
            mean[c] += s[c] as f32 / count;
        }
    }

    let mut ranked: Vec<(f32, usize)> = samples
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let distance = (0..3)
                .map(|c| (s[c] as f32 - mean[c]).abs())
                .fold(0.0f32, f32::max);
            (distance, i)
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });
    ranked.truncate(n);

    ranked.into_iter().map(|(_, i)| i).collect()
}
