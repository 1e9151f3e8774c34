use argh::FromArgs;
use std::path::PathBuf;

use carvox_3d::camera::Camera;
use carvox_3d::carve::{carve_sweeps, CarveConfig};
use carvox_3d::grid::VoxelGrid;
use carvox_3d::io::{ply, scene};
use carvox_image::{Image, ImageSize};

#[derive(FromArgs)]
/// Carve a colored voxel model from a calibrated scene directory
struct Args {
    /// path to the scene directory (num.txt, camN.txt, imgN.png)
    #[argh(option)]
    scene_path: PathBuf,

    /// maximum per-channel color difference between consistent views
    #[argh(option, default = "100")]
    color_threshold: u8,

    /// voxel grid resolution per axis
    #[argh(option, default = "50")]
    grid_resolution: usize,

    /// output PLY file for the carved point cloud
    #[argh(option)]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    // read the camera calibration records
    let records = scene::read_scene_cameras(&args.scene_path)?;

    // decode the matching images and assemble the cameras
    let mut cameras = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let rgb = image::open(args.scene_path.join(format!("img{i}.png")))?.into_rgb8();
        let size = ImageSize {
            width: rgb.width() as usize,
            height: rgb.height() as usize,
        };
        let image = Image::<u8, 3>::new(size, rgb.into_raw())?;
        cameras.push(Camera::new(image, record.model_view, record.projection));
    }
    log::info!("loaded {} cameras", cameras.len());

    // carve the grid
    let grid = VoxelGrid::new(args.grid_resolution)?;
    let config = CarveConfig {
        color_threshold: args.color_threshold,
        ..Default::default()
    };
    let cloud = carve_sweeps(&cameras, &grid, &config)?;
    log::info!(
        "carved {} voxels, bounds {} to {}",
        cloud.len(),
        cloud.get_min_bound(),
        cloud.get_max_bound()
    );

    // write the carved cloud
    ply::write_ply_binary(&args.output, &cloud)?;

    Ok(())
}
