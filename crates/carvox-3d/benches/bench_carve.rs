use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use carvox_3d::camera::Camera;
use carvox_3d::carve::{carve, carve_sweeps, CarveConfig};
use carvox_3d::grid::VoxelGrid;
use carvox_image::{Image, ImageSize};
use glam::{Mat4, Vec3, Vec4};

/// A white 64x64 image with a centered 24x24 gray square.
fn square_image() -> Image<u8, 3> {
    let size = ImageSize {
        width: 64,
        height: 64,
    };
    let mut image = Image::from_size_val(size, 255u8).unwrap();
    let data = image.as_slice_mut();
    for y in 20..44 {
        for x in 20..44 {
            let offset = (y * 64 + x) * 3;
            data[offset..offset + 3].copy_from_slice(&[96, 96, 96]);
        }
    }
    image
}

/// Orthographic-style texture matrix dropping one world axis.
fn flat_texture(drop_axis: usize) -> Mat4 {
    let mut rows = [[0.0f32; 4]; 4];
    let mut row = 0;
    for axis in 0..3 {
        if axis == drop_axis {
            continue;
        }
        rows[row][axis] = 60.0;
        rows[row][3] = 32.0;
        row += 1;
    }
    rows[3][3] = 1.0;

    Mat4::from_cols(
        Vec4::new(rows[0][0], rows[1][0], rows[2][0], rows[3][0]),
        Vec4::new(rows[0][1], rows[1][1], rows[2][1], rows[3][1]),
        Vec4::new(rows[0][2], rows[1][2], rows[2][2], rows[3][2]),
        Vec4::new(rows[0][3], rows[1][3], rows[2][3], rows[3][3]),
    )
}

fn synthetic_cameras() -> Vec<Camera> {
    vec![
        Camera::from_texture_matrix(square_image(), flat_texture(2), Vec3::new(0.0, 0.0, -2.0)),
        Camera::from_texture_matrix(square_image(), flat_texture(1), Vec3::new(0.0, -2.0, 0.0)),
        Camera::from_texture_matrix(square_image(), flat_texture(0), Vec3::new(-2.0, 0.0, 0.0)),
    ]
}

fn bench_carve(c: &mut Criterion) {
    let cameras = synthetic_cameras();
    let config = CarveConfig::default();

    let mut group = c.benchmark_group("carve");
    for resolution in [16usize, 32, 64] {
        let grid = VoxelGrid::new(resolution).unwrap();

        group.bench_with_input(
            BenchmarkId::new("single_pass", resolution),
            &grid,
            |b, grid| b.iter(|| carve(&cameras, grid, &config).unwrap()),
        );

        group.bench_with_input(BenchmarkId::new("sweeps", resolution), &grid, |b, grid| {
            b.iter(|| carve_sweeps(&cameras, grid, &config).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_carve);
criterion_main!(benches);
