//! Placement of the decoration around the water: sky faces, pool and light box.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Quat, Vec3};

use crate::params::{RenderConfig, SurfaceParams};

/// Tint of the pool tiles
pub const POOL_COLOR: [f32; 3] = [0.85, 0.9, 0.95];
/// Grout lines per plane
pub const POOL_TILE_REPEATS: f32 = 12.0;
pub const LIGHT_BOX_COLOR: [f32; 3] = [1.0, 0.95, 0.6];

/// Six inward-facing sky faces centered on `eye`
pub fn sky_models(eye: Vec3, extent: f32) -> [Mat4; 6] {
    let faces = [
        Quat::IDENTITY,
        Quat::from_rotation_y(FRAC_PI_2),
        Quat::from_rotation_y(PI),
        Quat::from_rotation_y(-FRAC_PI_2),
        Quat::from_rotation_x(FRAC_PI_2),
        Quat::from_rotation_x(-FRAC_PI_2),
    ];
    faces.map(|rotation| {
        Mat4::from_scale_rotation_translation(Vec3::splat(extent), rotation, eye)
    })
}

/// Pool floor followed by the four walls, every face pointing into the pool
pub fn pool_models(config: &RenderConfig) -> [Mat4; 5] {
    let h = config.pool_half_extent_m;
    let width = 2.0 * h;
    let height = config.pool_wall_height_m;
    let floor_y = -config.pool_depth_m;
    let wall_y = floor_y + height * 0.5;

    // The unit plane spans X and Z; each wall rotation turns one of them vertical
    let x_walls = Vec3::new(height, 1.0, width);
    let z_walls = Vec3::new(width, 1.0, height);

    [
        Mat4::from_scale_rotation_translation(
            Vec3::new(width, 1.0, width),
            Quat::IDENTITY,
            Vec3::new(0.0, floor_y, 0.0),
        ),
        Mat4::from_scale_rotation_translation(
            x_walls,
            Quat::from_rotation_z(FRAC_PI_2),
            Vec3::new(h, wall_y, 0.0),
        ),
        Mat4::from_scale_rotation_translation(
            x_walls,
            Quat::from_rotation_z(-FRAC_PI_2),
            Vec3::new(-h, wall_y, 0.0),
        ),
        Mat4::from_scale_rotation_translation(
            z_walls,
            Quat::from_rotation_x(-FRAC_PI_2),
            Vec3::new(0.0, wall_y, h),
        ),
        Mat4::from_scale_rotation_translation(
            z_walls,
            Quat::from_rotation_x(FRAC_PI_2),
            Vec3::new(0.0, wall_y, -h),
        ),
    ]
}

pub fn light_box_model(light: Vec3, size: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(Vec3::splat(size), Quat::IDENTITY, light)
}

/// Rest plane at the water level with the wave height scaled vertically
pub fn water_model(surface: &SurfaceParams) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, surface.water_level_m, 0.0))
        * Mat4::from_scale(Vec3::new(1.0, surface.height_scale, 1.0))
}

/// Flat water footprint for the pick pass
pub fn pick_model(surface: &SurfaceParams) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, surface.water_level_m, 0.0))
}
