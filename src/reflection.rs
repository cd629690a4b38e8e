//! Mirrored and depth-compressed cameras for the planar reflection and
//! refraction captures, with oblique near-plane clipping.

use glam::{Mat4, Vec3, Vec4};

use crate::error::{Error, Result};

/// Depth range of the clip space a projection matrix targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipDepth {
    /// wgpu / Vulkan / D3D / Metal (`glam::Mat4::perspective_rh`)
    #[default]
    ZeroToOne,
    /// OpenGL (`glam::Mat4::perspective_rh_gl`)
    NegOneToOne,
}

/// Oriented plane `n·x + d = 0` with unit `n`; the positive side is kept when clipping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    /// Plane through `point` facing `normal` (normalized here)
    pub fn new(point: Vec3, normal: Vec3) -> Result<Self> {
        let length = normal.length();
        if !length.is_finite() || length <= f32::EPSILON {
            return Err(Error::InvalidGeometry("plane normal has zero length"));
        }
        let normal = normal / length;
        Ok(Self {
            normal,
            d: -normal.dot(point),
        })
    }

    /// Horizontal plane at height `y` facing up
    pub fn horizontal(y: f32) -> Self {
        Self {
            normal: Vec3::Y,
            d: -y,
        }
    }

    /// Same plane, opposite side kept
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }

    pub fn to_vec4(self) -> Vec4 {
        self.normal.extend(self.d)
    }
}

/// View and projection used by one render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub view: Mat4,
    pub projection: Mat4,
}

impl CameraTransform {
    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Affine reflection about `plane`: `x - 2(n·x + d)n`
pub fn reflection_matrix(plane: &Plane) -> Mat4 {
    let n = plane.normal;
    let linear = |axis: Vec3| axis - 2.0 * n.dot(axis) * n;
    Mat4::from_cols(
        linear(Vec3::X).extend(0.0),
        linear(Vec3::Y).extend(0.0),
        linear(Vec3::Z).extend(0.0),
        (-2.0 * plane.d * n).extend(1.0),
    )
}

/// Scale by `depth_scale` along the plane normal, about the plane:
/// `x - (1 - k)(n·x + d)n`
pub fn refraction_matrix(plane: &Plane, depth_scale: f32) -> Result<Mat4> {
    if !(depth_scale.is_finite() && depth_scale > 0.0) {
        return Err(Error::InvalidGeometry("refraction depth scale must be positive"));
    }
    let n = plane.normal;
    let s = 1.0 - depth_scale;
    let linear = |axis: Vec3| axis - s * n.dot(axis) * n;
    Ok(Mat4::from_cols(
        linear(Vec3::X).extend(0.0),
        linear(Vec3::Y).extend(0.0),
        linear(Vec3::Z).extend(0.0),
        (-s * plane.d * n).extend(1.0),
    ))
}

/// Replace the depth row of `projection` so its near plane is `clip_plane`
/// (given in view space). Geometry on the negative side of the plane is clipped.
///
/// Fails when the camera is not behind the plane, in which case the
/// oblique frustum degenerates.
pub fn oblique_projection(projection: Mat4, clip_plane: Vec4, depth: ClipDepth) -> Result<Mat4> {
    let corner = Vec4::new(clip_plane.x.signum(), clip_plane.y.signum(), 1.0, 1.0);
    let q = projection.inverse() * corner;
    let denom = clip_plane.dot(q);
    if !denom.is_finite() || denom <= 1e-8 {
        return Err(Error::InvalidGeometry("clip plane faces the camera"));
    }

    let row = match depth {
        ClipDepth::ZeroToOne => clip_plane / denom,
        ClipDepth::NegOneToOne => clip_plane * (2.0 / denom) - projection.row(3),
    };

    let mut m = projection;
    m.x_axis.z = row.x;
    m.y_axis.z = row.y;
    m.z_axis.z = row.z;
    m.w_axis.z = row.w;
    Ok(m)
}

/// Express a world-space plane in the space of `view`
fn plane_to_view(view: Mat4, plane: &Plane) -> Result<Vec4> {
    let det = view.determinant();
    if !det.is_finite() || det.abs() <= f32::EPSILON {
        return Err(Error::InvalidGeometry("view matrix is singular"));
    }
    Ok(view.inverse().transpose() * plane.to_vec4())
}

/// Camera that sees the scene mirrored in `plane`, clipped to the side the
/// plane normal points to.
pub fn reflected_camera(
    view: Mat4,
    projection: Mat4,
    plane: &Plane,
    depth: ClipDepth,
) -> Result<CameraTransform> {
    let view = view * reflection_matrix(plane);
    let clip = plane_to_view(view, plane)?;
    Ok(CameraTransform {
        view,
        projection: oblique_projection(projection, clip, depth)?,
    })
}

/// Camera that sees the scene behind `plane` with its depth compressed by
/// `depth_scale`, clipped to the side opposite the plane normal.
pub fn refracted_camera(
    view: Mat4,
    projection: Mat4,
    plane: &Plane,
    depth_scale: f32,
    depth: ClipDepth,
) -> Result<CameraTransform> {
    let view = view * refraction_matrix(plane, depth_scale)?;
    let clip = plane_to_view(view, &plane.flipped())?;
    Ok(CameraTransform {
        view,
        projection: oblique_projection(projection, clip, depth)?,
    })
}
