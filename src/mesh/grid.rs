//! Subdivided quad grid for the water patch.

use glam::{Vec2, Vec3};

use super::MeshBuffer;
use crate::error::{Error, Result};

/// Corner attributes of the quadrilateral that the grid tiles.
///
/// Corner order: 0 = (s=0, t=0), 1 = (s=0, t=1), 2 = (s=1, t=1), 3 = (s=1, t=0),
/// where `s` runs along a grid row (columns) and `t` across rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceQuad {
    pub positions: [[f32; 3]; 4],
    pub normals: [[f32; 3]; 4],
    pub uvs: [[f32; 2]; 4],
}

impl SourceQuad {
    /// Flat square on the XZ plane, facing +Y, `half_extent` meters to a side
    pub fn water_patch(half_extent: f32) -> Self {
        let h = half_extent;
        Self {
            positions: [[-h, 0.0, -h], [-h, 0.0, h], [h, 0.0, h], [h, 0.0, -h]],
            normals: [[0.0, 1.0, 0.0]; 4],
            uvs: [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]],
        }
    }

    fn position_at(&self, s: f32, t: f32) -> Vec3 {
        let [c0, c1, c2, c3] = self.positions.map(Vec3::from_array);
        bilerp(c0, c1, c2, c3, s, t)
    }

    fn normal_at(&self, s: f32, t: f32) -> Vec3 {
        let [c0, c1, c2, c3] = self.normals.map(Vec3::from_array);
        bilerp(c0, c1, c2, c3, s, t).normalize_or_zero()
    }

    fn uv_at(&self, s: f32, t: f32) -> Vec2 {
        let [c0, c1, c2, c3] = self.uvs.map(Vec2::from_array);
        bilerp(c0, c1, c2, c3, s, t)
    }
}

fn bilerp<T>(c0: T, c1: T, c2: T, c3: T, s: f32, t: f32) -> T
where
    T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
{
    c0 * ((1.0 - s) * (1.0 - t)) + c1 * ((1.0 - s) * t) + c2 * (s * t) + c3 * (s * (1.0 - t))
}

/// Grid mesh plus the side length it was built with
#[derive(Debug, Clone, PartialEq)]
pub struct GridMesh {
    /// Quads per side: `ceil(sqrt(quad_count))`
    pub grid_length: u32,
    pub mesh: MeshBuffer,
}

impl GridMesh {
    pub fn quad_count(&self) -> usize {
        (self.grid_length as usize).pow(2)
    }
}

/// Quads per side for a requested quad count
pub fn grid_length(quad_count: i32) -> Result<u32> {
    if quad_count <= 0 {
        return Err(Error::InvalidParameter(format!(
            "quad count must be positive, got {}",
            quad_count
        )));
    }
    let length = (quad_count as f64).sqrt().ceil() as u32;
    Ok(length.max(1))
}

/// Tile `source` with `ceil(sqrt(quad_count))²` quads.
///
/// Each quad owns four vertices (no welding) and six indices, emitted row by
/// row. Quad (row, col) covers `s ∈ [col/n, (col+1)/n]`, `t ∈ [row/n, (row+1)/n]`.
pub fn build_grid(quad_count: i32, source: &SourceQuad) -> Result<GridMesh> {
    let n = grid_length(quad_count)?;
    let quads = n as u64 * n as u64;
    if quads * 4 > u32::MAX as u64 {
        return Err(Error::InvalidParameter(format!(
            "{} quads exceed the 32-bit index range",
            quads
        )));
    }
    let quads = quads as usize;

    let mut positions = Vec::with_capacity(quads * 12);
    let mut normals = Vec::with_capacity(quads * 12);
    let mut uvs = Vec::with_capacity(quads * 8);
    let mut indices = Vec::with_capacity(quads * 6);

    let step = 1.0 / n as f32;
    for row in 0..n {
        let t0 = row as f32 * step;
        let t1 = (row + 1) as f32 * step;
        for col in 0..n {
            let s0 = col as f32 * step;
            let s1 = (col + 1) as f32 * step;

            // Same corner order as the source quad
            for (s, t) in [(s0, t0), (s0, t1), (s1, t1), (s1, t0)] {
                positions.extend_from_slice(&source.position_at(s, t).to_array());
                normals.extend_from_slice(&source.normal_at(s, t).to_array());
                uvs.extend_from_slice(&source.uv_at(s, t).to_array());
            }

            let base = (row * n + col) * 4;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    Ok(GridMesh {
        grid_length: n,
        mesh: MeshBuffer {
            positions,
            normals,
            uvs,
            colors: None,
            indices,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_water_grid_counts() {
        let grid = build_grid(1600, &SourceQuad::water_patch(100.0)).unwrap();

        assert_eq!(grid.grid_length, 40);
        assert_eq!(grid.quad_count(), 1600);
        assert_eq!(grid.mesh.vertex_count(), 6400);
        assert_eq!(grid.mesh.indices.len(), 9600);
        assert!(grid.mesh.validate().is_ok());
    }

    #[test]
    fn test_non_square_count_rounds_up() {
        assert_eq!(grid_length(1).unwrap(), 1);
        assert_eq!(grid_length(2).unwrap(), 2);
        assert_eq!(grid_length(17).unwrap(), 5);
        assert_eq!(grid_length(25).unwrap(), 5);
    }

    #[test]
    fn test_non_positive_count_is_rejected() {
        let source = SourceQuad::water_patch(1.0);
        assert!(matches!(build_grid(0, &source), Err(Error::InvalidParameter(_))));
        assert!(matches!(build_grid(-3, &source), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_grid_covers_source_corners() {
        let grid = build_grid(9, &SourceQuad::water_patch(100.0)).unwrap();
        let p = &grid.mesh.positions;

        // First vertex of first quad is corner 0, third vertex of the last quad is corner 2
        assert_eq!(&p[0..3], &[-100.0, 0.0, -100.0]);
        let last_quad = (grid.quad_count() - 1) * 12;
        assert_eq!(&p[last_quad + 6..last_quad + 9], &[100.0, 0.0, 100.0]);
    }

    #[test]
    fn test_uv_tiles_unit_square_row_major() {
        let grid = build_grid(4, &SourceQuad::water_patch(10.0)).unwrap();
        let uv = &grid.mesh.uvs;

        // Quad 1 is row 0, column 1: s starts at 0.5, t at 0.0
        assert_eq!(&uv[8..10], &[0.5, 0.0]);
        // Quad 2 is row 1, column 0
        assert_eq!(&uv[16..18], &[0.0, 0.5]);
        assert!(uv.iter().all(|&c| (0.0..=1.0).contains(&c)));
    }

    #[test]
    fn test_quads_do_not_share_vertices() {
        let grid = build_grid(4, &SourceQuad::water_patch(1.0)).unwrap();
        for (quad, tri) in grid.mesh.indices.chunks(6).enumerate() {
            let base = quad as u32 * 4;
            assert_eq!(tri, &[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let source = SourceQuad::water_patch(37.5);
        assert_eq!(build_grid(300, &source).unwrap(), build_grid(300, &source).unwrap());
    }
}
