//! Index expansion for primitive modes the GPU cannot draw directly.
//!
//! Triangular patches are subdivided uniformly on the CPU; quads are split
//! into two triangles along their 0-2 diagonal.

use super::MeshBuffer;
use crate::error::{Error, Result};

/// Split every 4-index quad `[a, b, c, d]` into `[a, b, c, a, c, d]`
pub fn quads_to_triangles(indices: &[u32]) -> Result<Vec<u32>> {
    if indices.len() % 4 != 0 {
        return Err(Error::InvalidParameter(format!(
            "{} indices is not a whole number of quads",
            indices.len()
        )));
    }
    Ok(indices
        .chunks_exact(4)
        .flat_map(|q| [q[0], q[1], q[2], q[0], q[2], q[3]])
        .collect())
}

/// Subdivide each 3-vertex patch into `level²` triangles.
///
/// Every patch gets its own `(level + 1)(level + 2) / 2` vertices, with all
/// attribute streams interpolated barycentrically (normals renormalized).
/// Winding follows the source patch.
pub fn tessellate_patches(mesh: &MeshBuffer, level: u32) -> Result<MeshBuffer> {
    if level == 0 {
        return Err(Error::InvalidParameter(
            "tessellation level must be at least 1".to_string(),
        ));
    }
    if mesh.indices.len() % 3 != 0 {
        return Err(Error::InvalidParameter(format!(
            "{} indices is not a whole number of 3-point patches",
            mesh.indices.len()
        )));
    }
    mesh.validate()?;

    let patches = mesh.indices.len() / 3;
    let per_patch_vertices = ((level + 1) * (level + 2) / 2) as usize;
    let total_vertices = patches as u64 * per_patch_vertices as u64;
    if total_vertices > u32::MAX as u64 {
        return Err(Error::InvalidParameter(format!(
            "tessellation level {} produces {} vertices",
            level, total_vertices
        )));
    }
    let total_vertices = total_vertices as usize;
    let total_indices = patches * (level * level) as usize * 3;

    let mut out = MeshBuffer {
        positions: Vec::with_capacity(total_vertices * 3),
        normals: Vec::with_capacity(total_vertices * 3),
        uvs: Vec::with_capacity(total_vertices * 2),
        colors: mesh
            .colors
            .as_ref()
            .map(|_| Vec::with_capacity(total_vertices * 3)),
        indices: Vec::with_capacity(total_indices),
    };

    let l = level as f32;
    for patch in mesh.indices.chunks_exact(3) {
        let corners = [patch[0] as usize, patch[1] as usize, patch[2] as usize];
        let base = out.vertex_count() as u32;

        for row in 0..=level {
            for col in 0..=(level - row) {
                // Integer numerators keep edge vertices exactly on the edge
                let weights = [
                    (level - row - col) as f32 / l,
                    row as f32 / l,
                    col as f32 / l,
                ];

                push_interpolated::<3>(&mut out.positions, &mesh.positions, corners, weights);
                let n = out.normals.len();
                push_interpolated::<3>(&mut out.normals, &mesh.normals, corners, weights);
                normalize_tail(&mut out.normals[n..]);
                push_interpolated::<2>(&mut out.uvs, &mesh.uvs, corners, weights);
                if let (Some(dst), Some(src)) = (out.colors.as_mut(), mesh.colors.as_ref()) {
                    push_interpolated::<3>(dst, src, corners, weights);
                }
            }
        }

        let at = |row: u32, col: u32| base + row * (level + 1) - row * row.saturating_sub(1) / 2 + col;
        for row in 0..level {
            let width = level - row;
            for col in 0..width {
                out.indices
                    .extend_from_slice(&[at(row, col), at(row + 1, col), at(row, col + 1)]);
                if col + 1 < width {
                    out.indices.extend_from_slice(&[
                        at(row + 1, col),
                        at(row + 1, col + 1),
                        at(row, col + 1),
                    ]);
                }
            }
        }
    }

    Ok(out)
}

fn push_interpolated<const N: usize>(
    dst: &mut Vec<f32>,
    src: &[f32],
    corners: [usize; 3],
    weights: [f32; 3],
) {
    for component in 0..N {
        let value: f32 = corners
            .iter()
            .zip(weights)
            .map(|(&v, w)| src[v * N + component] * w)
            .sum();
        dst.push(value);
    }
}

fn normalize_tail(normal: &mut [f32]) {
    let len = normal.iter().map(|c| c * c).sum::<f32>().sqrt();
    if len > f32::EPSILON {
        normal.iter_mut().for_each(|c| *c /= len);
    }
}
