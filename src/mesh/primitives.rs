//! Fixed decoration primitives. All are unit-sized and placed by their model
//! matrix.

use glam::Vec3;

use super::MeshBuffer;

/// Face normal plus two tangents with `u × v = normal`
const BOX_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Append one counter-clockwise face centered at `center`
fn push_face(mesh: &mut MeshBuffer, center: Vec3, normal: Vec3, u: Vec3, v: Vec3) {
    let base = mesh.vertex_count() as u32;
    let corners = [-u - v, u - v, u + v, -u + v];
    for (corner, uv) in corners.iter().zip(QUAD_UVS) {
        mesh.positions
            .extend_from_slice(&(center + *corner * 0.5).to_array());
        mesh.normals.extend_from_slice(&normal.to_array());
        mesh.uvs.extend_from_slice(&uv);
    }
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// Unit cube centered on the origin: 24 vertices, 36 triangle indices, white
pub fn unit_box() -> MeshBuffer {
    let mut mesh = MeshBuffer::default();
    for (n, u, v) in BOX_FACES {
        let normal = Vec3::from_array(n);
        push_face(
            &mut mesh,
            normal * 0.5,
            normal,
            Vec3::from_array(u),
            Vec3::from_array(v),
        );
    }
    mesh.with_uniform_color([1.0, 1.0, 1.0])
}

/// Unit square on the XZ plane facing +Y: 4 vertices, 6 triangle indices, white
pub fn unit_plane() -> MeshBuffer {
    let mut mesh = MeshBuffer::default();
    push_face(&mut mesh, Vec3::ZERO, Vec3::Y, Vec3::X, Vec3::NEG_Z);
    mesh.with_uniform_color([1.0, 1.0, 1.0])
}

/// Sky face: 2x2 square at z = -1 facing +Z, one quad (4 indices), no color stream
pub fn background_plane() -> MeshBuffer {
    let mut mesh = MeshBuffer::default();
    let h = 1.0;
    let corners = [[-h, -h, -1.0], [h, -h, -1.0], [h, h, -1.0], [-h, h, -1.0]];
    for (corner, uv) in corners.iter().zip(QUAD_UVS) {
        mesh.positions.extend_from_slice(corner);
        mesh.normals.extend_from_slice(&[0.0, 0.0, 1.0]);
        mesh.uvs.extend_from_slice(&uv);
    }
    mesh.indices.extend_from_slice(&[0, 1, 2, 3]);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_layout() {
        let mesh = unit_box();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.stream_count(), 4);
        assert!(mesh.validate().is_ok());
        assert!(mesh.positions.iter().all(|c| c.abs() <= 0.5 + 1e-6));
    }

    #[test]
    fn test_box_faces_wind_outward() {
        let mesh = unit_box();
        let p = |i: u32| {
            let i = i as usize * 3;
            Vec3::new(mesh.positions[i], mesh.positions[i + 1], mesh.positions[i + 2])
        };
        for tri in mesh.indices.chunks_exact(3) {
            let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
            let facing = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(facing.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_plane_faces_up() {
        let mesh = unit_plane();
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.positions.chunks_exact(3).all(|p| p[1] == 0.0));
        let p = |i: usize| Vec3::from_slice(&mesh.positions[i * 3..i * 3 + 3]);
        assert!((p(1) - p(0)).cross(p(2) - p(0)).y > 0.0);
    }

    #[test]
    fn test_background_plane_is_colorless_quad() {
        let mesh = background_plane();
        assert_eq!(mesh.stream_count(), 3);
        assert_eq!(mesh.indices.len(), 4);
        assert!(mesh.validate().is_ok());
    }
}
