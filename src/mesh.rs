//! CPU-side mesh data: the procedural water grid, fixed decoration
//! primitives, and the index expansion applied before upload.

mod grid;
mod primitives;
mod tessellate;

pub use grid::{build_grid, grid_length, GridMesh, SourceQuad};
pub use primitives::{background_plane, unit_box, unit_plane};
pub use tessellate::{quads_to_triangles, tessellate_patches};

use crate::error::{Error, Result};

/// Primitive assembly used when a mesh is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    Triangles,
    /// Tessellation patches of `control_points` vertices each
    Patches { control_points: u32 },
    Quads,
}

impl PrimitiveMode {
    /// Number of indices that make up one primitive
    pub fn index_group(self) -> usize {
        match self {
            Self::Triangles => 3,
            Self::Patches { control_points } => control_points as usize,
            Self::Quads => 4,
        }
    }
}

/// Separate attribute streams plus element indices.
///
/// Positions and normals are packed xyz, UVs packed uv, colors packed rgb.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffer {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    /// Per-vertex color; background planes carry none
    pub colors: Option<Vec<f32>>,
    pub indices: Vec<u32>,
}

impl MeshBuffer {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of vertex attribute streams (3 without color, 4 with)
    pub fn stream_count(&self) -> usize {
        if self.colors.is_some() {
            4
        } else {
            3
        }
    }

    /// Fill the color stream with one color for every vertex
    pub fn with_uniform_color(mut self, color: [f32; 3]) -> Self {
        let count = self.vertex_count();
        self.colors = Some(color.iter().copied().cycle().take(count * 3).collect());
        self
    }

    /// Check stream lengths agree and every index names a vertex
    pub fn validate(&self) -> Result<()> {
        let count = self.vertex_count();
        if self.positions.len() % 3 != 0
            || self.normals.len() != count * 3
            || self.uvs.len() != count * 2
        {
            return Err(Error::InvalidParameter(format!(
                "attribute streams disagree: {} positions, {} normals, {} uvs",
                self.positions.len(),
                self.normals.len(),
                self.uvs.len()
            )));
        }
        if let Some(colors) = &self.colors {
            if colors.len() != count * 3 {
                return Err(Error::InvalidParameter(format!(
                    "color stream has {} floats for {} vertices",
                    colors.len(),
                    count
                )));
            }
        }
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(Error::InvalidParameter(format!(
                "index {} out of range for {} vertices",
                bad, count
            )));
        }
        Ok(())
    }
}

/// Expand a mesh into the triangle list that is uploaded for `mode`.
///
/// Patches are subdivided here (`tessellation_level` segments per edge) and
/// quads are split into two triangles each.
pub fn prepare_for_upload(
    mesh: MeshBuffer,
    mode: PrimitiveMode,
    tessellation_level: u32,
) -> Result<MeshBuffer> {
    mesh.validate()?;
    let group = mode.index_group();
    if group == 0 || mesh.indices.len() % group != 0 {
        return Err(Error::InvalidParameter(format!(
            "{} indices is not a whole number of {:?} primitives",
            mesh.indices.len(),
            mode
        )));
    }

    match mode {
        PrimitiveMode::Triangles => Ok(mesh),
        PrimitiveMode::Patches { control_points: 3 } => {
            tessellate_patches(&mesh, tessellation_level)
        }
        PrimitiveMode::Patches { control_points } => Err(Error::InvalidParameter(format!(
            "only triangular patches are supported, got {} control points",
            control_points
        ))),
        PrimitiveMode::Quads => {
            let indices = quads_to_triangles(&mesh.indices)?;
            Ok(MeshBuffer { indices, ..mesh })
        }
    }
}
