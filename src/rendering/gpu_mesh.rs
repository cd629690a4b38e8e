//! GPU-resident meshes and the drawables that own them.

use wgpu::util::DeviceExt;

use super::uniforms::{MeshUniforms, UniformArena};
use crate::error::Result;
use crate::mesh::{
    background_plane, build_grid, prepare_for_upload, unit_box, unit_plane, MeshBuffer,
    PrimitiveMode, SourceQuad,
};

/// One buffer per attribute stream plus the index buffer
pub struct GpuMesh {
    streams: Vec<wgpu::Buffer>,
    index_buffer: wgpu::Buffer,
    element_count: u32,
}

impl GpuMesh {
    /// Upload every stream of `mesh` as a static buffer
    pub fn upload(device: &wgpu::Device, label: &str, mesh: &MeshBuffer) -> Self {
        let mut data: Vec<&[f32]> = vec![&mesh.positions, &mesh.normals, &mesh.uvs];
        if let Some(colors) = &mesh.colors {
            data.push(colors);
        }

        let streams = data
            .into_iter()
            .map(|stream| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(stream),
                    usage: wgpu::BufferUsages::VERTEX,
                })
            })
            .collect();

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            streams,
            index_buffer,
            element_count: mesh.indices.len() as u32,
        }
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        for (slot, buffer) in self.streams.iter().enumerate() {
            pass.set_vertex_buffer(slot as u32, buffer.slice(..));
        }
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        for buffer in &self.streams {
            buffer.destroy();
        }
        self.index_buffer.destroy();
    }
}

/// Geometry a drawable is built from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Flat grid of triangular patches, displaced in the water shader
    WaterSurface {
        quad_count: i32,
        half_extent: f32,
        tessellation_level: u32,
    },
    Box,
    Plane,
    BackgroundPlane,
}

impl Shape {
    pub fn primitive_mode(&self) -> PrimitiveMode {
        match self {
            Self::WaterSurface { .. } => PrimitiveMode::Patches { control_points: 3 },
            Self::Box | Self::Plane => PrimitiveMode::Triangles,
            Self::BackgroundPlane => PrimitiveMode::Quads,
        }
    }

    /// CPU mesh in upload form: patches subdivided, quads split
    pub fn build(&self) -> Result<MeshBuffer> {
        let (mesh, level) = match *self {
            Self::WaterSurface {
                quad_count,
                half_extent,
                tessellation_level,
            } => {
                let grid = build_grid(quad_count, &SourceQuad::water_patch(half_extent))?;
                (grid.mesh, tessellation_level)
            }
            Self::Box => (unit_box(), 1),
            Self::Plane => (unit_plane(), 1),
            Self::BackgroundPlane => (background_plane(), 1),
        };
        prepare_for_upload(mesh, self.primitive_mode(), level)
    }
}

/// What a draw call needs besides the pass
pub struct DrawResources<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub objects: &'a mut UniformArena<MeshUniforms>,
}

/// A shape and its GPU handle, allocated on first use
pub struct Drawable {
    label: &'static str,
    shape: Shape,
    gpu: Option<GpuMesh>,
}

impl Drawable {
    pub fn new(label: &'static str, shape: Shape) -> Self {
        Self {
            label,
            shape,
            gpu: None,
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.gpu.is_some()
    }

    /// Build and upload the mesh unless that already happened
    pub fn ensure_allocated(&mut self, device: &wgpu::Device) -> Result<&GpuMesh> {
        let gpu = match self.gpu.take() {
            Some(gpu) => gpu,
            None => {
                let mesh = self.shape.build()?;
                log::debug!(
                    "Uploading {}: {} vertices, {} indices",
                    self.label,
                    mesh.vertex_count(),
                    mesh.indices.len()
                );
                GpuMesh::upload(device, self.label, &mesh)
            }
        };
        Ok(self.gpu.insert(gpu))
    }

    /// Issue one indexed draw with `uniforms` in group 1.
    ///
    /// The caller sets the pipeline and group 0; vertex, index and group 1
    /// bindings are overwritten on every call.
    pub fn draw(
        &mut self,
        resources: &mut DrawResources<'_>,
        pass: &mut wgpu::RenderPass<'_>,
        uniforms: &MeshUniforms,
    ) -> Result<()> {
        let gpu = self.ensure_allocated(resources.device)?;
        let Some(offset) = resources.objects.push(resources.queue, uniforms) else {
            return Ok(());
        };
        pass.set_bind_group(1, resources.objects.bind_group(), &[offset]);
        gpu.bind(pass);
        pass.draw_indexed(0..gpu.element_count(), 0, 0..1);
        Ok(())
    }

    /// Free the GPU buffers; the next draw uploads again
    pub fn release(&mut self) {
        if self.gpu.take().is_some() {
            log::debug!("Released {}", self.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_surface_uploads_subdivided_patches() {
        let shape = Shape::WaterSurface {
            quad_count: 4,
            half_extent: 10.0,
            tessellation_level: 2,
        };
        let mesh = shape.build().unwrap();
        // 4 quads, 2 patches each, 4 sub-triangles per patch at level 2
        assert_eq!(mesh.indices.len(), 4 * 2 * 4 * 3);
        assert_eq!(mesh.stream_count(), 3);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_background_plane_quad_becomes_two_triangles() {
        let mesh = Shape::BackgroundPlane.build().unwrap();
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.stream_count(), 3);
    }

    #[test]
    fn test_decoration_carries_color_stream() {
        assert_eq!(Shape::Box.build().unwrap().stream_count(), 4);
        assert_eq!(Shape::Plane.build().unwrap().stream_count(), 4);
    }

    #[test]
    fn test_invalid_quad_count_fails_build() {
        let shape = Shape::WaterSurface {
            quad_count: 0,
            half_extent: 10.0,
            tessellation_level: 4,
        };
        assert!(shape.build().is_err());
    }

    #[test]
    fn test_drawable_starts_unallocated() {
        let mut drawable = Drawable::new("Box", Shape::Box);
        assert!(!drawable.is_allocated());
        drawable.release();
        assert!(!drawable.is_allocated());
    }
}
