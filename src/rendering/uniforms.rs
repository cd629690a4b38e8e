//! Uniform buffer layouts and the per-frame dynamic-offset arena.

use std::marker::PhantomData;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::params::{ShadingMode, SurfaceControls, SurfaceParams};
use crate::reflection::CameraTransform;
use crate::ripples::RippleStore;

/// Ripple slots in the water uniform: capacity plus the sentinel
pub const RIPPLE_SLOTS: usize = 101;

/// Direction of the directional light
pub const SUN_DIRECTION: [f32; 3] = [0.0, -1.0, -1.0];

/// Per-pass camera and lighting (group 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
    pub light_pos: [f32; 4],
    pub light_dir: [f32; 4],
    /// time, shading mode, viewport width, viewport height
    pub misc: [f32; 4],
}

impl CameraUniforms {
    /// `eye` is the real eye position, also for mirrored passes, so lighting
    /// stays consistent between the captures and the main view.
    pub fn new(
        camera: &CameraTransform,
        eye: Vec3,
        light_pos: Vec3,
        time: f32,
        shading: ShadingMode,
        viewport: (u32, u32),
    ) -> Self {
        Self {
            view: camera.view.to_cols_array_2d(),
            proj: camera.projection.to_cols_array_2d(),
            view_proj: camera.view_proj().to_cols_array_2d(),
            eye: eye.extend(1.0).to_array(),
            light_pos: light_pos.extend(1.0).to_array(),
            light_dir: Vec3::from_array(SUN_DIRECTION).normalize().extend(0.0).to_array(),
            misc: [
                time,
                shading.shader_index() as f32,
                viewport.0 as f32,
                viewport.1 as f32,
            ],
        }
    }
}

/// How the scene shader colors a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfacePattern {
    Plain,
    /// Grout lines every `1 / repeats` of the UV range
    Tiles { repeats: f32 },
    /// Unlit, for the light box
    Emissive,
}

/// Per-draw transform and material (group 1)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub tint: [f32; 4],
    /// pattern, tile repeats, unused, unused
    pub params: [f32; 4],
}

impl MeshUniforms {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            tint: [1.0; 4],
            params: [0.0; 4],
        }
    }

    pub fn tinted(mut self, color: [f32; 3]) -> Self {
        self.tint = [color[0], color[1], color[2], 1.0];
        self
    }

    pub fn with_pattern(mut self, pattern: SurfacePattern) -> Self {
        self.params = match pattern {
            SurfacePattern::Plain => [0.0; 4],
            SurfacePattern::Tiles { repeats } => [1.0, repeats, 0.0, 0.0],
            SurfacePattern::Emissive => [2.0, 0.0, 0.0, 0.0],
        };
        self
    }
}

/// Wave parameters and live ripples (group 2, binding 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WaterUniforms {
    /// amplitude, wavelength, time, wave mode
    pub wave: [f32; 4],
    /// direction x, direction y, height-map layer, unused
    pub direction: [f32; 4],
    pub color: [f32; 4],
    /// half extent, height scale, unused, unused
    pub surface: [f32; 4],
    pub ripples: [[f32; 4]; RIPPLE_SLOTS],
}

impl WaterUniforms {
    pub fn new(
        surface: &SurfaceParams,
        controls: &SurfaceControls,
        time: f32,
        heightmap_layer: u32,
        ripples: &RippleStore,
    ) -> Self {
        let mut uniforms = Self {
            wave: [
                controls.amplitude,
                controls.wavelength,
                time,
                controls.wave.shader_index() as f32,
            ],
            direction: [
                surface.wave_direction[0],
                surface.wave_direction[1],
                heightmap_layer as f32,
                0.0,
            ],
            color: [surface.color[0], surface.color[1], surface.color[2], 1.0],
            surface: [surface.half_extent_m, surface.height_scale, 0.0, 0.0],
            ripples: [[0.0; 4]; RIPPLE_SLOTS],
        };
        ripples.write_uniform_slots(&mut uniforms.ripples);
        uniforms
    }
}

/// Round `size` up to a multiple of `alignment`
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// Ring of uniform slots addressed by dynamic offset.
///
/// Slots are handed out in order and recycled by `reset` at the start of each
/// submission; every draw in one submission gets its own slot.
pub struct UniformArena<T> {
    label: &'static str,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: u32,
    next: u32,
    _marker: PhantomData<T>,
}

impl<T: Pod> UniformArena<T> {
    /// Layout entry for a dynamic-offset uniform of type `T`
    pub fn layout_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
            },
            count: None,
        }
    }

    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        layout: &wgpu::BindGroupLayout,
        capacity: u32,
    ) -> Self {
        let stride = aligned_stride(
            std::mem::size_of::<T>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride * capacity.max(1) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
                }),
            }],
        });

        Self {
            label,
            buffer,
            bind_group,
            stride,
            capacity: capacity.max(1),
            next: 0,
            _marker: PhantomData,
        }
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }

    /// Stage `value` in the next free slot and return its dynamic offset,
    /// or `None` when every slot is taken.
    pub fn push(&mut self, queue: &wgpu::Queue, value: &T) -> Option<u32> {
        if self.next >= self.capacity {
            log::warn!("{} is full ({} slots), skipping draw", self.label, self.capacity);
            return None;
        }
        let offset = self.next as u64 * self.stride;
        queue.write_buffer(&self.buffer, offset, bytemuck::bytes_of(value));
        self.next += 1;
        Some(offset as u32)
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 256);
        assert_eq!(std::mem::size_of::<MeshUniforms>(), 160);
        assert_eq!(std::mem::size_of::<WaterUniforms>(), 64 + 16 * RIPPLE_SLOTS);
    }

    #[test]
    fn test_aligned_stride() {
        assert_eq!(aligned_stride(160, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(257, 256), 512);
        assert_eq!(aligned_stride(12, 0), 12);
    }

    #[test]
    fn test_water_uniforms_carry_ripples_and_sentinel() {
        let mut store = RippleStore::new(100, 30.0);
        store.add_ripple(0.5, Vec2::new(0.2, 0.3)).unwrap();

        let controls = SurfaceControls::default();
        let u = WaterUniforms::new(&SurfaceParams::default(), &controls, 1.5, 7, &store);

        assert_eq!(u.wave, [5.0, 0.2, 1.5, 0.0]);
        assert_eq!(u.direction[2], 7.0);
        assert_eq!(u.ripples[0], [0.2, 0.3, 0.5, 0.0]);
        assert_eq!(u.ripples[1][2], crate::ripples::SENTINEL_TIME);
    }

    #[test]
    fn test_full_ripple_store_fits_with_sentinel() {
        let mut store = RippleStore::new(100, 1000.0);
        for i in 0..100 {
            store.add_ripple(i as f32, Vec2::ZERO).unwrap();
        }
        let u = WaterUniforms::new(
            &SurfaceParams::default(),
            &SurfaceControls::default(),
            100.0,
            0,
            &store,
        );
        assert_eq!(u.ripples[0][2], 0.0);
        assert_eq!(u.ripples[99][2], 99.0);
        assert_eq!(u.ripples[100][2], crate::ripples::SENTINEL_TIME);
    }

    #[test]
    fn test_mesh_uniform_patterns() {
        let u = MeshUniforms::new(Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)))
            .tinted([0.5, 0.5, 0.5])
            .with_pattern(SurfacePattern::Tiles { repeats: 8.0 });
        assert_eq!(u.params[..2], [1.0, 8.0]);
        assert_eq!(u.tint, [0.5, 0.5, 0.5, 1.0]);
        // Inverse transpose of a scale halves the scaled axis
        assert_eq!(u.normal_matrix[0][0], 0.5);
    }
}
