//! Bind group layouts and render pipelines.

use super::shaders::{validate, ShaderLibrary, ShaderSource, PICK, SCENE, SKY, WATER};
use crate::error::{Error, Result};
use super::targets::{COLOR_FORMAT, DEPTH_FORMAT, PICK_FORMAT};
use super::uniforms::{CameraUniforms, MeshUniforms, UniformArena};

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const UV_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x2];
const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32x3];

/// One buffer layout per attribute stream: position, normal, uv and
/// (for `count == 4`) color.
pub fn stream_layouts(count: usize) -> Vec<wgpu::VertexBufferLayout<'static>> {
    let streams: [(&'static [wgpu::VertexAttribute], u64); 4] = [
        (&POSITION_ATTRIBUTES, 12),
        (&NORMAL_ATTRIBUTES, 12),
        (&UV_ATTRIBUTES, 8),
        (&COLOR_ATTRIBUTES, 12),
    ];
    streams
        .into_iter()
        .take(count)
        .map(|(attributes, stride)| wgpu::VertexBufferLayout {
            array_stride: stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        })
        .collect()
}

pub struct Layouts {
    /// Group 0, dynamic offset into the camera arena
    pub camera: wgpu::BindGroupLayout,
    /// Group 1, dynamic offset into the object arena
    pub object: wgpu::BindGroupLayout,
    /// Group 2 of the water pipeline: uniforms, captures, height maps, sampler
    pub water: wgpu::BindGroupLayout,
    pub post: wgpu::BindGroupLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let stages = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;

        let camera = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[UniformArena::<CameraUniforms>::layout_entry(0, stages)],
        });
        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[UniformArena::<MeshUniforms>::layout_entry(0, stages)],
        });

        let texture = |binding, view_dimension| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: stages,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension,
                multisampled: false,
            },
            count: None,
        };
        let sampler = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: stages,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let uniform = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: stages,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let water = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Water Bind Group Layout"),
            entries: &[
                uniform(0),
                texture(1, wgpu::TextureViewDimension::D2),
                texture(2, wgpu::TextureViewDimension::D2),
                texture(3, wgpu::TextureViewDimension::D2Array),
                sampler(4),
            ],
        });
        let post = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Post Bind Group Layout"),
            entries: &[
                texture(0, wgpu::TextureViewDimension::D2),
                sampler(1),
                uniform(2),
            ],
        });

        Self {
            camera,
            object,
            water,
            post,
        }
    }
}

/// Check that every `@location` input of `vs_main` in `source` is fed by
/// one of the first `streams` vertex buffers.
///
/// naga validates modules in isolation; this catches a shader whose vertex
/// interface disagrees with the buffer layouts before pipeline creation.
pub fn check_vertex_inputs(source: &ShaderSource, streams: usize) -> Result<()> {
    let module = validate(source)?;
    let link_error = |message: String| Error::ShaderLink {
        label: source.label,
        message,
    };
    let entry = module
        .entry_points
        .iter()
        .find(|e| e.stage == naga::ShaderStage::Vertex && e.name == "vs_main")
        .ok_or_else(|| link_error("no vertex entry point vs_main".to_string()))?;

    let mut locations = Vec::new();
    for argument in &entry.function.arguments {
        match &argument.binding {
            Some(binding) => locations.extend(location_of(binding)),
            None => {
                if let naga::TypeInner::Struct { members, .. } = &module.types[argument.ty].inner {
                    locations.extend(
                        members
                            .iter()
                            .filter_map(|m| m.binding.as_ref().and_then(location_of)),
                    );
                }
            }
        }
    }

    let provided: Vec<u32> = stream_layouts(streams)
        .iter()
        .flat_map(|layout| layout.attributes.iter().map(|a| a.shader_location))
        .collect();
    match locations.iter().find(|location| !provided.contains(location)) {
        Some(location) => Err(link_error(format!(
            "vertex input @location({}) has no vertex buffer ({} streams bound)",
            location, streams
        ))),
        None => Ok(()),
    }
}

fn location_of(binding: &naga::Binding) -> Option<u32> {
    match binding {
        naga::Binding::Location { location, .. } => Some(*location),
        naga::Binding::BuiltIn(_) => None,
    }
}

pub struct Pipelines {
    /// Pool and light box
    pub scene: wgpu::RenderPipeline,
    pub sky: wgpu::RenderPipeline,
    pub water: wgpu::RenderPipeline,
    pub pick: wgpu::RenderPipeline,
    pub post: wgpu::RenderPipeline,
}

impl Pipelines {
    /// Build every pipeline. A shader whose interface does not match its
    /// layout fails here with `ShaderLink` rather than on the first draw.
    pub fn new(
        device: &wgpu::Device,
        shaders: &ShaderLibrary,
        layouts: &Layouts,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        check_vertex_inputs(&SCENE, 4)?;
        check_vertex_inputs(&SKY, 3)?;
        check_vertex_inputs(&WATER, 3)?;
        check_vertex_inputs(&PICK, 3)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&layouts.camera, &layouts.object],
            push_constant_ranges: &[],
        });
        let water_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Water Pipeline Layout"),
            bind_group_layouts: &[&layouts.camera, &layouts.object, &layouts.water],
            push_constant_ranges: &[],
        });
        let post_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Post Pipeline Layout"),
            bind_group_layouts: &[&layouts.post],
            push_constant_ranges: &[],
        });

        let depth = |write: bool, compare| {
            Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: write,
                depth_compare: compare,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            })
        };

        let scene = mesh_pipeline(
            device,
            MeshPipeline {
                label: "Scene Render Pipeline",
                layout: &mesh_layout,
                module: &shaders.scene,
                streams: 4,
                format: COLOR_FORMAT,
                depth_stencil: depth(true, wgpu::CompareFunction::Less),
            },
        );
        // The sky is drawn first and never occludes anything
        let sky = mesh_pipeline(
            device,
            MeshPipeline {
                label: "Sky Render Pipeline",
                layout: &mesh_layout,
                module: &shaders.sky,
                streams: 3,
                format: COLOR_FORMAT,
                depth_stencil: depth(false, wgpu::CompareFunction::Always),
            },
        );
        let water = mesh_pipeline(
            device,
            MeshPipeline {
                label: "Water Render Pipeline",
                layout: &water_layout,
                module: &shaders.water,
                streams: 3,
                format: COLOR_FORMAT,
                depth_stencil: depth(true, wgpu::CompareFunction::Less),
            },
        );
        let pick = mesh_pipeline(
            device,
            MeshPipeline {
                label: "Pick Render Pipeline",
                layout: &mesh_layout,
                module: &shaders.pick,
                streams: 3,
                format: PICK_FORMAT,
                depth_stencil: None,
            },
        );

        let post = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Post Render Pipeline"),
            layout: Some(&post_layout),
            vertex: wgpu::VertexState {
                module: &shaders.post,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shaders.post,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: primitive_state(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(e) = pollster::block_on(device.pop_error_scope()) {
            return Err(Error::ShaderLink {
                label: "Render Pipelines",
                message: e.to_string(),
            });
        }
        log::debug!("Created render pipelines");

        Ok(Self {
            scene,
            sky,
            water,
            pick,
            post,
        })
    }
}

struct MeshPipeline<'a> {
    label: &'static str,
    layout: &'a wgpu::PipelineLayout,
    module: &'a wgpu::ShaderModule,
    streams: usize,
    format: wgpu::TextureFormat,
    depth_stencil: Option<wgpu::DepthStencilState>,
}

fn mesh_pipeline(device: &wgpu::Device, desc: MeshPipeline<'_>) -> wgpu::RenderPipeline {
    let buffers = stream_layouts(desc.streams);
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: desc.module,
            entry_point: Some("vs_main"),
            buffers: &buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: primitive_state(),
        depth_stencil: desc.depth_stencil,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

// Mirrored passes flip winding, so nothing is culled
fn primitive_state() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_layouts_match_shader_locations() {
        let layouts = stream_layouts(4);
        let locations: Vec<u32> = layouts
            .iter()
            .map(|l| l.attributes[0].shader_location)
            .collect();
        assert_eq!(locations, vec![0, 1, 2, 3]);
        assert_eq!(layouts[2].array_stride, 8);
        assert_eq!(stream_layouts(3).len(), 3);
    }

    #[test]
    fn test_shipped_shaders_match_their_streams() {
        check_vertex_inputs(&SCENE, 4).unwrap();
        check_vertex_inputs(&SKY, 3).unwrap();
        check_vertex_inputs(&WATER, 3).unwrap();
        check_vertex_inputs(&PICK, 3).unwrap();
        check_vertex_inputs(&crate::rendering::shaders::POST, 0).unwrap();
    }

    #[test]
    fn test_unfed_vertex_input_is_link_error() {
        // Scene reads a color stream that a three-stream draw never binds
        match check_vertex_inputs(&SCENE, 3) {
            Err(Error::ShaderLink { label, message }) => {
                assert_eq!(label, "Scene Shader");
                assert!(message.contains("@location(3)"), "{}", message);
            }
            other => panic!("expected link error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_vertex_entry_is_link_error() {
        let fragment_only = ShaderSource {
            label: "Fragment Only",
            wgsl: "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }",
        };
        assert!(matches!(
            check_vertex_inputs(&fragment_only, 3),
            Err(Error::ShaderLink { .. })
        ));
    }
}
