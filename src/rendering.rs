//! Multi-pass renderer: reflection and refraction captures, the water frame,
//! the post-process composite and the on-demand pick pass.

mod gpu_mesh;
mod pipelines;
pub mod scene;
pub mod shaders;
mod targets;
pub mod uniforms;

use std::sync::Arc;

use glam::Vec3;

pub use gpu_mesh::{DrawResources, Drawable, GpuMesh, Shape};
pub use pipelines::{stream_layouts, Layouts, Pipelines};
pub use targets::{CaptureTarget, TargetKind};
pub use uniforms::{CameraUniforms, MeshUniforms, SurfacePattern, UniformArena, WaterUniforms};

use crate::camera::OrbitCamera;
use crate::error::{Error, Result};
use crate::heightmap::HeightmapSequence;
use crate::params::{RenderConfig, SurfaceControls, SurfaceParams};
use crate::picking::{self, PixelOrigin, PICK_CLEAR};
use crate::postprocess::PostUniforms;
use crate::reflection::{self, CameraTransform, ClipDepth, Plane};
use crate::simulation::Simulation;

const CAMERA_SLOTS: u32 = 8;
const OBJECT_SLOTS: u32 = 64;
/// Pick read-back rows are padded to this many bytes
const READBACK_SIZE: u64 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64;

/// Everything one frame reads from the application
pub struct FrameContext<'a> {
    pub camera: &'a OrbitCamera,
    pub simulation: &'a Simulation,
    pub controls: &'a SurfaceControls,
    /// Bumped whenever a control that changes the picture is applied
    pub scene_revision: u64,
    /// Wall-clock seconds, drives the post-process animation
    pub elapsed: f32,
}

#[derive(Debug, Clone, Copy)]
enum CapturePass {
    Reflection,
    Refraction,
}

/// Why a capture pass was last skipped. A condition that persists across
/// frames (camera under the water) is reported once, not every frame.
#[derive(Debug, Default)]
struct SkipLatch {
    reason: Option<String>,
}

impl SkipLatch {
    /// Record a skip. True when `reason` differs from the previous one.
    fn skipped(&mut self, reason: String) -> bool {
        if self.reason.as_deref() == Some(reason.as_str()) {
            return false;
        }
        self.reason = Some(reason);
        true
    }

    /// Record a successful pass. True when the previous pass was skipped.
    fn resumed(&mut self) -> bool {
        self.reason.take().is_some()
    }
}

/// Rendering system managing the wgpu device, pipelines, targets and meshes
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    layouts: Layouts,
    pipelines: Pipelines,
    sampler: wgpu::Sampler,

    cameras: UniformArena<CameraUniforms>,
    objects: UniformArena<MeshUniforms>,
    water_buffer: wgpu::Buffer,
    water_bind_group: wgpu::BindGroup,
    post_buffer: wgpu::Buffer,
    post_bind_group: wgpu::BindGroup,
    heightmap_view: wgpu::TextureView,
    readback: wgpu::Buffer,

    reflection: CaptureTarget,
    refraction: CaptureTarget,
    frame: CaptureTarget,
    pick: CaptureTarget,

    water: Drawable,
    sky: Drawable,
    pool: Drawable,
    light_box: Drawable,

    surface_params: SurfaceParams,
    render_config: RenderConfig,
    /// Camera and scene revisions the current captures were made with
    captured: Option<(u64, u64)>,
    reflection_skip: SkipLatch,
    refraction_skip: SkipLatch,
}

impl RenderSystem {
    /// Create the device, every pipeline and every offscreen target.
    ///
    /// Shader and target failures abort here rather than on the first frame.
    pub async fn new(
        window: Arc<winit::window::Window>,
        surface_params: SurfaceParams,
        render_config: RenderConfig,
        heightmaps: &HeightmapSequence,
    ) -> Result<Self> {
        let size = window.inner_size();
        let size = (size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(Error::NoAdapter)?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .ok_or(Error::NoAdapter)?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.0,
            height: size.1,
            present_mode: if render_config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shaders = shaders::ShaderLibrary::new(&device)?;
        let layouts = Layouts::new(&device);
        let pipelines = Pipelines::new(&device, &shaders, &layouts, surface_format)?;

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Linear Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let cameras = UniformArena::new(&device, "Camera Uniforms", &layouts.camera, CAMERA_SLOTS);
        let objects = UniformArena::new(&device, "Object Uniforms", &layouts.object, OBJECT_SLOTS);

        let water_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Water Uniform Buffer"),
            size: std::mem::size_of::<WaterUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let post_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Post Uniform Buffer"),
            size: std::mem::size_of::<PostUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Pick Readback Buffer"),
            size: READBACK_SIZE,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let heightmap_view = upload_heightmaps(&device, &queue, heightmaps)?;

        let reflection = CaptureTarget::new(&device, "Reflection Target", TargetKind::Capture, size)?;
        let refraction = CaptureTarget::new(&device, "Refraction Target", TargetKind::Capture, size)?;
        let frame = CaptureTarget::new(&device, "Frame Target", TargetKind::Capture, size)?;
        let pick = CaptureTarget::new(&device, "Pick Target", TargetKind::Pick, size)?;

        let water_bind_group = water_bind_group(
            &device,
            &layouts,
            &water_buffer,
            &reflection,
            &refraction,
            &heightmap_view,
            &sampler,
        );
        let post_bind_group = post_bind_group(&device, &layouts, &post_buffer, &frame, &sampler);

        let mut water = Drawable::new(
            "Water Surface",
            Shape::WaterSurface {
                quad_count: surface_params.quad_count,
                half_extent: surface_params.half_extent_m,
                tessellation_level: surface_params.tessellation_level,
            },
        );
        // A bad quad count is a setup error, not a silent empty frame
        water.ensure_allocated(&device)?;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            layouts,
            pipelines,
            sampler,
            cameras,
            objects,
            water_buffer,
            water_bind_group,
            post_buffer,
            post_bind_group,
            heightmap_view,
            readback,
            reflection,
            refraction,
            frame,
            pick,
            water,
            sky: Drawable::new("Sky Face", Shape::BackgroundPlane),
            pool: Drawable::new("Pool Plane", Shape::Plane),
            light_box: Drawable::new("Light Box", Shape::Box),
            surface_params,
            render_config,
            captured: None,
            reflection_skip: SkipLatch::default(),
            refraction_skip: SkipLatch::default(),
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn aspect_ratio(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    /// Reconfigure the surface and recreate every target at the new size
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        let size = (width, height);
        let captures_changed = self.reflection.resize(&self.device, size)
            | self.refraction.resize(&self.device, size);
        let frame_changed = self.frame.resize(&self.device, size);
        self.pick.resize(&self.device, size);

        if captures_changed {
            self.water_bind_group = water_bind_group(
                &self.device,
                &self.layouts,
                &self.water_buffer,
                &self.reflection,
                &self.refraction,
                &self.heightmap_view,
                &self.sampler,
            );
        }
        if frame_changed {
            self.post_bind_group = post_bind_group(
                &self.device,
                &self.layouts,
                &self.post_buffer,
                &self.frame,
                &self.sampler,
            );
        }
        self.captured = None;
        log::info!("Resized to {}x{}", width, height);
    }

    /// Render and present one frame.
    ///
    /// A capture pass that cannot be built is skipped and the previous
    /// capture is reused; surface errors are returned to the caller.
    pub fn render(&mut self, ctx: &FrameContext<'_>) -> Result<()> {
        let output = self.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.cameras.reset();
        self.objects.reset();

        let main = CameraTransform {
            view: ctx.camera.view(),
            projection: ctx.camera.projection(self.aspect_ratio()),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let revisions = (ctx.camera.revision(), ctx.scene_revision);
        if ctx.controls.real_time_render || self.captured != Some(revisions) {
            let reflected = self.encode_capture(&mut encoder, CapturePass::Reflection, &main, ctx);
            let refracted = self.encode_capture(&mut encoder, CapturePass::Refraction, &main, ctx);
            self.captured = (reflected && refracted).then_some(revisions);
        }

        self.encode_frame(&mut encoder, &main, ctx)?;

        let (width, height) = self.size();
        let post = PostUniforms::new(ctx.controls.effects, ctx.elapsed, width, height);
        self.queue
            .write_buffer(&self.post_buffer, 0, bytemuck::bytes_of(&post));
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Post Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipelines.post);
            pass.set_bind_group(0, &self.post_bind_group, &[]);
            pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Encode one capture pass. Returns false when it was skipped.
    fn encode_capture(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        which: CapturePass,
        main: &CameraTransform,
        ctx: &FrameContext<'_>,
    ) -> bool {
        let plane = Plane::horizontal(self.surface_params.water_level_m);
        let (target, camera) = match which {
            CapturePass::Reflection => (
                &self.reflection,
                reflection::reflected_camera(main.view, main.projection, &plane, ClipDepth::ZeroToOne),
            ),
            CapturePass::Refraction => (
                &self.refraction,
                reflection::refracted_camera(
                    main.view,
                    main.projection,
                    &plane,
                    self.surface_params.refraction_depth_scale,
                    ClipDepth::ZeroToOne,
                ),
            ),
        };

        let camera = if target.is_stale() {
            Err("target is stale-sized".to_string())
        } else {
            camera.map_err(|e| e.to_string())
        };
        let camera = match camera {
            Ok(camera) => camera,
            Err(reason) => {
                self.note_skip(which, reason);
                return false;
            }
        };

        let mut pass = begin_capture_pass(encoder, target, self.render_config.clear_color);
        if let Err(e) = self.draw_decoration(&mut pass, &camera, ctx) {
            self.note_skip(which, e.to_string());
            return false;
        }
        if self.skip_latch(which).resumed() {
            log::info!("{:?} capture resumed", which);
        }
        true
    }

    fn skip_latch(&mut self, which: CapturePass) -> &mut SkipLatch {
        match which {
            CapturePass::Reflection => &mut self.reflection_skip,
            CapturePass::Refraction => &mut self.refraction_skip,
        }
    }

    fn note_skip(&mut self, which: CapturePass, reason: String) {
        if self.skip_latch(which).skipped(reason.clone()) {
            log::warn!("Skipping {:?} capture, reusing previous one: {}", which, reason);
        }
    }

    fn encode_frame(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        main: &CameraTransform,
        ctx: &FrameContext<'_>,
    ) -> Result<()> {
        let mut pass = begin_capture_pass(encoder, &self.frame, self.render_config.clear_color);
        let Some(camera_offset) = self.draw_decoration(&mut pass, main, ctx)? else {
            return Ok(());
        };

        let water = WaterUniforms::new(
            &self.surface_params,
            ctx.controls,
            ctx.simulation.time(),
            ctx.simulation.heightmap_frame() as u32,
            ctx.simulation.ripples(),
        );
        self.queue
            .write_buffer(&self.water_buffer, 0, bytemuck::bytes_of(&water));

        pass.set_pipeline(&self.pipelines.water);
        pass.set_bind_group(0, self.cameras.bind_group(), &[camera_offset]);
        pass.set_bind_group(2, &self.water_bind_group, &[]);
        let uniforms = MeshUniforms::new(scene::water_model(&self.surface_params))
            .tinted(self.surface_params.color);
        let mut resources = DrawResources {
            device: &self.device,
            queue: &self.queue,
            objects: &mut self.objects,
        };
        self.water.draw(&mut resources, &mut pass, &uniforms)
    }

    /// Draw sky, pool and light box with `camera`.
    ///
    /// Returns the camera slot so later draws in the same pass can reuse it,
    /// or `None` when the camera arena is exhausted.
    fn draw_decoration(
        &mut self,
        pass: &mut wgpu::RenderPass<'_>,
        camera: &CameraTransform,
        ctx: &FrameContext<'_>,
    ) -> Result<Option<u32>> {
        let eye = ctx.camera.eye();
        let light = ctx.simulation.light_position();
        let uniforms = CameraUniforms::new(
            camera,
            eye,
            light,
            ctx.simulation.time(),
            ctx.controls.shading,
            self.size(),
        );
        let Some(offset) = self.cameras.push(&self.queue, &uniforms) else {
            return Ok(None);
        };
        pass.set_bind_group(0, self.cameras.bind_group(), &[offset]);

        let mut resources = DrawResources {
            device: &self.device,
            queue: &self.queue,
            objects: &mut self.objects,
        };

        pass.set_pipeline(&self.pipelines.sky);
        for model in scene::sky_models(eye, self.render_config.sky_extent_m) {
            self.sky.draw(&mut resources, pass, &MeshUniforms::new(model))?;
        }

        pass.set_pipeline(&self.pipelines.scene);
        for model in scene::pool_models(&self.render_config) {
            let uniforms = MeshUniforms::new(model)
                .tinted(scene::POOL_COLOR)
                .with_pattern(SurfacePattern::Tiles {
                    repeats: scene::POOL_TILE_REPEATS,
                });
            self.pool.draw(&mut resources, pass, &uniforms)?;
        }

        let light_box = MeshUniforms::new(scene::light_box_model(
            light,
            self.render_config.light_box_size_m,
        ))
        .tinted(scene::LIGHT_BOX_COLOR)
        .with_pattern(SurfacePattern::Emissive);
        self.light_box.draw(&mut resources, pass, &light_box)?;

        Ok(Some(offset))
    }

    /// Render the water footprint into the pick target and read back the
    /// pixel under `cursor` (window pixels). `None` outside the window.
    pub fn pick(&mut self, cursor: (f64, f64), camera: &OrbitCamera) -> Result<Option<[f32; 4]>> {
        let Some((x, y)) =
            picking::window_to_target(cursor, self.size(), self.pick.size(), PixelOrigin::TopLeft)
        else {
            return Ok(None);
        };

        self.cameras.reset();
        self.objects.reset();
        let transform = CameraTransform {
            view: camera.view(),
            projection: camera.projection(self.aspect_ratio()),
        };
        let uniforms = CameraUniforms::new(
            &transform,
            camera.eye(),
            Vec3::ZERO,
            0.0,
            Default::default(),
            self.size(),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Pick Encoder"),
            });
        {
            let [r, g, b, a] = PICK_CLEAR;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Pick Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.pick.color_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(offset) = self.cameras.push(&self.queue, &uniforms) {
                pass.set_pipeline(&self.pipelines.pick);
                pass.set_bind_group(0, self.cameras.bind_group(), &[offset]);
                let mut resources = DrawResources {
                    device: &self.device,
                    queue: &self.queue,
                    objects: &mut self.objects,
                };
                let footprint = MeshUniforms::new(scene::pick_model(&self.surface_params));
                self.water.draw(&mut resources, &mut pass, &footprint)?;
            }
        }

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: self.pick.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &self.readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(READBACK_SIZE as u32),
                    rows_per_image: None,
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = self.readback.slice(..);
        let (sender, receiver) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        pollster::block_on(receiver)??;

        let pixel = {
            let data = slice.get_mapped_range();
            bytemuck::pod_read_unaligned::<[f32; 4]>(&data[..16])
        };
        self.readback.unmap();
        Ok(Some(pixel))
    }
}

impl Drop for RenderSystem {
    fn drop(&mut self) {
        for drawable in [
            &mut self.water,
            &mut self.sky,
            &mut self.pool,
            &mut self.light_box,
        ] {
            drawable.release();
        }
        log::debug!("Released GPU meshes");
    }
}

fn begin_capture_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    target: &CaptureTarget,
    clear: [f64; 4],
) -> wgpu::RenderPass<'e> {
    let [r, g, b, a] = clear;
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Capture Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color_view(),
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: target.depth_view().map(|view| {
            wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

/// Height maps must fit one 2D array texture on this device
fn check_heightmap_limits(heightmaps: &HeightmapSequence, limits: &wgpu::Limits) -> Result<()> {
    let max_side = limits.max_texture_dimension_2d;
    if heightmaps.width() > max_side || heightmaps.height() > max_side {
        return Err(Error::AssetFormat(format!(
            "height maps are {}x{}, device allows at most {}x{}",
            heightmaps.width(),
            heightmaps.height(),
            max_side,
            max_side
        )));
    }
    if heightmaps.frame_count() > limits.max_texture_array_layers as usize {
        return Err(Error::AssetFormat(format!(
            "{} height-map frames, device allows at most {} layers",
            heightmaps.frame_count(),
            limits.max_texture_array_layers
        )));
    }
    Ok(())
}

/// Upload every height-map frame as one layer of an R8 array texture
fn upload_heightmaps(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    heightmaps: &HeightmapSequence,
) -> Result<wgpu::TextureView> {
    check_heightmap_limits(heightmaps, &device.limits())?;
    let layers = heightmaps.frame_count().max(1) as u32;
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Heightmap Array"),
        size: wgpu::Extent3d {
            width: heightmaps.width(),
            height: heightmaps.height(),
            depth_or_array_layers: layers,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::R8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for layer in 0..heightmaps.frame_count() {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer as u32,
                },
                aspect: wgpu::TextureAspect::All,
            },
            heightmaps.frame(layer),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(heightmaps.width()),
                rows_per_image: Some(heightmaps.height()),
            },
            wgpu::Extent3d {
                width: heightmaps.width(),
                height: heightmaps.height(),
                depth_or_array_layers: 1,
            },
        );
    }
    log::info!(
        "Uploaded {} height maps ({}x{})",
        heightmaps.frame_count(),
        heightmaps.width(),
        heightmaps.height()
    );

    Ok(texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Heightmap Array View"),
        dimension: Some(wgpu::TextureViewDimension::D2Array),
        ..Default::default()
    }))
}

fn water_bind_group(
    device: &wgpu::Device,
    layouts: &Layouts,
    uniforms: &wgpu::Buffer,
    reflection: &CaptureTarget,
    refraction: &CaptureTarget,
    heightmaps: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Water Bind Group"),
        layout: &layouts.water,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(reflection.color_view()),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(refraction.color_view()),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(heightmaps),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn post_bind_group(
    device: &wgpu::Device,
    layouts: &Layouts,
    uniforms: &wgpu::Buffer,
    frame: &CaptureTarget,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Post Bind Group"),
        layout: &layouts.post,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(frame.color_view()),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniforms.as_entire_binding(),
            },
        ],
    })
}
