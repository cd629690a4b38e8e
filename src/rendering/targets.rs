//! Offscreen render targets: reflection, refraction, the composite frame and
//! the pick buffer.

use crate::error::{Error, Result};

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;
/// Full-precision UVs survive the read-back
pub const PICK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// What a target is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Sampled color plus depth/stencil (reflection, refraction, frame)
    Capture,
    /// Copied back to the CPU one pixel at a time, no depth
    Pick,
}

struct Attachments {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: Option<wgpu::TextureView>,
    size: (u32, u32),
}

/// Color texture plus optional depth/stencil, sized to the viewport
pub struct CaptureTarget {
    label: &'static str,
    kind: TargetKind,
    attachments: Attachments,
    /// Set when a resize failed and the previous, wrongly sized texture is kept
    stale: bool,
}

impl CaptureTarget {
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        kind: TargetKind,
        size: (u32, u32),
    ) -> Result<Self> {
        let attachments = allocate(device, label, kind, size)?;
        log::info!("Created {} ({}x{})", label, size.0, size.1);
        Ok(Self {
            label,
            kind,
            attachments,
            stale: false,
        })
    }

    /// Recreate at `size`.
    ///
    /// Returns true when new textures were created; bind groups sampling this
    /// target must then be rebuilt. On failure the old textures stay in use.
    pub fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) -> bool {
        if size.0 == 0 || size.1 == 0 || size == self.attachments.size {
            return false;
        }
        match allocate(device, self.label, self.kind, size) {
            Ok(attachments) => {
                self.attachments = attachments;
                self.stale = false;
                true
            }
            Err(e) => {
                log::warn!(
                    "{}; keeping {}x{} texture",
                    e,
                    self.attachments.size.0,
                    self.attachments.size.1
                );
                self.stale = true;
                false
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn size(&self) -> (u32, u32) {
        self.attachments.size
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.attachments.color
    }

    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.attachments.color_view
    }

    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        self.attachments.depth_view.as_ref()
    }
}

fn allocate(
    device: &wgpu::Device,
    label: &'static str,
    kind: TargetKind,
    (width, height): (u32, u32),
) -> Result<Attachments> {
    if width == 0 || height == 0 {
        return Err(Error::ResourceAllocation {
            target: label.to_string(),
            message: format!("zero-sized viewport {}x{}", width, height),
        });
    }
    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let (format, usage) = match kind {
        TargetKind::Capture => (
            COLOR_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        ),
        TargetKind::Pick => (
            PICK_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        ),
    };

    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let color = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });
    let depth = match kind {
        TargetKind::Capture => Some(device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })),
        TargetKind::Pick => None,
    };

    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());
    if let Some(e) = validation.or(out_of_memory) {
        return Err(Error::ResourceAllocation {
            target: label.to_string(),
            message: e.to_string(),
        });
    }

    Ok(Attachments {
        color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
        depth_view: depth.map(|d| d.create_view(&wgpu::TextureViewDescriptor::default())),
        color,
        size: (width, height),
    })
}
