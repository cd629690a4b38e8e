//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building geometry, loading assets or driving the GPU.
#[derive(Error, Debug)]
pub enum Error {
    /// A caller-supplied parameter is out of range (e.g. a non-positive quad count).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A transform could not be built from the supplied geometry.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),

    /// WGSL source failed to parse.
    #[error("shader '{label}' failed to compile:\n{message}")]
    ShaderCompile { label: &'static str, message: String },

    /// WGSL module parsed but failed validation or pipeline creation.
    #[error("shader '{label}' failed to link:\n{message}")]
    ShaderLink { label: &'static str, message: String },

    /// The device refused to create a texture or buffer.
    #[error("failed to allocate {target}: {message}")]
    ResourceAllocation { target: String, message: String },

    #[error("failed to load asset {path}")]
    Asset {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("asset format: {0}")]
    AssetFormat(String),

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to request device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to create surface")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("surface error")]
    Surface(#[from] wgpu::SurfaceError),

    /// Mapping the pick read-back buffer failed.
    #[error("pixel read-back failed")]
    ReadPixel(#[from] wgpu::BufferAsyncError),

    #[error("pixel read-back was cancelled")]
    ReadPixelCanceled(#[from] futures::channel::oneshot::Canceled),

    #[error("window creation failed")]
    Window(#[from] winit::error::OsError),

    #[error("event loop error")]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub type Result<T> = std::result::Result<T, Error>;
