//! watersurface library - interactive water surface with planar reflection,
//! refraction and click-to-ripple picking

pub mod camera;
pub mod error;
pub mod heightmap;
pub mod input;
pub mod mesh;
pub mod params;
pub mod picking;
pub mod postprocess;
pub mod reflection;
pub mod rendering;
pub mod ripples;
pub mod simulation;

pub use error::{Error, Result};
