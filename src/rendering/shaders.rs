//! WGSL sources, validated with naga before the device sees them.

use crate::error::{Error, Result};

/// A named WGSL program
#[derive(Debug, Clone, Copy)]
pub struct ShaderSource {
    pub label: &'static str,
    pub wgsl: &'static str,
}

pub const SCENE: ShaderSource = ShaderSource {
    label: "Scene Shader",
    wgsl: concat!(
        include_str!("../shaders/common.wgsl"),
        include_str!("../shaders/scene.wgsl")
    ),
};

pub const SKY: ShaderSource = ShaderSource {
    label: "Sky Shader",
    wgsl: concat!(
        include_str!("../shaders/common.wgsl"),
        include_str!("../shaders/sky.wgsl")
    ),
};

pub const WATER: ShaderSource = ShaderSource {
    label: "Water Shader",
    wgsl: concat!(
        include_str!("../shaders/common.wgsl"),
        include_str!("../shaders/water.wgsl")
    ),
};

pub const PICK: ShaderSource = ShaderSource {
    label: "Pick Shader",
    wgsl: concat!(
        include_str!("../shaders/common.wgsl"),
        include_str!("../shaders/pick.wgsl")
    ),
};

pub const POST: ShaderSource = ShaderSource {
    label: "Post Shader",
    wgsl: include_str!("../shaders/post.wgsl"),
};

pub const ALL: [ShaderSource; 5] = [SCENE, SKY, WATER, PICK, POST];

/// Parse and validate `source`.
///
/// Parse failures are `ShaderCompile`; type or binding errors found by the
/// validator are `ShaderLink`.
pub fn validate(source: &ShaderSource) -> Result<naga::Module> {
    let module = naga::front::wgsl::parse_str(source.wgsl).map_err(|e| Error::ShaderCompile {
        label: source.label,
        message: e.emit_to_string(source.wgsl),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| Error::ShaderLink {
        label: source.label,
        message: e.as_inner().to_string(),
    })?;

    Ok(module)
}

/// Validated shader modules for every pipeline
pub struct ShaderLibrary {
    pub scene: wgpu::ShaderModule,
    pub sky: wgpu::ShaderModule,
    pub water: wgpu::ShaderModule,
    pub pick: wgpu::ShaderModule,
    pub post: wgpu::ShaderModule,
}

impl ShaderLibrary {
    pub fn new(device: &wgpu::Device) -> Result<Self> {
        Ok(Self {
            scene: create_module(device, &SCENE)?,
            sky: create_module(device, &SKY)?,
            water: create_module(device, &WATER)?,
            pick: create_module(device, &PICK)?,
            post: create_module(device, &POST)?,
        })
    }
}

fn create_module(device: &wgpu::Device, source: &ShaderSource) -> Result<wgpu::ShaderModule> {
    validate(source)?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(source.label),
        source: wgpu::ShaderSource::Wgsl(source.wgsl.into()),
    });
    if let Some(e) = pollster::block_on(device.pop_error_scope()) {
        return Err(Error::ShaderLink {
            label: source.label,
            message: e.to_string(),
        });
    }
    log::debug!("Compiled {}", source.label);
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_shaders_validate() {
        for source in ALL {
            if let Err(e) = validate(&source) {
                panic!("{}", e);
            }
        }
    }

    #[test]
    fn test_entry_points_present() {
        for source in ALL {
            let module = validate(&source).unwrap();
            let names: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
            assert!(names.contains(&"vs_main"), "{} has no vs_main", source.label);
            assert!(names.contains(&"fs_main"), "{} has no fs_main", source.label);
        }
    }

    #[test]
    fn test_syntax_error_is_compile_error() {
        let broken = ShaderSource {
            label: "Broken",
            wgsl: "fn vs_main( -> {}",
        };
        match validate(&broken) {
            Err(Error::ShaderCompile { label, message }) => {
                assert_eq!(label, "Broken");
                assert!(!message.is_empty());
            }
            other => panic!("expected compile error, got {:?}", other.map(|_| ())),
        }
    }
}
