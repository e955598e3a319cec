use std::borrow::Cow;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::coords::ColorRgba;
use crate::uniforms::UniformBlock;

/// Which triangle faces are drawn and hit-tested.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

impl Side {
    pub(crate) fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        }
    }
}

/// Shader program of a material.
#[derive(Debug, Clone, PartialEq)]
pub enum Program {
    /// Unlit solid colour; reads the `color` uniform.
    Basic,

    /// User WGSL appended to the mesh prelude.
    ///
    /// The prelude declares `VertexInput` (locations 0..2: position, normal, uv)
    /// and `transforms` at group 0 (`view_proj`, `model`). The custom source
    /// declares its own uniform struct at `@group(1) @binding(0)` with one
    /// `vec4<f32>` field per uniform, in declaration order, and provides
    /// `vs_main` / `fs_main`.
    Custom {
        label: String,
        source: Cow<'static, str>,
    },
}

/// Program + uniform values + face culling of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub program: Program,
    pub uniforms: UniformBlock,
    pub side: Side,
}

impl Material {
    pub fn basic(color: ColorRgba) -> Self {
        Self {
            program: Program::Basic,
            uniforms: UniformBlock::new().with("color", glam::Vec4::from_array(color.to_array())),
            side: Side::Front,
        }
    }

    pub fn shader(
        label: impl Into<String>,
        source: impl Into<Cow<'static, str>>,
        uniforms: UniformBlock,
    ) -> Self {
        Self {
            program: Program::Custom {
                label: label.into(),
                source: source.into(),
            },
            uniforms,
            side: Side::Front,
        }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Identifies the render pipeline this material needs.
    ///
    /// Two materials with the same key share a pipeline; uniform values do not
    /// participate.
    pub fn pipeline_key(&self) -> u64 {
        let mut h = DefaultHasher::new();
        match &self.program {
            Program::Basic => 0u8.hash(&mut h),
            Program::Custom { source, .. } => {
                1u8.hash(&mut h);
                source.hash(&mut h);
            }
        }
        self.uniforms.len().hash(&mut h);
        self.side.hash(&mut h);
        h.finish()
    }

    pub(crate) fn label(&self) -> &str {
        match &self.program {
            Program::Basic => "basic",
            Program::Custom { label, .. } => label,
        }
    }
}
