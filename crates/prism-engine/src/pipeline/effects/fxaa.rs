use glam::Vec2;

use crate::coords::SurfaceSize;
use crate::pipeline::{Effect, ShaderPass};
use crate::uniforms::UniformBlock;

/// Fast approximate anti-aliasing.
///
/// `resolution` holds the texel size of the physical render target and is
/// refreshed on resize only.
pub struct Fxaa {
    pass: ShaderPass,
}

impl Fxaa {
    pub const NAME: &'static str = "fxaa";

    pub fn new() -> Self {
        let uniforms = UniformBlock::new().with("resolution", Vec2::ONE);
        Self {
            pass: ShaderPass::new(Self::NAME, include_str!("shaders/fxaa.wgsl"), uniforms),
        }
    }
}

impl Default for Fxaa {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Fxaa {
    fn pass(&self) -> &ShaderPass {
        &self.pass
    }

    fn pass_mut(&mut self) -> &mut ShaderPass {
        &mut self.pass
    }

    fn resize(&mut self, size: SurfaceSize) {
        if !size.is_valid() {
            return;
        }
        let texel = Vec2::new(
            1.0 / (size.width * size.pixel_ratio),
            1.0 / (size.height * size.pixel_ratio),
        );
        if let Err(err) = self.pass.uniforms_mut().set("resolution", texel) {
            log::error!("fxaa: {err}");
        }
    }
}
