use crate::pipeline::{Effect, EffectFrame, ShaderPass};
use crate::uniforms::{ParamSpec, UniformBlock};

/// One-bit ordered-dither halftone in square cells.
///
/// `pixel_size` is the cell width as a fraction of the frame width.
pub struct Halftone {
    pass: ShaderPass,
}

impl Halftone {
    pub const NAME: &'static str = "halftone";
    pub const DEFAULT_PIXEL_SIZE: f32 = 0.001;

    pub fn new() -> Self {
        let uniforms = UniformBlock::new()
            .with("pixel_size", Self::DEFAULT_PIXEL_SIZE)
            .with("screen_aspect", 1.0f32);
        let pass = ShaderPass::new(Self::NAME, include_str!("shaders/halftone.wgsl"), uniforms)
            .with_param(ParamSpec::new("pixel_size", 0.0, 0.01, 0.0001));
        Self { pass }
    }
}

impl Default for Halftone {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Halftone {
    fn pass(&self) -> &ShaderPass {
        &self.pass
    }

    fn pass_mut(&mut self) -> &mut ShaderPass {
        &mut self.pass
    }

    fn update(&mut self, frame: &EffectFrame) {
        if let Err(err) = self.pass.uniforms_mut().set("screen_aspect", frame.size.aspect()) {
            log::error!("halftone: {err}");
        }
    }
}
