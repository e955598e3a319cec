use glam::Vec2;

use crate::pipeline::{Effect, EffectFrame, ShaderPass};
use crate::uniforms::{ParamSpec, UniformBlock};

/// Pointer position used before the first pointer move; far outside the frame.
const OFFSCREEN: Vec2 = Vec2::new(-10.0, -10.0);

/// Inverts colours inside a circle around the pointer. Disabled by default.
pub struct MouseInvert {
    pass: ShaderPass,
}

impl MouseInvert {
    pub const NAME: &'static str = "mouse_invert";

    pub fn new() -> Self {
        let uniforms = UniformBlock::new()
            .with("mouse", OFFSCREEN)
            .with("radius", 0.1f32)
            .with("screen_aspect", 1.0f32);
        let pass = ShaderPass::new(Self::NAME, include_str!("shaders/mouse_invert.wgsl"), uniforms)
            .with_param(ParamSpec::new("radius", 0.0, 0.5, 0.01))
            .disabled();
        Self { pass }
    }
}

impl Default for MouseInvert {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for MouseInvert {
    fn pass(&self) -> &ShaderPass {
        &self.pass
    }

    fn pass_mut(&mut self) -> &mut ShaderPass {
        &mut self.pass
    }

    fn update(&mut self, frame: &EffectFrame) {
        let uniforms = self.pass.uniforms_mut();
        let mouse = frame.pointer_uv().unwrap_or(OFFSCREEN);
        let result = uniforms
            .set("mouse", mouse)
            .and_then(|()| uniforms.set("screen_aspect", frame.size.aspect()));
        if let Err(err) = result {
            log::error!("mouse_invert: {err}");
        }
    }
}
