use glam::Vec2;

use crate::coords::SurfaceSize;
use crate::render::{FullscreenPass, RenderCtx, RenderError};
use crate::time::FrameTime;
use crate::uniforms::{ParamError, ParamSpec, Tunable, UniformBlock};

/// Per-frame inputs an effect may pull into its uniforms.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EffectFrame {
    pub elapsed: f32,
    pub delta: f32,
    pub size: SurfaceSize,
    /// Latest pointer position in NDC, if the pointer has moved yet.
    pub pointer_ndc: Option<Vec2>,
}

impl EffectFrame {
    pub fn new(time: FrameTime, size: SurfaceSize, pointer_ndc: Option<Vec2>) -> Self {
        Self {
            elapsed: time.elapsed,
            delta: time.delta,
            size,
            pointer_ndc,
        }
    }

    /// Pointer in texture coordinates (top-left origin, `[0, 1]`).
    pub fn pointer_uv(&self) -> Option<Vec2> {
        self.pointer_ndc
            .map(|p| Vec2::new(p.x * 0.5 + 0.5, 0.5 - p.y * 0.5))
    }
}

/// A post-processing stage.
///
/// Every effect wraps a [`ShaderPass`] that holds its name, enabled flag,
/// uniforms and tunable parameters; implementors add per-frame and resize
/// behaviour on top.
pub trait Effect {
    fn pass(&self) -> &ShaderPass;

    fn pass_mut(&mut self) -> &mut ShaderPass;

    /// Called once per frame before rendering, enabled or not.
    fn update(&mut self, frame: &EffectFrame) {
        let _ = frame;
    }

    /// Called when the output surface changes size.
    fn resize(&mut self, size: SurfaceSize) {
        let _ = size;
    }
}

/// Fullscreen fragment shader stage with named uniforms.
///
/// Tunable parameters map onto float uniforms of the same name.
pub struct ShaderPass {
    name: String,
    enabled: bool,
    uniforms: UniformBlock,
    params: Vec<ParamSpec>,
    gpu: FullscreenPass,
}

impl ShaderPass {
    /// `body` is the WGSL fragment program; see [`FullscreenPass`] for the
    /// declarations it can rely on.
    pub fn new(name: impl Into<String>, body: &str, uniforms: UniformBlock) -> Self {
        let name = name.into();
        Self {
            gpu: FullscreenPass::new(format!("prism {name} pass"), body),
            name,
            enabled: true,
            uniforms,
            params: Vec::new(),
        }
    }

    /// Declares a tunable parameter backed by the float uniform `spec.name`.
    pub fn with_param(mut self, spec: ParamSpec) -> Self {
        debug_assert!(
            self.uniforms.get_f32(&spec.name).is_some(),
            "parameter `{}` has no float uniform",
            spec.name
        );
        self.params.push(spec);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::info!("effect `{}`: {}", self.name, if enabled { "on" } else { "off" });
        }
        self.enabled = enabled;
    }

    #[inline]
    pub fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }

    #[inline]
    pub fn uniforms_mut(&mut self) -> &mut UniformBlock {
        &mut self.uniforms
    }

    pub(crate) fn run(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        output: &wgpu::TextureView,
    ) -> Result<(), RenderError> {
        self.gpu.run(ctx, encoder, input, output, &self.uniforms)
    }
}

impl Tunable for ShaderPass {
    fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    fn param(&self, name: &str) -> Option<f32> {
        self.param_spec(name)?;
        self.uniforms.get_f32(name)
    }

    fn set_param(&mut self, name: &str, value: f32) -> Result<f32, ParamError> {
        let spec = self
            .param_spec(name)
            .ok_or_else(|| ParamError::Unknown(name.to_string()))?;
        let value = spec.clamp(value)?;
        self.uniforms.set(name, value)?;
        Ok(value)
    }
}

impl Effect for ShaderPass {
    fn pass(&self) -> &ShaderPass {
        self
    }

    fn pass_mut(&mut self) -> &mut ShaderPass {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass() -> ShaderPass {
        ShaderPass::new(
            "test",
            "@fragment fn fs_main() {}",
            UniformBlock::new().with("strength", 0.5f32).with("tint", glam::Vec3::ONE),
        )
        .with_param(ParamSpec::new("strength", 0.0, 1.0, 0.01))
    }

    // ── params ────────────────────────────────────────────────────────────

    #[test]
    fn set_param_clamps_and_writes_uniform() {
        let mut p = pass();
        assert_eq!(p.set_param("strength", 4.0), Ok(1.0));
        assert_eq!(p.uniforms().get_f32("strength"), Some(1.0));
        assert_eq!(p.param("strength"), Some(1.0));
    }

    #[test]
    fn undeclared_uniform_is_not_a_param() {
        let mut p = pass();
        assert_eq!(p.param("tint"), None);
        assert_eq!(p.set_param("tint", 1.0), Err(ParamError::Unknown("tint".into())));
    }

    #[test]
    fn nan_is_rejected_and_value_kept() {
        let mut p = pass();
        assert!(matches!(p.set_param("strength", f32::NAN), Err(ParamError::NotFinite(_))));
        assert_eq!(p.param("strength"), Some(0.5));
    }

    // ── frame ─────────────────────────────────────────────────────────────

    #[test]
    fn pointer_uv_flips_y() {
        let f = EffectFrame::new(FrameTime::default(), SurfaceSize::default(), Some(Vec2::new(1.0, 1.0)));
        assert_eq!(f.pointer_uv(), Some(Vec2::new(1.0, 0.0)));

        let f = EffectFrame { pointer_ndc: Some(Vec2::new(-1.0, -1.0)), ..f };
        assert_eq!(f.pointer_uv(), Some(Vec2::new(0.0, 1.0)));
    }
}
