use crate::coords::SurfaceSize;
use crate::core::FrameCtx;
use crate::device::{GpuFrame, SurfaceErrorAction};
use crate::render::{ColorTarget, MeshRenderer, RenderCtx, RenderError, RenderTarget};
use crate::scene::Scene;
use crate::uniforms::{ParamError, Tunable};

use super::effect::{Effect, EffectFrame};
use super::plan::{plan_steps, Output, Stage, Step};
use super::PipelineError;

/// Scene stage followed by an ordered chain of effects.
///
/// The effect order is fixed once built; effects are only toggled. Disabled
/// effects are skipped entirely, so a chain with disabled effects renders
/// exactly like the chain without them.
pub struct PostPipeline {
    size: SurfaceSize,
    scene_renderer: MeshRenderer,
    effects: Vec<Box<dyn Effect>>,

    targets: Option<[ColorTarget; 2]>,
    targets_dirty: bool,
}

impl PostPipeline {
    pub fn new(pixel_ratio: f32) -> Self {
        Self {
            size: SurfaceSize::new(1.0, 1.0, pixel_ratio),
            scene_renderer: MeshRenderer::new(),
            effects: Vec::new(),
            targets: None,
            targets_dirty: true,
        }
    }

    /// Appends an effect to the end of the chain.
    pub fn add_effect<E>(&mut self, effect: E)
    where
        E: Effect + 'static,
    {
        let name = effect.pass().name();
        if self.effects.iter().any(|e| e.pass().name() == name) {
            log::warn!("pipeline: duplicate effect name `{name}`; lookups return the first");
        }
        self.effects.push(Box::new(effect));
    }

    pub fn with_effect<E>(mut self, effect: E) -> Self
    where
        E: Effect + 'static,
    {
        self.add_effect(effect);
        self
    }

    #[inline]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Effect names in chain order.
    pub fn effect_names(&self) -> impl Iterator<Item = &str> {
        self.effects.iter().map(|e| e.pass().name())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    // ── per frame ─────────────────────────────────────────────────────────

    /// Lets every effect refresh its uniforms for the coming frame.
    pub fn update(&mut self, frame: &EffectFrame) {
        for effect in &mut self.effects {
            effect.update(frame);
        }
    }

    /// Propagates a new output size to every effect and schedules the
    /// intermediate buffers for reallocation.
    pub fn resize(&mut self, width: f32, height: f32, pixel_ratio: f32) {
        self.size = SurfaceSize::new(width, height, pixel_ratio);
        for effect in &mut self.effects {
            effect.resize(self.size);
        }
        self.targets_dirty = true;
    }

    /// Render steps for the current enabled set.
    pub fn plan(&self) -> Vec<Step> {
        plan_steps(
            self.effects
                .iter()
                .enumerate()
                .filter(|(_, e)| e.pass().is_enabled())
                .map(|(i, e)| (i, e.pass().name())),
        )
    }

    /// Renders the scene through the enabled effects into the surface and
    /// presents it.
    ///
    /// A recoverable surface error skips the frame and returns `Ok`. A stage
    /// that fails to record aborts the frame without presenting it.
    pub fn render(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<(), PipelineError> {
        let steps = self.plan();
        let (scene, gpu) = ctx.scene_and_gpu()?;

        let mut frame = match gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                return match gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => Err(PipelineError::Surface),
                    _ => Ok(()),
                };
            }
        };

        let rctx = RenderCtx::new(gpu.device(), gpu.queue(), gpu.surface_format(), frame.extent());
        self.ensure_targets(&rctx);

        for step in &steps {
            self.run_step(&rctx, &mut frame, step, scene)?;
        }

        gpu.submit(frame);
        Ok(())
    }

    fn run_step(
        &mut self,
        rctx: &RenderCtx<'_>,
        frame: &mut GpuFrame,
        step: &Step,
        scene: &Scene,
    ) -> Result<(), PipelineError> {
        let fail = |err| PipelineError::pass(&step.stage, err);
        let targets = self
            .targets
            .as_ref()
            .ok_or_else(|| fail(RenderError::missing("prism pipeline", "intermediate buffers")))?;
        let GpuFrame { encoder, view, .. } = frame;

        let output = match step.output {
            Output::Buffer(slot) => targets[slot.index()].view(),
            Output::Surface => &*view,
        };

        match &step.stage {
            Stage::Scene => {
                let mut target = RenderTarget::new(encoder, output);
                self.scene_renderer.render(rctx, &mut target, scene).map_err(fail)
            }
            Stage::Effect { index, name } => {
                let input = step
                    .input
                    .map(|slot| targets[slot.index()].view())
                    .ok_or_else(|| fail(RenderError::missing(name, "input buffer")))?;
                let effect = self
                    .effects
                    .get_mut(*index)
                    .ok_or_else(|| PipelineError::UnknownEffect(name.clone()))?;
                effect.pass_mut().run(rctx, encoder, input, output).map_err(fail)
            }
        }
    }

    fn ensure_targets(&mut self, rctx: &RenderCtx<'_>) {
        let fresh = self
            .targets
            .as_ref()
            .is_some_and(|[a, _]| a.matches(rctx.extent, rctx.format));
        if fresh && !self.targets_dirty {
            return;
        }

        log::debug!("pipeline: allocating targets {}x{}", rctx.extent.0, rctx.extent.1);
        self.targets = Some([
            ColorTarget::new(rctx.device, "prism pipeline buffer A", rctx.extent, rctx.format),
            ColorTarget::new(rctx.device, "prism pipeline buffer B", rctx.extent, rctx.format),
        ]);
        self.targets_dirty = false;
    }

    // ── tuning ────────────────────────────────────────────────────────────

    pub fn effect(&self, name: &str) -> Option<&dyn Effect> {
        self.effects
            .iter()
            .find(|e| e.pass().name() == name)
            .map(|e| e.as_ref())
    }

    pub fn effect_mut(&mut self, name: &str) -> Option<&mut (dyn Effect + 'static)> {
        self.effects
            .iter_mut()
            .find(|e| e.pass().name() == name)
            .map(|e| e.as_mut())
    }

    fn require_mut(&mut self, name: &str) -> Result<&mut (dyn Effect + 'static), PipelineError> {
        self.effect_mut(name)
            .ok_or_else(|| PipelineError::UnknownEffect(name.to_string()))
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), PipelineError> {
        self.require_mut(name)?.pass_mut().set_enabled(enabled);
        Ok(())
    }

    /// Flips an effect on or off. Returns the new state.
    pub fn toggle(&mut self, name: &str) -> Result<bool, PipelineError> {
        let pass = self.require_mut(name)?.pass_mut();
        let on = !pass.is_enabled();
        pass.set_enabled(on);
        Ok(on)
    }

    pub fn is_enabled(&self, name: &str) -> Result<bool, PipelineError> {
        self.effect(name)
            .map(|e| e.pass().is_enabled())
            .ok_or_else(|| PipelineError::UnknownEffect(name.to_string()))
    }

    /// Writes a tunable parameter, clamped to its range. Returns the stored value.
    pub fn set_param(&mut self, effect: &str, param: &str, value: f32) -> Result<f32, PipelineError> {
        self.require_mut(effect)?
            .pass_mut()
            .set_param(param, value)
            .map_err(|err| match err {
                ParamError::Unknown(param) => PipelineError::UnknownParam {
                    effect: effect.to_string(),
                    param,
                },
                other => PipelineError::Param(other),
            })
    }

    pub fn param(&self, effect: &str, param: &str) -> Result<f32, PipelineError> {
        let e = self
            .effect(effect)
            .ok_or_else(|| PipelineError::UnknownEffect(effect.to_string()))?;
        e.pass().param(param).ok_or_else(|| PipelineError::UnknownParam {
            effect: effect.to_string(),
            param: param.to_string(),
        })
    }
}
