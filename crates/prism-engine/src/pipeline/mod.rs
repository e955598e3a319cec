//! Post-processing pipeline.
//!
//! A frame renders the scene into an intermediate buffer, then runs every
//! enabled effect in construction order, ping-ponging between two buffers, with
//! the last step writing to the surface.

mod effect;
pub mod effects;
mod plan;
mod post;

pub use effect::{Effect, EffectFrame, ShaderPass};
pub use plan::{Output, Slot, Stage, Step};
pub use post::PostPipeline;

use crate::device::DeviceError;
use crate::render::RenderError;
use crate::uniforms::ParamError;

/// Pipeline tuning and rendering failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("no effect named `{0}`")]
    UnknownEffect(String),

    #[error("effect `{effect}` has no parameter `{param}`")]
    UnknownParam { effect: String, param: String },

    #[error(transparent)]
    Param(ParamError),

    /// A stage could not be recorded, e.g. wgpu rejected its program.
    #[error("pass `{effect}` failed: {message}")]
    Pass { effect: String, message: String },

    /// The surface failed in a way reconfiguring cannot fix.
    #[error("surface lost beyond recovery")]
    Surface,

    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl PipelineError {
    pub(crate) fn pass(stage: &Stage, err: RenderError) -> Self {
        Self::Pass {
            effect: stage.name().to_string(),
            message: err.to_string(),
        }
    }
}
