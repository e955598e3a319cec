//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (pipelines, buffers) and create them
//! lazily on first use or when the target format/extent changes.
//!
//! Convention:
//! - mesh programs are WGSL appended to `shaders/mesh_prelude.wgsl`
//! - post-processing programs are WGSL appended to `shaders/fullscreen.wgsl`
//! - uniforms are packed one `vec4<f32>` per named value

mod ctx;
mod error;
mod fullscreen;
mod mesh;
mod target;

pub use ctx::{RenderCtx, RenderTarget};
pub use error::RenderError;
pub use fullscreen::FullscreenPass;
pub use mesh::MeshRenderer;
pub use target::{ColorTarget, DepthTarget, DEPTH_FORMAT};
