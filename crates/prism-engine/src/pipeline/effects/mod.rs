//! Built-in effects.

mod fxaa;
mod halftone;
mod mouse_invert;

pub use fxaa::Fxaa;
pub use halftone::Halftone;
pub use mouse_invert::MouseInvert;
