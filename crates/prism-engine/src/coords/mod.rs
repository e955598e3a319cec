//! Shared coordinate and colour types.
//!
//! Screen space is logical pixels, origin top-left, +X right, +Y down.
//! `SurfaceSize::to_ndc` is the single place that flips into clip space.

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::SurfaceSize;
