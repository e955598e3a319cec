//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single window, and wires them to the GPU
//! layer, the render device and the pointer dispatcher.

mod runtime;

pub use runtime::{surface_size, Runtime, RuntimeConfig};
