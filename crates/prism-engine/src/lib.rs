//! Prism engine crate.
//!
//! Owns the platform + GPU runtime, the scene model, pointer hit-testing and
//! the post-processing pipeline used by applications.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod scene;
pub mod raycast;
pub mod pointer;
pub mod uniforms;
pub mod pipeline;
