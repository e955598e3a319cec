//! Core engine-facing contracts.
//!
//! The render device (scene, clock, frame driver, resize handling), the
//! per-frame context handed to the driver, and the application trait the
//! runtime drives.

mod app;
mod ctx;
mod device;

pub use app::{App, AppControl};
pub use ctx::{EngineCtx, FrameCtx};
pub use device::{FrameDriver, FrameReport, RenderDevice, ResizeCallback};
