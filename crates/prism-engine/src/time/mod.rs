//! Time subsystem.
//!
//! One `FrameClock` per render loop; the device ticks it once before each
//! frame-driver invocation and publishes the resulting `FrameTime`.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
