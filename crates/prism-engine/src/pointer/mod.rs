//! Pointer hit-testing and enter/hover/leave dispatch.

mod dispatcher;

pub use dispatcher::{PointerCallback, PointerDispatcher};
