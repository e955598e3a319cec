//! Input subsystem.
//!
//! Public API is platform-agnostic. The runtime translates winit events through
//! `platform::winit` and feeds them to `InputState`.

mod frame;
pub(crate) mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState, PointerEvent};
