use anyhow::Result;
use winit::event::WindowEvent;

use super::ctx::EngineCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called once after the render device has been attached to the window
    /// surface. Builds the scene and registers the frame driver.
    fn setup(&mut self, ctx: &mut EngineCtx) -> Result<()>;

    /// Called for every window event before the runtime handles it.
    fn on_window_event(&mut self, ctx: &mut EngineCtx, event: &WindowEvent) -> AppControl {
        let _ = (ctx, event);
        AppControl::Continue
    }

    /// Called once when the runtime shuts down.
    fn dispose(&mut self, ctx: &mut EngineCtx) {
        ctx.device.dispose();
    }
}
