use crate::coords::SurfaceSize;
use crate::device::{DeviceError, Gpu};
use crate::input::{InputFrame, InputState};
use crate::pointer::PointerDispatcher;
use crate::scene::Scene;
use crate::time::FrameTime;

use super::device::RenderDevice;

/// Application-lifetime owner of the engine state.
///
/// The device and the dispatcher live side by side so pointer handling can
/// read the scene while the dispatcher is borrowed mutably.
#[derive(Default)]
pub struct EngineCtx {
    pub device: RenderDevice,
    pub pointer: PointerDispatcher,
}

impl EngineCtx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes one pointer move through the dispatcher against the device's
    /// scene and surface size.
    pub fn handle_pointer_move(&mut self, event: crate::input::PointerEvent) {
        let Self { device, pointer } = self;
        pointer.handle_pointer_move(event, device.scene(), device.size());
    }
}

/// Per-frame context passed to the frame driver.
///
/// Lifetimes:
/// - `'a` is the duration of the driver invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub scene: &'a mut Scene,
    pub time: FrameTime,
    pub size: SurfaceSize,
    pub pointer: &'a PointerDispatcher,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,

    gpu: Option<&'a mut Gpu<'w>>,
    cancel_requested: bool,
    exit_requested: bool,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    pub(crate) fn new(
        scene: &'a mut Scene,
        time: FrameTime,
        size: SurfaceSize,
        pointer: &'a PointerDispatcher,
        input: &'a InputState,
        input_frame: &'a InputFrame,
        gpu: Option<&'a mut Gpu<'w>>,
    ) -> Self {
        Self {
            scene,
            time,
            size,
            pointer,
            input,
            input_frame,
            gpu,
            cancel_requested: false,
            exit_requested: false,
        }
    }

    /// GPU context of the attached surface.
    pub fn gpu(&mut self) -> Result<&mut Gpu<'w>, DeviceError> {
        self.gpu.as_deref_mut().ok_or(DeviceError::Detached)
    }

    /// Scene (read-only) and GPU context in one borrow, for rendering.
    pub fn scene_and_gpu(&mut self) -> Result<(&Scene, &mut Gpu<'w>), DeviceError> {
        let gpu = self.gpu.as_deref_mut().ok_or(DeviceError::Detached)?;
        Ok((&*self.scene, gpu))
    }

    #[inline]
    pub fn has_gpu(&self) -> bool {
        self.gpu.is_some()
    }

    /// Stops the animation loop once the current driver invocation returns.
    pub fn cancel_animation_frame(&mut self) {
        self.cancel_requested = true;
    }

    /// Asks the runtime to close the window and exit.
    pub fn exit(&mut self) {
        self.exit_requested = true;
    }

    pub(crate) fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    pub(crate) fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}
