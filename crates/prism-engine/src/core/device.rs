use std::time::Instant;

use anyhow::Result;

use crate::coords::SurfaceSize;
use crate::device::{DeviceError, Gpu};
use crate::input::{InputFrame, InputState};
use crate::pointer::PointerDispatcher;
use crate::scene::{ObjectHandle, RenderableObject, Scene, SceneError};
use crate::time::{FrameClock, FrameTime};

use super::ctx::FrameCtx;

/// The single per-frame callback.
pub type FrameDriver = Box<dyn for<'a, 'w> FnMut(&mut FrameCtx<'a, 'w>) -> Result<()>>;

/// Invoked with the new size after it is stored and before the camera
/// projection is updated.
pub type ResizeCallback = Box<dyn FnMut(SurfaceSize)>;

/// What happened during one [`RenderDevice::run_frame`] call.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameReport {
    /// A frame driver was registered and ran.
    pub ran: bool,
    /// The driver asked the runtime to exit.
    pub exit_requested: bool,
}

/// Owns the scene, the frame clock and the frame driver, and tracks the output
/// surface size.
///
/// The device is GPU-agnostic: the runtime hands the GPU context to
/// [`run_frame`](Self::run_frame) for the duration of one frame.
pub struct RenderDevice {
    scene: Scene,
    clock: FrameClock,
    time: FrameTime,
    size: SurfaceSize,

    driver: Option<FrameDriver>,
    resize_callback: Option<ResizeCallback>,

    attached: bool,
    disposed: bool,
}

impl Default for RenderDevice {
    fn default() -> Self {
        Self::new(Scene::default())
    }
}

impl RenderDevice {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            clock: FrameClock::new(),
            time: FrameTime::default(),
            size: SurfaceSize::default(),
            driver: None,
            resize_callback: None,
            attached: false,
            disposed: false,
        }
    }

    /// Replaces the clock, e.g. with one that clamps deltas.
    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    /// Attaches the output surface and sizes everything to `size`.
    ///
    /// Succeeds at most once per device.
    pub fn setup(&mut self, size: SurfaceSize) -> Result<(), DeviceError> {
        if self.attached {
            return Err(DeviceError::AlreadyAttached);
        }
        if !size.is_valid() {
            return Err(DeviceError::Construction(format!(
                "invalid surface size {}x{} @{}",
                size.width, size.height, size.pixel_ratio
            )));
        }

        self.attached = true;
        self.disposed = false;
        self.size = size;
        self.apply_camera_aspect();
        self.clock.reset();

        log::info!(
            "device: attached {}x{} (pixel ratio {})",
            size.width,
            size.height,
            size.pixel_ratio
        );
        Ok(())
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    // ── animation loop ────────────────────────────────────────────────────

    /// Registers the frame driver, replacing any previous one.
    pub fn request_animation_frame<F>(&mut self, driver: F)
    where
        F: for<'a, 'w> FnMut(&mut FrameCtx<'a, 'w>) -> Result<()> + 'static,
    {
        if self.driver.is_some() {
            log::debug!("device: replacing frame driver");
        }
        self.driver = Some(Box::new(driver));
    }

    /// Drops the frame driver. Calling it without a driver is a no-op.
    pub fn cancel_animation_frame(&mut self) {
        self.driver = None;
    }

    #[inline]
    pub fn has_animation_frame(&self) -> bool {
        self.driver.is_some()
    }

    /// Runs one frame: ticks the clock and invokes the driver.
    ///
    /// Without a registered driver the clock is not ticked and nothing runs.
    /// The driver is moved out for the call and put back afterwards unless it
    /// cancelled itself. Driver errors are returned as-is and the driver stays
    /// registered, except when the driver also asked to exit: the error is then
    /// logged and the exit request wins.
    pub fn run_frame(
        &mut self,
        now: Instant,
        pointer: &PointerDispatcher,
        input: &InputState,
        input_frame: &InputFrame,
        gpu: Option<&mut Gpu<'_>>,
    ) -> Result<FrameReport> {
        let Some(mut driver) = self.driver.take() else {
            return Ok(FrameReport::default());
        };

        self.time = self.clock.tick_at(now);

        let mut ctx = FrameCtx::new(
            &mut self.scene,
            self.time,
            self.size,
            pointer,
            input,
            input_frame,
            gpu,
        );
        let result = driver(&mut ctx);
        let cancel = ctx.cancel_requested();
        let exit_requested = ctx.exit_requested();

        if cancel {
            log::debug!("device: frame driver cancelled itself");
        } else if self.driver.is_none() {
            self.driver = Some(driver);
        }

        let report = FrameReport { ran: true, exit_requested };
        match result {
            Ok(()) => Ok(report),
            Err(err) if exit_requested => {
                log::error!("device: frame driver failed while exiting: {err:#}");
                Ok(report)
            }
            Err(err) => Err(err),
        }
    }

    /// Timing of the most recent frame.
    #[inline]
    pub fn time(&self) -> FrameTime {
        self.time
    }

    // ── scene access ──────────────────────────────────────────────────────

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Last object named `name`.
    pub fn get_object_by_name(&self, name: &str) -> Result<&RenderableObject, SceneError> {
        self.scene.object_by_name(name)
    }

    pub fn get_object_by_name_mut(&mut self, name: &str) -> Result<&mut RenderableObject, SceneError> {
        self.scene.object_by_name_mut(name)
    }

    pub fn get_handle_by_name(&self, name: &str) -> Result<ObjectHandle, SceneError> {
        self.scene.handle_by_name(name)
    }

    // ── resize ────────────────────────────────────────────────────────────

    pub fn set_resize_callback<F>(&mut self, callback: F)
    where
        F: FnMut(SurfaceSize) + 'static,
    {
        self.resize_callback = Some(Box::new(callback));
    }

    /// Stores `size`, notifies the resize callback, then updates the camera
    /// aspect and projection.
    ///
    /// A degenerate size (minimized window) is stored and reported but leaves
    /// the camera untouched.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;

        if let Some(cb) = self.resize_callback.as_mut() {
            cb(size);
        }

        if size.is_valid() {
            self.apply_camera_aspect();
        }
        log::debug!("device: resized to {}x{} @{}", size.width, size.height, size.pixel_ratio);
    }

    #[inline]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    fn apply_camera_aspect(&mut self) {
        let camera = &mut self.scene.camera;
        camera.aspect = self.size.aspect();
        camera.update_projection_matrix();
    }

    // ── teardown ──────────────────────────────────────────────────────────

    /// Stops the loop, drops the resize callback and clears the scene.
    ///
    /// Safe to call repeatedly; every call tears down whatever was registered
    /// since the previous one.
    pub fn dispose(&mut self) {
        self.cancel_animation_frame();
        self.resize_callback = None;
        self.scene.clear();
        self.attached = false;

        if !self.disposed {
            self.disposed = true;
            log::info!("device: disposed");
        }
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::coords::ColorRgba;
    use crate::scene::{Geometry, Material};

    struct Harness {
        pointer: PointerDispatcher,
        input: InputState,
        frame: InputFrame,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                pointer: PointerDispatcher::new(),
                input: InputState::default(),
                frame: InputFrame::default(),
            }
        }

        fn run(&self, device: &mut RenderDevice, now: Instant) -> Result<FrameReport> {
            device.run_frame(now, &self.pointer, &self.input, &self.frame, None)
        }
    }

    fn obj(name: &str) -> RenderableObject {
        RenderableObject::new(name, Geometry::plane(1.0, 1.0, 1, 1), Material::basic(ColorRgba::white()))
    }

    fn attached(width: f32, height: f32) -> RenderDevice {
        let mut d = RenderDevice::default();
        d.setup(SurfaceSize::new(width, height, 1.0)).unwrap();
        d
    }

    // ── setup ─────────────────────────────────────────────────────────────

    #[test]
    fn setup_attaches_once() {
        let mut d = attached(800.0, 400.0);
        assert!(d.is_attached());
        assert_eq!(d.scene().camera.aspect, 2.0);
        assert_eq!(d.setup(SurfaceSize::new(10.0, 10.0, 1.0)), Err(DeviceError::AlreadyAttached));
    }

    #[test]
    fn setup_rejects_degenerate_size() {
        let mut d = RenderDevice::default();
        let err = d.setup(SurfaceSize::new(0.0, 600.0, 1.0)).unwrap_err();
        assert!(matches!(err, DeviceError::Construction(_)));
        assert!(!d.is_attached());
    }

    // ── frame loop ────────────────────────────────────────────────────────

    #[test]
    fn no_driver_runs_nothing() {
        let h = Harness::new();
        let mut d = attached(100.0, 100.0);
        let report = h.run(&mut d, Instant::now()).unwrap();
        assert!(!report.ran);
    }

    #[test]
    fn driver_sees_clock_time() {
        let h = Harness::new();
        let mut d = attached(100.0, 100.0).with_clock(FrameClock::starting_at(Instant::now()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        d.request_animation_frame(move |ctx| {
            sink.borrow_mut().push(ctx.time);
            Ok(())
        });

        let t0 = Instant::now() + Duration::from_millis(16);
        h.run(&mut d, t0).unwrap();
        h.run(&mut d, t0 + Duration::from_millis(16)).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].elapsed >= seen[0].elapsed);
        assert!((seen[1].delta - 0.016).abs() < 1e-4);
        assert_eq!(d.time(), seen[1]);
    }

    #[test]
    fn re_request_replaces_driver() {
        let h = Harness::new();
        let mut d = attached(100.0, 100.0);
        let trace = Rc::new(RefCell::new(Vec::new()));

        let t = Rc::clone(&trace);
        d.request_animation_frame(move |_| {
            t.borrow_mut().push("first");
            Ok(())
        });
        let t = Rc::clone(&trace);
        d.request_animation_frame(move |_| {
            t.borrow_mut().push("second");
            Ok(())
        });

        h.run(&mut d, Instant::now()).unwrap();
        h.run(&mut d, Instant::now()).unwrap();
        assert_eq!(*trace.borrow(), ["second", "second"]);
    }

    #[test]
    fn cancel_is_idempotent() {
        let h = Harness::new();
        let mut d = attached(100.0, 100.0);
        d.request_animation_frame(|_| Ok(()));
        d.cancel_animation_frame();
        d.cancel_animation_frame();
        assert!(!d.has_animation_frame());
        assert!(!h.run(&mut d, Instant::now()).unwrap().ran);
    }

    #[test]
    fn driver_can_cancel_itself() {
        let h = Harness::new();
        let mut d = attached(100.0, 100.0);
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        d.request_animation_frame(move |ctx| {
            *c.borrow_mut() += 1;
            ctx.cancel_animation_frame();
            Ok(())
        });

        assert!(h.run(&mut d, Instant::now()).unwrap().ran);
        assert!(!h.run(&mut d, Instant::now()).unwrap().ran);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn driver_error_propagates_and_driver_survives() {
        let h = Harness::new();
        let mut d = attached(100.0, 100.0);
        d.request_animation_frame(|ctx| {
            ctx.scene.object_by_name("missing")?;
            Ok(())
        });

        let err = h.run(&mut d, Instant::now()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SceneError>(),
            Some(&SceneError::NotFound { name: "missing".into() })
        );
        assert!(d.has_animation_frame());
    }

    #[test]
    fn headless_frame_has_no_gpu() {
        let h = Harness::new();
        let mut d = attached(100.0, 100.0);
        d.request_animation_frame(|ctx| {
            assert!(!ctx.has_gpu());
            assert!(matches!(ctx.gpu(), Err(DeviceError::Detached)));
            ctx.exit();
            Ok(())
        });
        let report = h.run(&mut d, Instant::now()).unwrap();
        assert!(report.exit_requested);
    }

    #[test]
    fn driver_mutates_scene() {
        let h = Harness::new();
        let mut d = attached(100.0, 100.0);
        d.scene_mut().add(obj("donut"));
        d.request_animation_frame(|ctx| {
            let donut = ctx.scene.object_by_name_mut("donut")?;
            donut.transform.translation.x += 1.0;
            Ok(())
        });
        h.run(&mut d, Instant::now()).unwrap();
        h.run(&mut d, Instant::now()).unwrap();
        assert_eq!(d.get_object_by_name("donut").unwrap().transform.translation.x, 2.0);
    }

    // ── lookup ────────────────────────────────────────────────────────────

    #[test]
    fn lookup_returns_last_match_or_not_found() {
        let mut d = RenderDevice::default();
        d.scene_mut().add(obj("a"));
        let second = d.scene_mut().add(obj("a"));
        assert_eq!(d.get_handle_by_name("a"), Ok(second));
        assert!(matches!(d.get_object_by_name("b"), Err(SceneError::NotFound { .. })));
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_stores_size_notifies_callback_and_updates_projection() {
        let mut d = attached(100.0, 100.0);
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        d.set_resize_callback(move |size| *sink.borrow_mut() = Some(size));

        d.resize(SurfaceSize::new(800.0, 600.0, 2.0));

        assert_eq!(*seen.borrow(), Some(SurfaceSize::new(800.0, 600.0, 2.0)));
        assert_eq!(d.size(), SurfaceSize::new(800.0, 600.0, 2.0));
        let cam = &d.scene().camera;
        assert!((cam.aspect - 800.0 / 600.0).abs() < 1e-6);
        let expected = glam::Mat4::perspective_rh(50f32.to_radians(), 800.0 / 600.0, cam.near, cam.far);
        assert!(cam.projection_matrix().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn resize_callback_runs_once_per_resize() {
        let mut d = attached(100.0, 100.0);
        let observed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&observed);
        d.set_resize_callback(move |size| sink.borrow_mut().push(size.aspect()));

        d.resize(SurfaceSize::new(400.0, 100.0, 1.0));
        d.resize(SurfaceSize::new(100.0, 100.0, 1.0));
        d.resize(SurfaceSize::new(400.0, 100.0, 1.0));
        assert_eq!(*observed.borrow(), [4.0, 1.0, 4.0]);
        assert_eq!(d.scene().camera.aspect, 4.0);
    }

    #[test]
    fn minimized_resize_keeps_camera() {
        let mut d = attached(200.0, 100.0);
        d.resize(SurfaceSize::new(0.0, 0.0, 1.0));
        assert_eq!(d.scene().camera.aspect, 2.0);
        assert_eq!(d.size().width, 0.0);
    }

    // ── dispose ───────────────────────────────────────────────────────────

    #[test]
    fn dispose_twice_is_a_no_op() {
        let h = Harness::new();
        let mut d = attached(100.0, 100.0);
        d.scene_mut().add(obj("donut"));
        d.request_animation_frame(|_| Ok(()));

        d.dispose();
        assert!(d.is_disposed());
        assert!(d.scene().is_empty());
        assert!(!d.has_animation_frame());

        d.dispose();
        assert!(d.scene().is_empty());
        assert!(!h.run(&mut d, Instant::now()).unwrap().ran);
    }

    #[test]
    fn dispose_after_reregister_tears_down_again() {
        let h = Harness::new();
        let mut d = attached(100.0, 100.0);
        d.dispose();

        let calls = Rc::new(RefCell::new(0));
        let c = Rc::clone(&calls);
        d.scene_mut().add(obj("donut"));
        d.request_animation_frame(move |_| {
            *c.borrow_mut() += 1;
            Ok(())
        });
        d.set_resize_callback(|_| panic!("resize callback survived dispose"));

        d.dispose();
        assert!(d.is_disposed());
        assert!(d.scene().is_empty());
        assert!(!d.has_animation_frame());
        assert!(!h.run(&mut d, Instant::now()).unwrap().ran);
        assert_eq!(*calls.borrow(), 0);
        d.resize(SurfaceSize::new(10.0, 10.0, 1.0));
    }

    #[test]
    fn exit_request_survives_driver_error() {
        let h = Harness::new();
        let mut d = attached(100.0, 100.0);
        d.request_animation_frame(|ctx| {
            ctx.exit();
            ctx.scene.object_by_name("missing")?;
            Ok(())
        });

        let report = h.run(&mut d, Instant::now()).unwrap();
        assert!(report.ran);
        assert!(report.exit_requested);
    }
}
