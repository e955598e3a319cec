use std::time::Instant;

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::SurfaceSize;
use crate::core::{App, AppControl, EngineCtx};
use crate::device::{DeviceError, Gpu, GpuInit};
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputEvent, InputFrame, InputState};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Logical surface size of `window`.
pub fn surface_size(window: &Window) -> SurfaceSize {
    logical_surface_size(window.inner_size(), window.scale_factor())
}

fn logical_surface_size(physical: PhysicalSize<u32>, scale: f64) -> SurfaceSize {
    let logical: LogicalSize<f64> = physical.to_logical(scale);
    SurfaceSize::new(logical.width as f32, logical.height as f32, scale as f32)
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, attaches the render device and drives `app` until the
    /// window closes.
    ///
    /// Window or GPU construction failures end the loop and are returned.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    engine: EngineCtx,
    entry: Option<WindowEntry>,

    fatal: Option<anyhow::Error>,
    exit_requested: bool,
    disposed: bool,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            engine: EngineCtx::new(),
            entry: None,
            fatal: None,
            exit_requested: false,
            disposed: false,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| DeviceError::Construction(format!("window: {e}")))?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .map_err(|e| DeviceError::Construction(format!("gpu: {e:#}")))?;

        let size = entry.with_window(|w| surface_size(w));
        self.engine.device.setup(size)?;
        self.entry = Some(entry);

        self.app
            .setup(&mut self.engine)
            .context("application setup failed")?;
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("runtime: {err:#}");
        self.fatal = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if !self.disposed {
            self.disposed = true;
            self.app.dispose(&mut self.engine);
        }
        self.exit_requested = true;
        self.entry = None;
        event_loop.exit();
    }

    fn handle_resize(&mut self, physical: PhysicalSize<u32>) {
        let Some(entry) = self.entry.as_mut() else { return };
        let scale = entry.with_window(|w| w.scale_factor());
        let size = logical_surface_size(physical, scale);

        // Device (and its resize callback) first, then the surface.
        self.engine.device.resize(size);
        entry.with_gpu_mut(|gpu| gpu.resize(physical, scale as f32));
        entry.with_window(|w| w.request_redraw());
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_mut() else { return };
        let EngineCtx { device, pointer } = &mut self.engine;

        let report = entry.with_mut(|fields| {
            let report = device.run_frame(
                Instant::now(),
                pointer,
                fields.input_state,
                fields.input_frame,
                Some(fields.gpu),
            );
            fields.input_frame.clear();
            report
        });

        match report {
            Ok(report) if report.exit_requested => self.shutdown(event_loop),
            Ok(_) => {}
            Err(err) => log::error!("frame dropped: {err:#}"),
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        if let Err(err) = self.create_window_entry(event_loop) {
            self.fail(event_loop, err);
            return;
        }

        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous animation: one redraw per display refresh.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        if self.app.on_window_event(&mut self.engine, &event) == AppControl::Exit {
            self.shutdown(event_loop);
            return;
        }

        let Some(entry) = self.entry.as_mut() else { return };

        let moved = entry.with_mut(|fields| {
            let ev = translate_window_event(fields.window, fields.input_state, &event)?;
            let moved = match &ev {
                InputEvent::PointerMoved(p) => Some(*p),
                _ => None,
            };
            fields.input_state.apply_event(fields.input_frame, ev);
            moved
        });

        if let Some(p) = moved {
            self.engine.handle_pointer_move(p);
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(new_size) => self.handle_resize(new_size),
            WindowEvent::ScaleFactorChanged { .. } => {
                let inner = self.entry.as_ref().map(|e| e.with_window(|w| w.inner_size()));
                if let Some(new_size) = inner {
                    self.handle_resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        if !self.disposed {
            self.shutdown(event_loop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_size_divides_by_scale() {
        let size = logical_surface_size(PhysicalSize::new(1600, 1200), 2.0);
        assert_eq!(size, SurfaceSize::new(800.0, 600.0, 2.0));
    }

    #[test]
    fn default_config_is_landscape() {
        let c = RuntimeConfig::default();
        assert!(c.initial_size.width > c.initial_size.height);
    }
}
