use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use glam::Vec3;

use prism_engine::coords::{ColorRgba, SurfaceSize};
use prism_engine::core::{App, EngineCtx, FrameCtx};
use prism_engine::input::Key;
use prism_engine::pipeline::effects::{Fxaa, Halftone, MouseInvert};
use prism_engine::pipeline::{EffectFrame, PostPipeline};
use prism_engine::scene::{Geometry, Material, RenderableObject, Scene, Side};
use prism_engine::uniforms::UniformBlock;

use crate::config::{DemoConfig, EffectsSection};
use crate::rolling::Rolling;

const PLANE: &str = "plane";
const DONUT: &str = "donut";

/// Halftone cell-size change per arrow key press.
const PIXEL_SIZE_NUDGE: f32 = 0.0005;

/// The demo scene: a hidden shader plane and a white donut that rolls when the
/// pointer drags across it, viewed through the post-processing chain.
pub struct Canvas {
    config: DemoConfig,
}

impl Canvas {
    pub fn new(config: DemoConfig) -> Self {
        Self { config }
    }
}

impl App for Canvas {
    fn setup(&mut self, ctx: &mut EngineCtx) -> Result<()> {
        let EngineCtx { device, pointer } = ctx;

        let donut = populate(device.scene_mut());

        let size = device.size();
        let viewport = Rc::new(Cell::new(size));
        let pipeline = Rc::new(RefCell::new(build_pipeline(&self.config.effects, size)?));
        let rolling = Rc::new(RefCell::new(Rolling::new(
            self.config.rolling.velocity,
            self.config.rolling.damping,
        )));

        {
            let pipeline = Rc::clone(&pipeline);
            let viewport = Rc::clone(&viewport);
            device.set_resize_callback(move |size: SurfaceSize| {
                viewport.set(size);
                pipeline.borrow_mut().resize(size.width, size.height, size.pixel_ratio);
            });
        }

        {
            let rolling = Rc::clone(&rolling);
            pointer.add_hover_function(donut, move |e| rolling.borrow_mut().push(e, viewport.get()));
        }
        pointer.add_enter_function(donut, |_| log::debug!("donut: pointer entered"));
        pointer.add_leave_function(donut, |_| log::debug!("donut: pointer left"));

        device.request_animation_frame(move |frame: &mut FrameCtx<'_, '_>| -> Result<()> {
            let mut pipeline = pipeline.borrow_mut();
            handle_keys(frame, &mut pipeline)?;

            let delta = frame.time.delta;
            frame
                .scene
                .object_by_name_mut(PLANE)?
                .material
                .uniforms
                .add_f32("u_time", delta)?;

            let (x, y, z) = rolling.borrow_mut().step();
            frame.scene.object_by_name_mut(DONUT)?.transform.apply_euler_xyz(x, y, z);

            pipeline.update(&EffectFrame::new(frame.time, frame.size, frame.pointer.pointer_ndc()));
            if frame.has_gpu() {
                pipeline.render(frame)?;
            }
            Ok(())
        });

        log::info!("canvas: scene ready ({} objects)", device.scene().len());
        Ok(())
    }
}

/// Adds the plane and the donut; returns the donut handle.
fn populate(scene: &mut Scene) -> prism_engine::scene::ObjectHandle {
    scene.background = Some(ColorRgba::black());
    scene.camera.position = Vec3::new(0.0, 0.0, 1.5);

    let plane = Material::shader(
        "plane",
        include_str!("shaders/plane.wgsl"),
        UniformBlock::new().with("u_time", 0.0f32),
    )
    .with_side(Side::Double);
    scene.add(RenderableObject::new(PLANE, Geometry::plane(1.5, 1.0, 1, 1), plane).hidden());

    scene.add(RenderableObject::new(
        DONUT,
        Geometry::torus(0.3, 0.1, 16, 100),
        Material::basic(ColorRgba::white()),
    ))
}

fn build_pipeline(effects: &EffectsSection, size: SurfaceSize) -> Result<PostPipeline> {
    let mut pipeline = PostPipeline::new(size.pixel_ratio)
        .with_effect(Fxaa::new())
        .with_effect(MouseInvert::new())
        .with_effect(Halftone::new());

    pipeline.set_enabled(Fxaa::NAME, effects.fxaa)?;
    pipeline.set_enabled(MouseInvert::NAME, effects.mouse_invert)?;
    pipeline.set_enabled(Halftone::NAME, effects.halftone)?;
    pipeline.set_param(Halftone::NAME, "pixel_size", effects.pixel_size)?;
    pipeline.resize(size.width, size.height, size.pixel_ratio);

    Ok(pipeline)
}

/// Digits toggle effects by chain position, arrows nudge the halftone cell
/// size, Escape quits.
fn handle_keys(frame: &mut FrameCtx<'_, '_>, pipeline: &mut PostPipeline) -> Result<()> {
    let input = frame.input_frame;
    let pressed = &input.keys_pressed;

    if pressed.contains(&Key::Escape) {
        frame.exit();
        return Ok(());
    }

    for key in pressed {
        if let Some(index) = key.digit_index() {
            let Some(name) = pipeline.effect_names().nth(index).map(str::to_string) else {
                continue;
            };
            pipeline.toggle(&name)?;
        }
    }

    let nudge = match (pressed.contains(&Key::ArrowUp), pressed.contains(&Key::ArrowDown)) {
        (true, false) => PIXEL_SIZE_NUDGE,
        (false, true) => -PIXEL_SIZE_NUDGE,
        _ => return Ok(()),
    };
    let current = pipeline.param(Halftone::NAME, "pixel_size")?;
    let stored = pipeline.set_param(Halftone::NAME, "pixel_size", current + nudge)?;
    log::info!("halftone: pixel_size {stored:.4}");
    Ok(())
}
