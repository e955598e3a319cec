use glam::Vec2;
use prism_engine::coords::SurfaceSize;
use prism_engine::input::PointerEvent;
use prism_engine::uniforms::{ParamError, ParamSpec, Tunable};

/// Pointer-driven spin of the donut.
///
/// Hovering adds the pointer movement (as a fraction of the surface) to a
/// velocity that decays by `damping` every frame.
#[derive(Debug, Clone)]
pub struct Rolling {
    params: [ParamSpec; 2],
    velocity_factor: f32,
    damping: f32,
    velocity: Vec2,
}

const MOVEMENT_GAIN: f32 = 2.5;
const SPIN_GAIN: f32 = 3.0;
const IDLE_TWIST: f32 = 0.01;

impl Rolling {
    pub fn new(velocity_factor: f32, damping: f32) -> Self {
        let mut rolling = Self {
            params: [
                ParamSpec::new("velocity", 0.0, 0.3, 0.01),
                ParamSpec::new("damping", 0.0, 1.0, 0.0001),
            ],
            velocity_factor: 0.15,
            damping: 0.98,
            velocity: Vec2::ZERO,
        };
        for (name, value) in [("velocity", velocity_factor), ("damping", damping)] {
            if let Err(err) = rolling.set_param(name, value) {
                log::warn!("rolling: {err}; keeping default");
            }
        }
        rolling
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Accumulates one hover event.
    pub fn push(&mut self, event: &PointerEvent, size: SurfaceSize) {
        if !size.is_valid() {
            return;
        }
        let delta = Vec2::new(event.movement_x / size.width, event.movement_y / size.height);
        self.velocity += delta * MOVEMENT_GAIN * self.velocity_factor;
    }

    /// Decays the velocity and returns the XYZ euler step to apply this frame.
    pub fn step(&mut self) -> (f32, f32, f32) {
        self.velocity *= self.damping;
        (self.velocity.y * SPIN_GAIN, self.velocity.x * SPIN_GAIN, IDLE_TWIST)
    }
}

impl Default for Rolling {
    fn default() -> Self {
        Self::new(0.15, 0.98)
    }
}

impl Tunable for Rolling {
    fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    fn param(&self, name: &str) -> Option<f32> {
        match name {
            "velocity" => Some(self.velocity_factor),
            "damping" => Some(self.damping),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: f32) -> Result<f32, ParamError> {
        let spec = self
            .param_spec(name)
            .ok_or_else(|| ParamError::Unknown(name.to_string()))?;
        let value = spec.clamp(value)?;
        match name {
            "velocity" => self.velocity_factor = value,
            _ => self.damping = value,
        }
        Ok(value)
    }
}
