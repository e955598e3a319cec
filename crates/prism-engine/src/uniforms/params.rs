use super::ParamError;

/// Declared range and step of one tunable numeric parameter.
///
/// `step` is a hint for external controls; values are not snapped to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, min: f32, max: f32, step: f32) -> Self {
        debug_assert!(min <= max);
        Self { name: name.into(), min, max, step }
    }

    /// Clamps `value` into the declared range. Non-finite input is rejected.
    pub fn clamp(&self, value: f32) -> Result<f32, ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotFinite(self.name.clone()));
        }
        Ok(value.clamp(self.min, self.max))
    }
}

/// Generic get/set surface for numeric knobs.
///
/// Implemented by effect passes and by application-side tunables so one control
/// surface (config file, keyboard shortcuts, a future panel) drives them all.
pub trait Tunable {
    fn params(&self) -> &[ParamSpec];

    fn param(&self, name: &str) -> Option<f32>;

    /// Writes a parameter, clamped to its declared range. Returns the stored value.
    fn set_param(&mut self, name: &str, value: f32) -> Result<f32, ParamError>;

    fn param_spec(&self, name: &str) -> Option<&ParamSpec> {
        self.params().iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_to_declared_range() {
        let spec = ParamSpec::new("u_pixel_size", 0.0, 0.01, 0.0001);
        assert_eq!(spec.clamp(0.5), Ok(0.01));
        assert_eq!(spec.clamp(-1.0), Ok(0.0));
        assert_eq!(spec.clamp(0.002), Ok(0.002));
    }

    #[test]
    fn non_finite_is_rejected() {
        let spec = ParamSpec::new("damping", 0.0, 1.0, 0.0001);
        assert_eq!(spec.clamp(f32::NAN), Err(ParamError::NotFinite("damping".into())));
    }
}
