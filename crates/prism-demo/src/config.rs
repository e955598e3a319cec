use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Startup knobs, read once from `prism.toml`.
///
/// Every section and key is optional; missing values fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub window: WindowSection,
    pub effects: EffectsSection,
    pub rolling: RollingSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowSection {
    pub title: String,
    pub width: f64,
    pub height: f64,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            width: 1280.0,
            height: 720.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EffectsSection {
    pub fxaa: bool,
    pub mouse_invert: bool,
    pub halftone: bool,
    pub pixel_size: f32,
}

impl Default for EffectsSection {
    fn default() -> Self {
        Self {
            fxaa: true,
            mouse_invert: false,
            halftone: true,
            pixel_size: 0.001,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RollingSection {
    pub velocity: f32,
    pub damping: f32,
}

impl Default for RollingSection {
    fn default() -> Self {
        Self {
            velocity: 0.15,
            damping: 0.98,
        }
    }
}

impl DemoConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("config: {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))?;
        log::info!("config: loaded {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(DemoConfig::parse("").unwrap(), DemoConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let c = DemoConfig::parse(
            r#"
            [effects]
            mouse_invert = true
            pixel_size = 0.004

            [rolling]
            damping = 0.9
            "#,
        )
        .unwrap();

        assert!(c.effects.mouse_invert);
        assert!(c.effects.fxaa);
        assert_eq!(c.effects.pixel_size, 0.004);
        assert_eq!(c.rolling.damping, 0.9);
        assert_eq!(c.rolling.velocity, 0.15);
        assert_eq!(c.window, WindowSection::default());
    }

    #[test]
    fn wrong_type_is_an_error() {
        assert!(DemoConfig::parse("[rolling]\nvelocity = \"fast\"").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let c = DemoConfig::load(Path::new("definitely/not/here/prism.toml")).unwrap();
        assert_eq!(c, DemoConfig::default());
    }
}
