mod canvas;
mod config;
mod rolling;

use std::path::PathBuf;

use anyhow::Result;
use winit::dpi::LogicalSize;

use prism_engine::device::GpuInit;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::window::{Runtime, RuntimeConfig};

use crate::canvas::Canvas;
use crate::config::DemoConfig;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("prism.toml"));
    let config = DemoConfig::load(&path)?;

    let runtime = RuntimeConfig {
        title: config.window.title.clone(),
        initial_size: LogicalSize::new(config.window.width, config.window.height),
    };

    Runtime::run(runtime, GpuInit::default(), Canvas::new(config))
}
