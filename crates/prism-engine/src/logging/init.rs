use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "prism_engine=debug,wgpu_core=warn"). When unset, `RUST_LOG` is consulted and
/// then `default_level` applies.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,

    /// Keep the GPU backend crates at `warn` unless a filter names them.
    pub quiet_gpu_backend: bool,

    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            quiet_gpu_backend: true,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

const GPU_BACKEND_MODULES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Subsequent calls are ignored, so tests and binaries may both call it.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(config.default_level);

        if config.quiet_gpu_backend {
            for module in GPU_BACKEND_MODULES {
                builder.filter_module(module, log::LevelFilter::Warn);
            }
        }

        // Explicit filters are parsed last so they override the defaults above.
        if let Some(filter) = config.env_filter.as_deref() {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        }

        builder.write_style(config.write_style);
        builder.format_timestamp_millis();

        if builder.try_init().is_err() {
            // Another logger was installed by the host (e.g. a test harness).
            return;
        }

        log::debug!("logging initialized");
    });
}
