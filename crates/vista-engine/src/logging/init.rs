use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "vista_scene=debug,wgpu=warn").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Config with an explicit filter string.
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self { env_filter: Some(filter.into()), ..Self::default() }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
///
/// Filter precedence: `config.env_filter`, then `RUST_LOG`, then `info`.
/// wgpu's own crates are capped at `warn` unless the filter names them.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        let filter = config.env_filter.or_else(|| std::env::var("RUST_LOG").ok());
        match filter {
            Some(filter) => {
                if !filter.contains("wgpu") {
                    builder.filter_module("wgpu_core", log::LevelFilter::Warn);
                    builder.filter_module("wgpu_hal", log::LevelFilter::Warn);
                }
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(log::LevelFilter::Info);
                builder.filter_module("wgpu_core", log::LevelFilter::Warn);
                builder.filter_module("wgpu_hal", log::LevelFilter::Warn);
            }
        }

        builder.write_style(config.write_style);

        // try_init: a host application may already own the global logger.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
