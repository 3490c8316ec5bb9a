pub mod config;
mod filters;
mod formatter;
pub mod handle;
pub mod sinks;

use std::path::PathBuf;

pub use config::{FileRotation, LogFormat, LoggingConfig};
pub use handle::LoggingHandle;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Ошибки инициализации логирования.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log level or directive: '{0}'")]
    InvalidLevel(String),
    #[error("invalid log file path: {}", .0.display())]
    InvalidFile(PathBuf),
    #[error("failed to create log directory {}: {source}", path.display())]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open log file: {0}")]
    Appender(String),
    #[error("global subscriber already installed: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Инициализация логирования с конфигурацией.
///
/// Возвращённый handle нужно держать до завершения процесса, иначе хвост
/// файлового лога будет потерян.
pub fn init_logging(config: LoggingConfig) -> Result<LoggingHandle, LoggingError> {
    config.validate()?;
    config.ensure_log_dir()?;

    let env_filter = filters::build_filter_from_config(&config);
    let mut layers = Vec::new();

    layers.push(sinks::console::layer_with_config(&config));

    let file_guard = match sinks::file::layer_with_config(&config)? {
        Some((file_layer, guard)) => {
            layers.push(file_layer);
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        directive = %config.build_filter_directive(),
        format = %config.format,
        file = ?config.file,
        "logging initialized"
    );

    Ok(LoggingHandle::new(file_guard))
}
