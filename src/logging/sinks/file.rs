use tracing_appender::{
    non_blocking,
    non_blocking::WorkerGuard,
    rolling::RollingFileAppender,
};
use tracing_subscriber::registry::LookupSpan;

use crate::logging::{
    config::LoggingConfig,
    formatter::{build_formatter, BoxedLayer},
    LoggingError,
};

/// File layer с неблокирующим writer.
///
/// Guard должен жить до конца работы: при его drop буфер сбрасывается в
/// файл. Возвращает `None`, если файл в конфигурации не задан.
pub fn layer_with_config<S>(
    config: &LoggingConfig
) -> Result<Option<(BoxedLayer<S>, WorkerGuard)>, LoggingError>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let Some((dir, name)) = config.file_parts() else {
        return Ok(None);
    };

    let appender = RollingFileAppender::builder()
        .rotation(config.rotation.into())
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .map_err(|e| LoggingError::Appender(e.to_string()))?;
    let (writer, guard) = non_blocking(appender);

    let layer = build_formatter(config.file_format, writer, false, true);
    Ok(Some((layer, guard)))
}
