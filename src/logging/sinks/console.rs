use std::io::{self, Stderr};

use tracing_subscriber::registry::LookupSpan;

use crate::logging::{
    config::LoggingConfig,
    formatter::{build_formatter, BoxedLayer},
};

/// Console layer по конфигурации.
///
/// Логи идут в stderr: stdout занят выводом команд CLI.
pub fn layer_with_config<S>(config: &LoggingConfig) -> BoxedLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let writer: fn() -> Stderr = io::stderr;
    build_formatter(config.format, writer, config.with_ansi, config.with_target)
}
