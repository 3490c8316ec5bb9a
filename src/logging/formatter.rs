use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::Layer as LayerTrait,
    registry::LookupSpan,
};

use crate::logging::config::LogFormat;

/// Boxed слой форматирования: стирает конкретный тип формата
/// (json/pretty/compact) и writer.
pub type BoxedLayer<S> = Box<dyn LayerTrait<S> + Send + Sync>;

/// Строит fmt-слой в заданном формате поверх произвольного writer.
pub fn build_formatter<S, W>(
    format: LogFormat,
    writer: W,
    with_ansi: bool,
    with_target: bool,
) -> BoxedLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => Box::new(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(with_target),
        ),
        LogFormat::Pretty => Box::new(
            fmt::layer()
                .pretty()
                .with_writer(writer)
                .with_ansi(with_ansi)
                .with_target(with_target),
        ),
        LogFormat::Compact => Box::new(
            fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(with_ansi)
                .with_target(with_target),
        ),
    }
}
