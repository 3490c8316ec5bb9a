use tracing_subscriber::EnvFilter;

use crate::logging::config::LoggingConfig;

/// Строит `EnvFilter`: `RUST_LOG` имеет приоритет над директивой из
/// конфигурации.
pub fn build_filter_from_config(config: &LoggingConfig) -> EnvFilter {
    if let Ok(env_filter) = EnvFilter::try_from_default_env() {
        return env_filter;
    }
    directive_or_info(&config.build_filter_directive())
}

/// Фильтр по директиве; некорректная директива заменяется на `info`.
pub fn directive_or_info(directive: &str) -> EnvFilter {
    match EnvFilter::try_new(directive) {
        Ok(filter) => filter,
        Err(e) => {
            // подписчика ещё нет, поэтому сообщение идёт напрямую в stderr
            eprintln!("Invalid log filter directive '{directive}': {e}; falling back to 'info'");
            EnvFilter::new("info")
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
