use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{biff::HashAlgorithm, logging::LoggingConfig, table::RecoveryPolicy};

/// Настройки CLI и библиотеки.
///
/// Источники в порядке приоритета (последний побеждает): значения по
/// умолчанию, файл `biffkit.toml`, переменные окружения `BIFFKIT_*`
/// (вложенные ключи через `__`, например `BIFFKIT_LOGGING__LEVEL=debug`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Алгоритм контрольной суммы секции
    pub hash_algorithm: HashAlgorithm,
    /// Что делать с группой, которую не удалось декодировать
    pub on_group_error: RecoveryPolicy,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Файл, который ищется в текущем каталоге.
    pub const DEFAULT_FILE: &'static str = "biffkit.toml";
    pub const ENV_PREFIX: &'static str = "BIFFKIT";

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Загружает настройки; явно указанный файл обязан существовать.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::from(Path::new(Self::DEFAULT_FILE)).required(false),
        };

        let cfg = Config::builder()
            // Добавляем значения по умолчанию
            .set_default("hash_algorithm", HashAlgorithm::default().to_string())?
            .set_default("on_group_error", RecoveryPolicy::default().to_string())?
            .add_source(file)
            // Переменные окружения с префиксом BIFFKIT_
            .add_source(
                Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        // Десериализуем конфигурацию в нашу структуру
        cfg.try_deserialize()
    }
}
