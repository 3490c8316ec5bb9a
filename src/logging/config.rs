use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing_appender::rolling::Rotation;

use super::LoggingError;

/// Формат вывода событий.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Период ротации файла логов.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FileRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Настройки логирования.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень (`info`) или готовая директива (`biffkit=trace,warn`)
    pub level: String,
    /// Формат вывода в stderr
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    /// Файл для логов; `None` отключает файловый sink
    pub file: Option<PathBuf>,
    /// Формат файлового sink
    pub file_format: LogFormat,
    pub rotation: FileRotation,
}

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            with_ansi: true,
            with_target: true,
            file: None,
            file_format: LogFormat::Json,
            rotation: FileRotation::Never,
        }
    }
}

impl LoggingConfig {
    /// Директива для `EnvFilter`.
    ///
    /// Одиночный уровень применяется к событиям этого крейта, всё остальное
    /// фильтруется по `warn`. Директива с `=` или `,` передаётся как есть.
    pub fn build_filter_directive(&self) -> String {
        let level = self.level.trim();
        if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("warn,biffkit={}", level.to_ascii_lowercase())
        }
    }

    /// Проверяет уровень и путь к файлу.
    pub fn validate(&self) -> Result<(), LoggingError> {
        let level = self.level.trim();
        if level.is_empty() {
            return Err(LoggingError::InvalidLevel(self.level.clone()));
        }
        let is_directive = level.contains('=') || level.contains(',');
        if !is_directive && !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(LoggingError::InvalidLevel(self.level.clone()));
        }
        if let Some(path) = &self.file {
            if path.file_name().is_none() {
                return Err(LoggingError::InvalidFile(path.clone()));
            }
        }
        Ok(())
    }

    /// Каталог и имя файла для файлового sink.
    pub fn file_parts(&self) -> Option<(&Path, &std::ffi::OsStr)> {
        let path = self.file.as_deref()?;
        let name = path.file_name()?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        Some((dir, name))
    }

    /// Создаёт каталог для файла логов, если его нет.
    pub fn ensure_log_dir(&self) -> Result<(), LoggingError> {
        if let Some((dir, _)) = self.file_parts() {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::LogDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Понижает уровень на `verbose` ступеней вниз (к trace) или поднимает
    /// до `error` при `quiet`.
    pub fn adjust_verbosity(
        &mut self,
        verbose: u8,
        quiet: bool,
    ) {
        if quiet {
            self.level = "error".to_string();
            return;
        }
        if verbose == 0 {
            return;
        }
        self.level = match verbose {
            1 => "debug",
            _ => "trace",
        }
        .to_string();
    }
}

impl From<FileRotation> for Rotation {
    fn from(r: FileRotation) -> Self {
        match r {
            FileRotation::Never => Rotation::NEVER,
            FileRotation::Hourly => Rotation::HOURLY,
            FileRotation::Daily => Rotation::DAILY,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
