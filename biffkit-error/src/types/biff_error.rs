use std::any::Any;

use crate::{ErrorExt, SchemaError, StatusCode};

/// Ошибка кодека BIFF с контекстом для диагностики повреждённых файлов.
///
/// Каждая ошибка чтения несёт абсолютное смещение в потоке, а по мере подъёма
/// по стеку к ней приклеиваются тег записи и тип сущности, которые
/// обрабатывались в момент сбоя.
#[derive(Debug, Clone)]
pub enum BiffError {
    /// Поток закончился раньше, чем удалось прочитать примитив или запись
    TruncatedData {
        context: String,
        offset: u64,
        tag: Option<String>,
        item_type: Option<String>,
        expected_bytes: u64,
        got_bytes: u64,
    },

    /// Некорректная UTF-16 строка (нечётная длина, непарный суррогат)
    InvalidWideString {
        reason: String,
        offset: u64,
        tag: Option<String>,
        item_type: Option<String>,
    },

    /// Ошибка объявления схемы (делегирование в SchemaError)
    Schema(SchemaError),

    /// Контрольная сумма потока записей не совпадает с ожидаемой
    HashMismatch {
        algorithm: String,
        expected: String,
        computed: String,
    },

    /// Ошибка записи в sink
    Io { operation: String, reason: String },
}

impl BiffError {
    /// Создаёт `TruncatedData` без тега и типа сущности.
    pub fn truncated(
        context: impl Into<String>,
        offset: u64,
        expected_bytes: u64,
        got_bytes: u64,
    ) -> Self {
        Self::TruncatedData {
            context: context.into(),
            offset,
            tag: None,
            item_type: None,
            expected_bytes,
            got_bytes,
        }
    }

    /// Создаёт `Io` из ошибки записи.
    pub fn io(
        operation: impl Into<String>,
        err: &std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            reason: err.to_string(),
        }
    }

    /// Добавляет тег записи, если он ещё не указан.
    ///
    /// Самый внутренний контекст выигрывает: тег, выставленный на уровне
    /// записи, не перезаписывается на уровне сущности.
    pub fn with_tag(
        mut self,
        tag: impl Into<String>,
    ) -> Self {
        match &mut self {
            Self::TruncatedData { tag: t, .. } | Self::InvalidWideString { tag: t, .. } => {
                if t.is_none() {
                    *t = Some(tag.into());
                }
            }
            _ => {}
        }
        self
    }

    /// Добавляет тип сущности, если он ещё не указан.
    pub fn with_item_type(
        mut self,
        item_type: impl Into<String>,
    ) -> Self {
        match &mut self {
            Self::TruncatedData { item_type: i, .. }
            | Self::InvalidWideString { item_type: i, .. } => {
                if i.is_none() {
                    *i = Some(item_type.into());
                }
            }
            _ => {}
        }
        self
    }

    /// Смещение, на котором произошла ошибка чтения.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::TruncatedData { offset, .. } | Self::InvalidWideString { offset, .. } => {
                Some(*offset)
            }
            _ => None,
        }
    }

    /// Тег записи, обрабатывавшейся в момент ошибки.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::TruncatedData { tag, .. } | Self::InvalidWideString { tag, .. } => {
                tag.as_deref()
            }
            _ => None,
        }
    }

    /// Является ли ошибка усечением потока.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::TruncatedData { .. })
    }

    /// Может ли контейнер пропустить группу и продолжить (если её границы
    /// известны).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TruncatedData { .. } | Self::InvalidWideString { .. }
        )
    }
}

impl std::fmt::Display for BiffError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::TruncatedData {
                context,
                offset,
                tag,
                item_type,
                expected_bytes,
                got_bytes,
            } => {
                write!(
                    f,
                    "Truncated data: {context} (expected {expected_bytes} bytes, got {got_bytes})"
                )?;
                write_context(f, *offset, tag.as_deref(), item_type.as_deref())
            }
            Self::InvalidWideString {
                reason,
                offset,
                tag,
                item_type,
            } => {
                write!(f, "Invalid wide string: {reason}")?;
                write_context(f, *offset, tag.as_deref(), item_type.as_deref())
            }
            Self::Schema(e) => write!(f, "{e}"),
            Self::HashMismatch {
                algorithm,
                expected,
                computed,
            } => {
                write!(
                    f,
                    "{algorithm} digest mismatch: expected {expected}, computed {computed}"
                )
            }
            Self::Io { operation, reason } => write!(f, "I/O error during {operation}: {reason}"),
        }
    }
}

/// Вспомогательная функция для форматирования контекста (offset, tag, item).
fn write_context(
    f: &mut std::fmt::Formatter<'_>,
    offset: u64,
    tag: Option<&str>,
    item_type: Option<&str>,
) -> std::fmt::Result {
    let mut parts = vec![format!("offset: 0x{offset:X}")];
    if let Some(t) = tag {
        parts.push(format!("tag: {t}"));
    }
    if let Some(i) = item_type {
        parts.push(format!("item: {i}"));
    }
    write!(f, " [{}]", parts.join(", "))
}

impl std::error::Error for BiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl ErrorExt for BiffError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::TruncatedData { .. } => StatusCode::UnexpectedEof,
            Self::InvalidWideString { .. } => StatusCode::InvalidUtf16,
            Self::Schema(e) => e.status_code(),
            Self::HashMismatch { .. } => StatusCode::IntegrityMismatch,
            Self::Io { .. } => StatusCode::Io,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        match self {
            Self::TruncatedData { .. } => "Incomplete table file".to_string(),
            Self::InvalidWideString { .. } => "Corrupted text field in table file".to_string(),
            Self::Schema(e) => e.to_string(),
            Self::HashMismatch { .. } => "Table file checksum mismatch".to_string(),
            Self::Io { operation, .. } => format!("I/O error during {operation}"),
        }
    }

    fn recovery_hint(&self) -> Option<&'static str> {
        match self {
            Self::TruncatedData { .. } => Some("File may be truncated. Check file integrity"),
            Self::InvalidWideString { .. } => {
                Some("A wide string field is corrupted. Re-save the table in the editor")
            }
            Self::HashMismatch { .. } => {
                Some("Table content was modified or corrupted after it was written")
            }
            Self::Schema(_) => Some("Entity schema is misdeclared. This is a build defect"),
            Self::Io { .. } => None,
        }
    }
}

impl From<SchemaError> for BiffError {
    fn from(e: SchemaError) -> Self {
        BiffError::Schema(e)
    }
}

impl From<std::io::Error> for BiffError {
    fn from(e: std::io::Error) -> Self {
        BiffError::io("I/O", &e)
    }
}

// Конверсия в std::io::Error для кода, работающего через Read/Write
impl From<BiffError> for std::io::Error {
    fn from(e: BiffError) -> Self {
        let kind = match &e {
            BiffError::TruncatedData { .. } => std::io::ErrorKind::UnexpectedEof,
            BiffError::InvalidWideString { .. } | BiffError::HashMismatch { .. } => {
                std::io::ErrorKind::InvalidData
            }
            BiffError::Schema(_) => std::io::ErrorKind::Other,
            BiffError::Io { .. } => std::io::ErrorKind::Other,
        };

        std::io::Error::new(kind, e.to_string())
    }
}
