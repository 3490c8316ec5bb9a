pub mod biff_error;
pub mod schema_error;

// Публичный экспорт всех типов ошибок из вложенных модулей,
// чтобы упростить доступ к ним из внешнего кода.
pub use biff_error::*;
pub use schema_error::*;

use crate::{ErrorExt, StatusCode};

/// Универсальная ошибка с кодом и сообщением.
#[derive(Debug, Clone)]
pub struct GenericError {
    code: StatusCode,
    message: String,
}

impl GenericError {
    pub fn new(
        code: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for GenericError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GenericError {}

impl ErrorExt for GenericError {
    fn status_code(&self) -> StatusCode {
        self.code
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Конвертация из std::io::Error (чтение файла таблицы, запись в sink).
impl From<std::io::Error> for crate::StackError {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => StatusCode::NotFound,
            std::io::ErrorKind::UnexpectedEof => StatusCode::UnexpectedEof,
            std::io::ErrorKind::InvalidData => StatusCode::InvalidData,
            _ => StatusCode::Io,
        };

        crate::StackError::new(GenericError::new(code, err.to_string()))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    /// Тест проверяет базовое поведение GenericError: статус код и вывод в
    /// строку.
    #[test]
    fn test_generic_error_basic() {
        let err = GenericError::new(StatusCode::InvalidData, "test message");
        assert_eq!(err.status_code(), StatusCode::InvalidData);
        assert_eq!(err.to_string(), "test message");
    }

    /// Тест проверяет маппинг std::io::ErrorKind -> StatusCode в
    /// From<std::io::Error> for StackError.
    #[test]
    fn test_io_error_kind_mapping() {
        let cases = vec![
            (io::ErrorKind::NotFound, StatusCode::NotFound, "no such table"),
            (io::ErrorKind::UnexpectedEof, StatusCode::UnexpectedEof, "eof"),
            (io::ErrorKind::InvalidData, StatusCode::InvalidData, "bad"),
            (io::ErrorKind::Other, StatusCode::Io, "other"),
        ];

        for (kind, expected_code, msg) in cases {
            let stack: crate::StackError = io::Error::new(kind, msg).into();
            assert_eq!(stack.status_code(), expected_code, "kind={kind:?}");
            assert!(stack.to_string().contains(msg));
        }
    }
}
