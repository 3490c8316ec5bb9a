use std::{any::Any, error::Error};

use crate::StatusCode;

/// Общий интерфейс ошибок кодека (object-safe).
///
/// [`StackError`](crate::StackError) хранит корневую ошибку как
/// `dyn ErrorExt` и через этот трейт строит отчёт для CLI и запись в лог.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Категория ошибки. По умолчанию [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Для downcast к конкретному типу.
    fn as_any(&self) -> &dyn Any;

    /// Короткое сообщение для пользователя CLI.
    ///
    /// Внутренние ошибки не раскрывают деталей.
    fn client_message(&self) -> String {
        match self.status_code() {
            StatusCode::Internal => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Что можно сделать с входным файлом, чтобы ошибка ушла.
    fn recovery_hint(&self) -> Option<&'static str> {
        None
    }

    /// Полное описание для лога.
    fn log_message(&self) -> String {
        match self.recovery_hint() {
            Some(hint) => format!("{self:?} | Hint: {hint}"),
            None => format!("{self:?}"),
        }
    }
}
