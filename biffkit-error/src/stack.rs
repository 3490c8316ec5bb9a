use std::{fmt, panic::Location, sync::Arc};

use crate::{ErrorExt, LogLevel, StatusCode};

/// Корневая ошибка кодека плюс цепочка контекстов, добавленных по пути
/// наверх (какой файл, какая группа).
#[derive(Clone)]
pub struct StackError {
    root: Arc<dyn ErrorExt>,
    contexts: Vec<ErrorContext>,
}

/// Один уровень контекста и место в коде, где он был добавлен.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub message: String,
    pub location: &'static Location<'static>,
}

impl StackError {
    pub fn new<E: ErrorExt>(err: E) -> Self {
        Self {
            root: Arc::new(err),
            contexts: Vec::new(),
        }
    }

    /// Добавляет внешний уровень контекста.
    #[track_caller]
    pub fn context(
        mut self,
        msg: impl Into<String>,
    ) -> Self {
        self.contexts.push(ErrorContext {
            message: msg.into(),
            location: Location::caller(),
        });
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.root.status_code()
    }

    /// Контексты от внутреннего к внешнему.
    pub fn contexts(&self) -> &[ErrorContext] {
        &self.contexts
    }

    pub fn downcast_ref<T: ErrorExt>(&self) -> Option<&T> {
        self.root.as_any().downcast_ref::<T>()
    }

    /// Уровень, с которым ошибку следует писать в лог.
    pub fn log_level(&self) -> LogLevel {
        self.status_code().log_level()
    }

    /// Полная запись для лога: корневая ошибка с подсказкой и места, где
    /// добавлялись контексты.
    pub fn log_message(&self) -> String {
        let mut msg = self.root.log_message();
        for ctx in &self.contexts {
            msg.push_str(&format!(
                " <- {} ({}:{})",
                ctx.message,
                ctx.location.file(),
                ctx.location.line()
            ));
        }
        msg
    }

    /// Отчёт для пользователя CLI.
    ///
    /// Первая строка: короткое сообщение и код. Затем контексты от внешнего
    /// к внутреннему, подробности (если короткое сообщение их скрыло) и
    /// подсказка.
    pub fn report(&self) -> String {
        let short = self.root.client_message();
        let mut out = format!("{short} [{}]", self.status_code());
        for ctx in self.contexts.iter().rev() {
            out.push_str(&format!("\n  in {}", ctx.message));
        }
        let full = self.root.to_string();
        if full != short {
            out.push_str(&format!("\n  details: {full}"));
        }
        if let Some(hint) = self.root.recovery_hint() {
            out.push_str(&format!("\n  hint: {hint}"));
        }
        out
    }
}

impl fmt::Debug for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("StackError")
            .field("root", &self.root.to_string())
            .field("status_code", &self.status_code())
            .field("contexts", &self.contexts)
            .finish()
    }
}

impl fmt::Display for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for ctx in self.contexts.iter().rev() {
            write!(f, "{} → ", ctx.message)?;
        }
        write!(f, "{}", self.root)
    }
}

impl std::error::Error for StackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.root.as_ref())
    }
}

impl<E: ErrorExt> From<E> for StackError {
    fn from(e: E) -> Self {
        StackError::new(e)
    }
}

impl From<StackError> for std::io::Error {
    fn from(e: StackError) -> Self {
        std::io::Error::other(e.to_string())
    }
}
