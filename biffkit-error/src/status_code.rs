use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Категория ошибки.
///
/// # Диапазоны:
/// - 1xxx: внутренние сбои
/// - 2xxx: входные данные
/// - 5xxx: целостность
/// - 6xxx: IO и усечение потока
/// - 8xxx: кодек и схема
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    Internal = 1003,

    NotFound = 2000,
    InvalidData = 2009,

    IntegrityMismatch = 5008,

    Io = 6000,
    UnexpectedEof = 6007,

    InvalidUtf16 = 8012,
    SchemaInvalid = 8013,
    UnknownWireKind = 8014,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Warn,
    Error,
}

impl StatusCode {
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Виноват входной файл (повреждён, усечён, изменён), а не сборка.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound
                | Self::InvalidData
                | Self::IntegrityMismatch
                | Self::UnexpectedEof
                | Self::InvalidUtf16
        )
    }

    /// Уровень лога: ошибки сборки и внутренние сбои громче ошибок данных.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::NotFound => LogLevel::Debug,
            Self::Internal | Self::SchemaInvalid | Self::UnknownWireKind => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}
