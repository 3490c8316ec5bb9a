//! Теги записей BIFF.
//!
//! Тег: ровно 4 ASCII-байта. Сравнение побайтовое, регистр значим.
//! Теги уникальны только в пределах схемы одной сущности.

use std::fmt;

use serde::{Serialize, Serializer};

/// Зарезервированный тег маркера конца группы записей.
pub const END_TAG: Tag = Tag(*b"ENDB");

/// Размер тега на проводе.
pub const TAG_LEN: usize = 4;

/// Четырёхбайтовый идентификатор записи.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag([u8; TAG_LEN]);

impl Tag {
    /// Создаёт тег из литерала. Проверка ASCII выполняется при построении
    /// схемы, поэтому здесь её нет.
    pub const fn new(bytes: [u8; TAG_LEN]) -> Self {
        Self(bytes)
    }

    /// Разбирает тег из строки: ровно 4 печатных ASCII-символа.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != TAG_LEN || !bytes.iter().all(|b| b.is_ascii_graphic()) {
            return None;
        }
        let mut out = [0u8; TAG_LEN];
        out.copy_from_slice(bytes);
        Some(Self(out))
    }

    /// Сырые байты тега в порядке записи.
    pub const fn as_bytes(&self) -> &[u8; TAG_LEN] {
        &self.0
    }

    /// Является ли тег маркером конца группы.
    pub fn is_end(&self) -> bool {
        *self == END_TAG
    }
}

impl From<[u8; TAG_LEN]> for Tag {
    fn from(bytes: [u8; TAG_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Tag {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        // Теги из чужих файлов не обязаны быть печатными.
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02X}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет разбор корректных и некорректных тегов.
    #[test]
    fn test_parse() {
        assert_eq!(Tag::parse("ELAS"), Some(Tag::new(*b"ELAS")));
        assert_eq!(Tag::parse("ELA"), None);
        assert_eq!(Tag::parse("ELAST"), None);
        assert_eq!(Tag::parse("EL S"), None);
        assert_eq!(Tag::parse("ЭЛАС"), None);
    }

    /// Тест проверяет, что сравнение тегов чувствительно к регистру.
    #[test]
    fn test_case_sensitive() {
        assert_ne!(Tag::new(*b"NAME"), Tag::new(*b"name"));
        assert!(END_TAG.is_end());
        assert!(!Tag::new(*b"ENDb").is_end());
    }

    /// Тест проверяет отображение непечатных байтов.
    #[test]
    fn test_display_non_printable() {
        let tag = Tag::new([b'A', 0x00, b'B', 0xFF]);
        assert_eq!(tag.to_string(), "A\\x00B\\xFF");
        assert_eq!(format!("{:?}", END_TAG), "Tag(ENDB)");
    }
}
