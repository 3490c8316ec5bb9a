//! Накопители контрольной суммы потока записей.
//!
//! Сериализатор передаёт в накопитель каждый выпущенный байт (тег, длина,
//! payload, маркер конца) строго в порядке записи на провод. Поэтому смена
//! порядка полей меняет итоговый digest.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use strum_macros::{Display, EnumString};

/// Алгоритм контрольной суммы.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HashAlgorithm {
    Crc32,
    #[default]
    Sha256,
}

/// Итоговое значение контрольной суммы.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Digest {
    pub algorithm: HashAlgorithm,
    pub bytes: Vec<u8>,
}

/// Контракт накопителя: `update` для каждого диапазона байт, `finalize` один
/// раз в конце.
pub trait HashAccumulator {
    /// Добавляет байты в накопитель.
    fn update(
        &mut self,
        bytes: &[u8],
    );

    /// Возвращает digest по всем переданным байтам.
    ///
    /// Состояние не сбрасывается, повторный вызов вернёт то же значение.
    fn finalize(&self) -> Digest;

    /// Сколько байт прошло через накопитель.
    fn bytes_hashed(&self) -> u64;
}

/// CRC32 (IEEE) поверх `crc32fast`.
#[derive(Debug, Clone, Default)]
pub struct Crc32Accumulator {
    hasher: crc32fast::Hasher,
    bytes: u64,
}

/// SHA-256 поверх `sha2`.
#[derive(Debug, Clone, Default)]
pub struct Sha256Accumulator {
    hasher: Sha256,
    bytes: u64,
}

/// Накопитель, выбираемый по настройкам во время выполнения.
#[derive(Debug, Clone)]
pub enum AnyHasher {
    Crc32(Crc32Accumulator),
    Sha256(Sha256Accumulator),
}

impl Digest {
    /// Hex-представление в нижнем регистре.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Разбирает hex-строку (регистр не важен). Возвращает `None` при
    /// нечётной длине или недопустимых символах.
    pub fn from_hex(
        algorithm: HashAlgorithm,
        s: &str,
    ) -> Option<Self> {
        let s = s.trim();
        if s.len() % 2 != 0 || !s.is_ascii() {
            return None;
        }
        let bytes = (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
            .collect::<Option<Vec<u8>>>()?;
        Some(Self { algorithm, bytes })
    }
}

impl fmt::Display for Digest {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

impl Crc32Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Текущее значение CRC как число.
    pub fn value(&self) -> u32 {
        self.hasher.clone().finalize()
    }
}

impl HashAccumulator for Crc32Accumulator {
    fn update(
        &mut self,
        bytes: &[u8],
    ) {
        self.hasher.update(bytes);
        self.bytes += bytes.len() as u64;
    }

    fn finalize(&self) -> Digest {
        Digest {
            algorithm: HashAlgorithm::Crc32,
            bytes: self.value().to_be_bytes().to_vec(),
        }
    }

    fn bytes_hashed(&self) -> u64 {
        self.bytes
    }
}

impl Sha256Accumulator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HashAccumulator for Sha256Accumulator {
    fn update(
        &mut self,
        bytes: &[u8],
    ) {
        self.hasher.update(bytes);
        self.bytes += bytes.len() as u64;
    }

    fn finalize(&self) -> Digest {
        Digest {
            algorithm: HashAlgorithm::Sha256,
            bytes: self.hasher.clone().finalize().to_vec(),
        }
    }

    fn bytes_hashed(&self) -> u64 {
        self.bytes
    }
}

impl AnyHasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Crc32 => Self::Crc32(Crc32Accumulator::new()),
            HashAlgorithm::Sha256 => Self::Sha256(Sha256Accumulator::new()),
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Crc32(_) => HashAlgorithm::Crc32,
            Self::Sha256(_) => HashAlgorithm::Sha256,
        }
    }
}

impl HashAccumulator for AnyHasher {
    fn update(
        &mut self,
        bytes: &[u8],
    ) {
        match self {
            Self::Crc32(h) => h.update(bytes),
            Self::Sha256(h) => h.update(bytes),
        }
    }

    fn finalize(&self) -> Digest {
        match self {
            Self::Crc32(h) => h.finalize(),
            Self::Sha256(h) => h.finalize(),
        }
    }

    fn bytes_hashed(&self) -> u64 {
        match self {
            Self::Crc32(h) => h.bytes_hashed(),
            Self::Sha256(h) => h.bytes_hashed(),
        }
    }
}
