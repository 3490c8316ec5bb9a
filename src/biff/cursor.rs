//! Курсор чтения поверх уже загруженного в память диапазона байт.
//!
//! Блокирующий I/O остаётся за вызывающей стороной: кодек получает готовый
//! срез и только двигается по нему. Курсор помнит абсолютное смещение начала
//! среза, чтобы ошибки указывали позицию в исходном файле.

use biffkit_error::{BiffError, BiffResult};
use byteorder::{ByteOrder, LittleEndian};

/// Курсор чтения.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    base_offset: u64,
}

impl<'a> ByteCursor<'a> {
    /// Курсор в начале среза; смещения считаются от нуля.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base_offset(data, 0)
    }

    /// Курсор над вложенным срезом, начинающимся на `base_offset` исходного
    /// потока.
    pub fn with_base_offset(
        data: &'a [u8],
        base_offset: u64,
    ) -> Self {
        Self {
            data,
            pos: 0,
            base_offset,
        }
    }

    /// Читает ровно `n` байт.
    ///
    /// При нехватке данных курсор не сдвигается и возвращается
    /// `TruncatedData` с описанием `context`.
    pub fn read_bytes(
        &mut self,
        n: usize,
        context: &str,
    ) -> BiffResult<&'a [u8]> {
        let available = self.remaining();
        if available < n {
            return Err(BiffError::truncated(
                context,
                self.position(),
                n as u64,
                available as u64,
            ));
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..self.pos])
    }

    /// Читает 4-байтовое беззнаковое little-endian.
    pub fn read_u32(
        &mut self,
        context: &str,
    ) -> BiffResult<u32> {
        self.read_bytes(4, context).map(LittleEndian::read_u32)
    }

    /// Читает 4-байтовое знаковое little-endian.
    pub fn read_i32(
        &mut self,
        context: &str,
    ) -> BiffResult<i32> {
        self.read_bytes(4, context).map(LittleEndian::read_i32)
    }

    /// Читает 4-байтовый IEEE-754 float little-endian (бит в бит).
    pub fn read_f32(
        &mut self,
        context: &str,
    ) -> BiffResult<f32> {
        self.read_bytes(4, context).map(LittleEndian::read_f32)
    }

    /// Достигнут ли конец среза.
    pub fn eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Сколько байт осталось.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Абсолютное смещение текущей позиции в исходном потоке.
    pub fn position(&self) -> u64 {
        self.base_offset + self.pos as u64
    }

    /// Позиция относительно начала среза.
    pub fn local_position(&self) -> usize {
        self.pos
    }

    /// Весь срез, над которым работает курсор.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет чтение little-endian значений и сдвиг позиции.
    #[test]
    fn test_reads_little_endian() {
        let bytes = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x3E, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut cursor = ByteCursor::new(&bytes);

        assert_eq!(cursor.read_u32("u32").unwrap(), 1);
        assert_eq!(cursor.read_f32("f32").unwrap(), 0.25);
        assert_eq!(cursor.read_i32("i32").unwrap(), -1);
        assert!(cursor.eof());
        assert_eq!(cursor.position(), 12);
    }

    /// Тест проверяет, что нехватка байт даёт TruncatedData с абсолютным
    /// смещением, а курсор остаётся на месте.
    #[test]
    fn test_truncated_reports_absolute_offset() {
        let bytes = [0xAA, 0xBB];
        let mut cursor = ByteCursor::with_base_offset(&bytes, 100);

        let err = cursor.read_u32("payload length").unwrap_err();
        match err {
            BiffError::TruncatedData {
                offset,
                expected_bytes,
                got_bytes,
                ..
            } => {
                assert_eq!(offset, 100);
                assert_eq!(expected_bytes, 4);
                assert_eq!(got_bytes, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(cursor.local_position(), 0);
        assert_eq!(cursor.remaining(), 2);
    }
}
