//! Примитивы проводного формата BIFF.
//!
//! Все числовые значения: 4 байта little-endian. Декодирование идёт по
//! курсору (сколько байт потреблено, видно по его позиции), кодирование
//! дописывает байты в буфер и не может завершиться ошибкой.
//!
//! | Тип            | На проводе                                        |
//! |----------------|---------------------------------------------------|
//! | Int            | i32                                               |
//! | Float          | f32 (бит в бит, без проверки диапазона)           |
//! | Bool           | u32, ненулевое = true; пишется 0/1                |
//! | StringNarrow   | u32 длина в байтах + Latin-1 байты                |
//! | StringWide     | u32 длина в байтах + UTF-16LE code units          |
//! | Vertex2D       | f32 x, f32 y                                      |
//! | Vertex3D       | f32 x, f32 y, f32 z [+ f32 выравнивание]          |

use biffkit_error::{BiffError, BiffResult};
use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use super::ByteCursor;
use crate::math::{Vertex2D, Vertex3D};

/// Размер одного скалярного значения на проводе.
pub const SCALAR_LEN: usize = 4;

/// Размер Vertex3D с выравниванием.
pub const PADDED_VERTEX3D_LEN: usize = 16;

/// Символ, которым заменяются не-Latin-1 символы в узких строках.
pub const NARROW_REPLACEMENT: u8 = b'?';

/// Декодированное значение без привязки к полю сущности.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireValue {
    Int(i32),
    Float(f32),
    Bool(bool),
    String(String),
    Vertex2D(Vertex2D),
    Vertex3D(Vertex3D),
}

////////////////////////////////////////////////////////////////////////////////
// Декодирование
////////////////////////////////////////////////////////////////////////////////

pub fn decode_int(cursor: &mut ByteCursor<'_>) -> BiffResult<i32> {
    cursor.read_i32("Int payload")
}

pub fn decode_float(cursor: &mut ByteCursor<'_>) -> BiffResult<f32> {
    cursor.read_f32("Float payload")
}

pub fn decode_bool(cursor: &mut ByteCursor<'_>) -> BiffResult<bool> {
    cursor.read_u32("Bool payload").map(|v| v != 0)
}

/// Узкая строка: каждый байт: символ U+0000..U+00FF.
pub fn decode_string_narrow(cursor: &mut ByteCursor<'_>) -> BiffResult<String> {
    let len = cursor.read_u32("string length prefix")? as usize;
    let bytes = cursor.read_bytes(len, "narrow string bytes")?;
    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Широкая строка: длина в байтах, затем UTF-16LE.
pub fn decode_string_wide(cursor: &mut ByteCursor<'_>) -> BiffResult<String> {
    let prefix_offset = cursor.position();
    let len = cursor.read_u32("wide string length prefix")? as usize;
    if len % 2 != 0 {
        return Err(BiffError::InvalidWideString {
            reason: format!("odd byte count {len}"),
            offset: prefix_offset,
            tag: None,
            item_type: None,
        });
    }

    let data_offset = cursor.position();
    let bytes = cursor.read_bytes(len, "wide string code units")?;
    let units: Vec<u16> = bytes.chunks_exact(2).map(LittleEndian::read_u16).collect();
    String::from_utf16(&units).map_err(|e| BiffError::InvalidWideString {
        reason: e.to_string(),
        offset: data_offset,
        tag: None,
        item_type: None,
    })
}

pub fn decode_vertex2d(cursor: &mut ByteCursor<'_>) -> BiffResult<Vertex2D> {
    let x = cursor.read_f32("Vertex2D.x")?;
    let y = cursor.read_f32("Vertex2D.y")?;
    Ok(Vertex2D { x, y })
}

/// Vertex3D; при `padded` дополнительно потребляет и отбрасывает float
/// выравнивания.
pub fn decode_vertex3d(
    cursor: &mut ByteCursor<'_>,
    padded: bool,
) -> BiffResult<Vertex3D> {
    let x = cursor.read_f32("Vertex3D.x")?;
    let y = cursor.read_f32("Vertex3D.y")?;
    let z = cursor.read_f32("Vertex3D.z")?;
    if padded {
        cursor.read_bytes(SCALAR_LEN, "Vertex3D padding")?;
    }
    Ok(Vertex3D { x, y, z })
}

////////////////////////////////////////////////////////////////////////////////
// Кодирование
////////////////////////////////////////////////////////////////////////////////

fn push_u32(
    buf: &mut Vec<u8>,
    v: u32,
) {
    let mut raw = [0u8; SCALAR_LEN];
    LittleEndian::write_u32(&mut raw, v);
    buf.extend_from_slice(&raw);
}

fn push_f32(
    buf: &mut Vec<u8>,
    v: f32,
) {
    let mut raw = [0u8; SCALAR_LEN];
    LittleEndian::write_f32(&mut raw, v);
    buf.extend_from_slice(&raw);
}

pub fn encode_int(
    v: i32,
    buf: &mut Vec<u8>,
) {
    let mut raw = [0u8; SCALAR_LEN];
    LittleEndian::write_i32(&mut raw, v);
    buf.extend_from_slice(&raw);
}

pub fn encode_float(
    v: f32,
    buf: &mut Vec<u8>,
) {
    push_f32(buf, v);
}

pub fn encode_bool(
    v: bool,
    buf: &mut Vec<u8>,
) {
    push_u32(buf, u32::from(v));
}

/// Символы вне Latin-1 записываются как `?`.
pub fn encode_string_narrow(
    s: &str,
    buf: &mut Vec<u8>,
) {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(NARROW_REPLACEMENT))
        .collect();
    push_u32(buf, bytes.len() as u32);
    buf.extend_from_slice(&bytes);
}

pub fn encode_string_wide(
    s: &str,
    buf: &mut Vec<u8>,
) {
    let units: Vec<u16> = s.encode_utf16().collect();
    push_u32(buf, (units.len() * 2) as u32);
    let start = buf.len();
    buf.resize(start + units.len() * 2, 0);
    LittleEndian::write_u16_into(&units, &mut buf[start..]);
}

pub fn encode_vertex2d(
    v: Vertex2D,
    buf: &mut Vec<u8>,
) {
    push_f32(buf, v.x);
    push_f32(buf, v.y);
}

pub fn encode_vertex3d(
    v: Vertex3D,
    padded: bool,
    buf: &mut Vec<u8>,
) {
    push_f32(buf, v.x);
    push_f32(buf, v.y);
    push_f32(buf, v.z);
    if padded {
        push_f32(buf, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn encoded<F: FnOnce(&mut Vec<u8>)>(f: F) -> Vec<u8> {
        let mut buf = Vec::new();
        f(&mut buf);
        buf
    }

    /// Тест проверяет, что Bool декодирует любое ненулевое значение как true,
    /// а пишет только канонические 0/1.
    #[rstest]
    #[case([0, 0, 0, 0], false)]
    #[case([1, 0, 0, 0], true)]
    #[case([0, 0, 0, 0x80], true)]
    #[case([0xFF, 0xFF, 0xFF, 0xFF], true)]
    fn test_bool_nonzero_is_true(
        #[case] raw: [u8; 4],
        #[case] expected: bool,
    ) {
        let mut cursor = ByteCursor::new(&raw);
        assert_eq!(decode_bool(&mut cursor).unwrap(), expected);

        let canonical = encoded(|b| encode_bool(expected, b));
        assert_eq!(canonical, vec![u8::from(expected), 0, 0, 0]);
    }

    /// Тест проверяет, что float читается бит в бит, включая NaN.
    #[test]
    fn test_float_bit_exact() {
        let raw = 0x7FC0_1234u32.to_le_bytes();
        let mut cursor = ByteCursor::new(&raw);
        let f = decode_float(&mut cursor).unwrap();
        assert!(f.is_nan());
        assert_eq!(f.to_bits(), 0x7FC0_1234);
        assert_eq!(encoded(|b| encode_float(f, b)), raw.to_vec());
    }

    /// Тест проверяет, что выровненный Vertex3D занимает ровно 16 байт, а
    /// выравнивание отбрасывается при чтении.
    #[test]
    fn test_padded_vertex_is_16_bytes() {
        let v = Vertex3D::new(1.5, -2.0, 32.0);
        let bytes = encoded(|b| encode_vertex3d(v, true, b));
        assert_eq!(bytes.len(), PADDED_VERTEX3D_LEN);

        let mut with_garbage_pad = bytes.clone();
        with_garbage_pad[12..].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let mut cursor = ByteCursor::new(&with_garbage_pad);
        assert_eq!(decode_vertex3d(&mut cursor, true).unwrap(), v);
        assert!(cursor.eof());

        assert_eq!(encoded(|b| encode_vertex3d(v, false, b)).len(), 12);
    }

    /// Тест проверяет формат широкой строки: длина в байтах + UTF-16LE.
    #[test]
    fn test_wide_string_layout() {
        let bytes = encoded(|b| encode_string_wide("T1", b));
        assert_eq!(bytes, vec![4, 0, 0, 0, b'T', 0, b'1', 0]);

        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(decode_string_wide(&mut cursor).unwrap(), "T1");
    }

    /// Тест проверяет, что нечётная длина широкой строки: ошибка
    /// декодирования, а не усечение.
    #[test]
    fn test_wide_string_odd_length() {
        let bytes = [3, 0, 0, 0, b'a', 0, b'b'];
        let mut cursor = ByteCursor::new(&bytes);
        let err = decode_string_wide(&mut cursor).unwrap_err();
        assert!(matches!(err, BiffError::InvalidWideString { offset: 0, .. }));
    }

    /// Тест проверяет, что непарный суррогат отклоняется.
    #[test]
    fn test_wide_string_unpaired_surrogate() {
        let bytes = [2, 0, 0, 0, 0x00, 0xD8];
        let mut cursor = ByteCursor::new(&bytes);
        assert!(matches!(
            decode_string_wide(&mut cursor),
            Err(BiffError::InvalidWideString { offset: 4, .. })
        ));
    }

    /// Тест проверяет Latin-1 отображение узких строк и замену символов вне
    /// диапазона.
    #[test]
    fn test_narrow_string_latin1() {
        let bytes = encoded(|b| encode_string_narrow("Café→", b));
        assert_eq!(bytes, vec![5, 0, 0, 0, b'C', b'a', b'f', 0xE9, b'?']);

        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(decode_string_narrow(&mut cursor).unwrap(), "Café?");
    }

    /// Тест проверяет, что префикс длины больше оставшихся данных даёт
    /// TruncatedData.
    #[test]
    fn test_string_prefix_past_end_is_truncated() {
        let bytes = [10, 0, 0, 0, b'a', b'b'];
        let mut cursor = ByteCursor::new(&bytes);
        let err = decode_string_narrow(&mut cursor).unwrap_err();
        assert!(err.is_truncated());
        assert_eq!(err.offset(), Some(4));
    }

    /// Тест проверяет, что каждый скалярный тип требует 4 байта.
    #[rstest]
    #[case::int(0)]
    #[case::float(1)]
    #[case::bool(2)]
    fn test_scalar_needs_four_bytes(#[case] which: u8) {
        let raw = [1u8, 2, 3];
        let mut cursor = ByteCursor::new(&raw);
        let result = match which {
            0 => decode_int(&mut cursor).map(|_| ()),
            1 => decode_float(&mut cursor).map(|_| ()),
            _ => decode_bool(&mut cursor).map(|_| ()),
        };
        assert!(result.unwrap_err().is_truncated());
    }
}
