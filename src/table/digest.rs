//! Контрольная сумма уже записанной секции.
//!
//! Сумма считается по байтам записей (тег, длина, payload, маркеры конца)
//! всех групп в порядке потока, без дискриминаторов. Результат совпадает с
//! суммой, которую [`super::write_table`] вернул при записи тех же объектов.

use biffkit_error::{ensure, BiffError, BiffkitResult, ResultExt};
use tracing::debug;

use crate::biff::{read_record, AnyHasher, ByteCursor, Digest, HashAccumulator, HashAlgorithm};

/// Вычисляет контрольную сумму секции.
///
/// Декодирование полей не выполняется: нужна только корректная разметка.
pub fn compute_digest(
    bytes: &[u8],
    algorithm: HashAlgorithm,
) -> BiffkitResult<Digest> {
    let mut cursor = ByteCursor::new(bytes);
    let mut hasher = AnyHasher::new(algorithm);
    let mut groups = 0u64;

    while !cursor.eof() {
        let offset = cursor.position();
        cursor
            .read_i32("type discriminator")
            .with_context(|| format!("digest: group at offset 0x{offset:X}"))?;
        groups += 1;

        while !cursor.eof() {
            let start = cursor.local_position();
            let record = read_record(&mut cursor)
                .with_context(|| format!("digest: group at offset 0x{offset:X}"))?;
            hasher.update(&bytes[start..cursor.local_position()]);
            if record.is_end() {
                break;
            }
        }
    }

    let digest = hasher.finalize();
    debug!(groups, bytes = hasher.bytes_hashed(), digest = %digest, "digest computed");
    Ok(digest)
}

/// Сверяет контрольную сумму секции с ожидаемой.
///
/// При расхождении возвращает `BiffError::HashMismatch`.
pub fn verify_digest(
    bytes: &[u8],
    expected: &Digest,
) -> BiffkitResult<Digest> {
    let computed = compute_digest(bytes, expected.algorithm)?;
    ensure!(
        computed == *expected,
        BiffError::HashMismatch {
            algorithm: expected.algorithm.to_string(),
            expected: expected.to_hex(),
            computed: computed.to_hex(),
        }
    );
    Ok(computed)
}
