use std::io::Write;

use biffkit_error::{BiffkitResult, ResultExt};
use tracing::{debug, info};

use crate::{
    biff::{AnyHasher, Digest, HashAccumulator, HashAlgorithm},
    items::GameItem,
};

/// Писатель секции: объекты подряд, с накоплением контрольной суммы.
///
/// Дискриминаторы пишутся в sink, но в контрольную сумму не входят.
pub struct TableWriter<W: Write> {
    sink: W,
    hasher: AnyHasher,
    bytes_written: usize,
    items_written: usize,
}

impl<W: Write> TableWriter<W> {
    pub fn new(
        sink: W,
        algorithm: HashAlgorithm,
    ) -> Self {
        Self {
            sink,
            hasher: AnyHasher::new(algorithm),
            bytes_written: 0,
            items_written: 0,
        }
    }

    /// Пишет один объект: дискриминатор, записи в порядке схемы, маркер
    /// конца.
    pub fn write_item(
        &mut self,
        item: &GameItem,
    ) -> BiffkitResult<usize> {
        let n = item
            .write(&mut self.sink, Some(&mut self.hasher))
            .with_context(|| format!("failed to write {} '{}'", item.item_type(), item.name()))?;
        self.bytes_written += n;
        self.items_written += 1;
        debug!(item = %item.item_type(), name = item.name(), bytes = n, "item written");
        Ok(n)
    }

    /// Текущее значение контрольной суммы.
    pub fn digest(&self) -> Digest {
        self.hasher.finalize()
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Сбрасывает sink и возвращает его вместе с итоговой суммой.
    pub fn finish(mut self) -> BiffkitResult<(W, Digest)> {
        self.sink.flush().context("failed to flush table sink")?;
        let digest = self.hasher.finalize();
        info!(
            items = self.items_written,
            bytes = self.bytes_written,
            digest = %digest,
            "table section written"
        );
        Ok((self.sink, digest))
    }
}

/// Пишет все объекты в sink и возвращает кол-во байт и контрольную сумму.
pub fn write_table<W: Write>(
    items: &[GameItem],
    sink: W,
    algorithm: HashAlgorithm,
) -> BiffkitResult<(usize, Digest)> {
    let mut writer = TableWriter::new(sink, algorithm);
    for item in items {
        writer.write_item(item)?;
    }
    let bytes = writer.bytes_written();
    let (_, digest) = writer.finish()?;
    Ok((bytes, digest))
}
