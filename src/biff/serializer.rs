//! Сериализатор сущностей: схема поверх кодека записей.
//!
//! Загрузка принимает записи в любом порядке и любом подмножестве,
//! неизвестные теги пропускаются. Запись выпускает поля строго по
//! возрастанию `pos` и завершает группу маркером `ENDB`.

use std::io::Write;

use biffkit_error::{BiffResult, SchemaError};
use tracing::{debug, trace};

use super::{
    read_record, write_end_marker, write_record, ByteCursor, EntitySchema, HashAccumulator,
};

/// Сущность, описанная статической схемой.
///
/// Реализация обычно держит схему в `static Lazy`, так что она строится один
/// раз на процесс при первом обращении из любого потока.
pub trait BiffEntity: Default + Sized + 'static {
    /// Имя типа для диагностики.
    const NAME: &'static str;

    /// Кэшированная схема типа.
    fn schema() -> Result<&'static EntitySchema<Self>, SchemaError>;

    /// Загружает сущность по её схеме.
    fn load(cursor: &mut ByteCursor<'_>) -> BiffResult<Self> {
        load_entity(Self::schema()?, cursor)
    }

    /// Пишет записи сущности и маркер конца (без дискриминатора типа).
    fn write_records<W: Write>(
        &self,
        sink: &mut W,
        hash: Option<&mut (dyn HashAccumulator + '_)>,
    ) -> BiffResult<usize> {
        write_entity(self, Self::schema()?, sink, hash)
    }
}

/// Статистика загрузки одной сущности.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Записи, прочитанные до маркера конца (без него).
    pub records_read: usize,
    /// Записи, совпавшие с полями схемы.
    pub fields_decoded: usize,
    /// Записи с тегами вне схемы.
    pub unknown_tags: usize,
    /// Записи, payload которых длиннее, чем нужно их типу.
    pub oversized_payloads: usize,
    /// Группа закрыта маркером конца, а не концом потока.
    pub end_marker_seen: bool,
    /// Сколько байт курсора потреблено.
    pub bytes_consumed: usize,
}

/// Загружает сущность из группы записей.
///
/// Начинает с `E::default()`. При ошибке частично заполненная сущность
/// отбрасывается.
pub fn load_entity<E: Default>(
    schema: &EntitySchema<E>,
    cursor: &mut ByteCursor<'_>,
) -> BiffResult<E> {
    load_entity_detailed(schema, cursor).map(|(entity, _)| entity)
}

/// То же, что [`load_entity`], но дополнительно возвращает статистику.
pub fn load_entity_detailed<E: Default>(
    schema: &EntitySchema<E>,
    cursor: &mut ByteCursor<'_>,
) -> BiffResult<(E, LoadStats)> {
    let mut entity = E::default();
    let stats = load_fields(&mut entity, schema, cursor)
        .map_err(|e| e.with_item_type(schema.name()))?;

    debug!(
        item = schema.name(),
        records = stats.records_read,
        unknown = stats.unknown_tags,
        end_marker = stats.end_marker_seen,
        "loaded entity"
    );
    Ok((entity, stats))
}

fn load_fields<E>(
    entity: &mut E,
    schema: &EntitySchema<E>,
    cursor: &mut ByteCursor<'_>,
) -> BiffResult<LoadStats> {
    let start = cursor.local_position();
    let mut stats = LoadStats::default();

    while !cursor.eof() {
        let record = read_record(cursor)?;
        if record.is_end() {
            stats.end_marker_seen = true;
            break;
        }
        stats.records_read += 1;

        let Some(field) = schema.field(record.tag) else {
            stats.unknown_tags += 1;
            trace!(
                tag = %record.tag,
                offset = record.offset,
                len = record.payload.len(),
                "skipping unknown tag"
            );
            continue;
        };

        let mut payload = ByteCursor::with_base_offset(record.payload, record.payload_offset());
        let consumed = field
            .decode_into(entity, &mut payload)
            .map_err(|e| e.with_tag(record.tag.to_string()))?;
        stats.fields_decoded += 1;

        if consumed < record.payload.len() {
            stats.oversized_payloads += 1;
            trace!(
                tag = %record.tag,
                extra = record.payload.len() - consumed,
                "ignoring trailing payload bytes"
            );
        }
    }

    stats.bytes_consumed = cursor.local_position() - start;
    Ok(stats)
}

/// Пишет сущность: по записи на поле в порядке `pos`, затем маркер конца.
///
/// Каждый выпущенный байт передаётся в `hash` в порядке записи. Возвращает
/// общее кол-во байт.
pub fn write_entity<E, W: Write>(
    entity: &E,
    schema: &EntitySchema<E>,
    sink: &mut W,
    mut hash: Option<&mut (dyn HashAccumulator + '_)>,
) -> BiffResult<usize> {
    let mut total = 0usize;
    let mut payload = Vec::with_capacity(64);

    for field in schema.fields() {
        payload.clear();
        field.encode_from(entity, &mut payload);
        total += write_record(sink, field.tag(), &payload, hash.as_deref_mut())?;
    }
    total += write_end_marker(sink, hash.as_deref_mut())?;

    debug!(
        item = schema.name(),
        fields = schema.len(),
        bytes = total,
        "wrote entity"
    );
    Ok(total)
}
