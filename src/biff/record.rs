//! Кодек одной записи: `tag (4) | length u32 LE (4) | payload (length)`.

use std::io::Write;

use biffkit_error::{BiffError, BiffResult};
use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;

use super::{ByteCursor, HashAccumulator, Tag, END_TAG, TAG_LEN};

/// Размер заголовка записи: тег + длина.
pub const RECORD_HEADER_LEN: usize = TAG_LEN + 4;

/// Запись, прочитанная из потока. Payload ссылается на исходный буфер.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub tag: Tag,
    pub payload: &'a [u8],
    /// Абсолютное смещение начала записи (первого байта тега).
    pub offset: u64,
}

/// Границы группы записей, найденные без декодирования полей.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupFrame {
    /// Абсолютное смещение первой записи группы.
    pub start: u64,
    /// Длина группы в байтах, включая маркер конца (если он есть).
    pub len: usize,
    /// Кол-во записей без учёта маркера конца.
    pub records: usize,
    /// Была ли группа закрыта маркером конца (иначе поток кончился).
    pub end_marker_seen: bool,
}

impl Record<'_> {
    /// Абсолютное смещение первого байта payload.
    pub fn payload_offset(&self) -> u64 {
        self.offset + RECORD_HEADER_LEN as u64
    }

    /// Полный размер записи на проводе.
    pub fn wire_len(&self) -> usize {
        RECORD_HEADER_LEN + self.payload.len()
    }

    pub fn is_end(&self) -> bool {
        self.tag.is_end()
    }
}

/// Читает одну запись и сдвигает курсор за её конец.
///
/// Ошибки усечения после чтения тега несут этот тег.
pub fn read_record<'a>(cursor: &mut ByteCursor<'a>) -> BiffResult<Record<'a>> {
    let offset = cursor.position();
    let raw_tag = cursor.read_bytes(TAG_LEN, "record tag")?;
    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(raw_tag);
    let tag = Tag::from(tag_bytes);

    let len = cursor
        .read_u32("record length")
        .map_err(|e| e.with_tag(tag.to_string()))? as usize;
    let payload = cursor
        .read_bytes(len, "record payload")
        .map_err(|e| e.with_tag(tag.to_string()))?;

    Ok(Record {
        tag,
        payload,
        offset,
    })
}

/// Пишет одну запись и возвращает кол-во выпущенных байт.
///
/// Если передан накопитель, в него попадают те же байты в том же порядке:
/// сначала заголовок, затем payload.
pub fn write_record<W: Write>(
    sink: &mut W,
    tag: Tag,
    payload: &[u8],
    hash: Option<&mut (dyn HashAccumulator + '_)>,
) -> BiffResult<usize> {
    let mut header = [0u8; RECORD_HEADER_LEN];
    header[..TAG_LEN].copy_from_slice(tag.as_bytes());
    LittleEndian::write_u32(&mut header[TAG_LEN..], payload.len() as u32);

    sink.write_all(&header)
        .map_err(|e| BiffError::io(format!("writing {tag} header"), &e))?;
    sink.write_all(payload)
        .map_err(|e| BiffError::io(format!("writing {tag} payload"), &e))?;

    if let Some(h) = hash {
        h.update(&header);
        h.update(payload);
    }

    Ok(RECORD_HEADER_LEN + payload.len())
}

/// Пишет маркер конца группы (тег `ENDB`, длина 0).
pub fn write_end_marker<W: Write>(
    sink: &mut W,
    hash: Option<&mut (dyn HashAccumulator + '_)>,
) -> BiffResult<usize> {
    write_record(sink, END_TAG, &[], hash)
}

/// Проходит записи группы до маркера конца включительно (или до конца
/// потока), не декодируя payload.
///
/// Ошибка означает, что границы группы определить нельзя: поток оборвался
/// внутри записи.
pub fn skip_group(cursor: &mut ByteCursor<'_>) -> BiffResult<GroupFrame> {
    let start_local = cursor.local_position();
    let start = cursor.position();
    let mut records = 0usize;
    let mut end_marker_seen = false;

    while !cursor.eof() {
        let record = read_record(cursor)?;
        if record.is_end() {
            end_marker_seen = true;
            break;
        }
        records += 1;
    }

    let len = cursor.local_position() - start_local;
    trace!(start, len, records, end_marker_seen, "framed record group");

    Ok(GroupFrame {
        start,
        len,
        records,
        end_marker_seen,
    })
}
