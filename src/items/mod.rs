//! Объекты стола, хранимые в BIFF.
//!
//! Каждый тип: обычная структура с `Default`, значения которого совпадают
//! со значениями редактора для отсутствующих тегов, и статической схемой.
//! [`GameItem`] объединяет реализованные типы для диспетчеризации по
//! дискриминатору группы.

mod editor;
mod hit_target;
mod kicker;
mod timer;

use std::io::Write;

use biffkit_error::{BiffError, BiffResult, SchemaError};
use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

pub use editor::{with_editor_fields, EditorState, HasEditorState};
pub use hit_target::{HitTargetData, TargetType};
pub use kicker::{KickerData, KickerType};
pub use timer::TimerData;

use crate::biff::{BiffEntity, ByteCursor, FieldInfo, HashAccumulator};

/// Размер дискриминатора типа на проводе.
pub const DISCRIMINATOR_LEN: usize = 4;

/// Дискриминатор типа объекта (`i32` LE перед группой записей).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
)]
#[repr(i32)]
#[strum(ascii_case_insensitive)]
pub enum ItemType {
    Surface = 0,
    Flipper = 1,
    Timer = 2,
    Plunger = 3,
    Textbox = 4,
    Bumper = 5,
    Trigger = 6,
    Light = 7,
    Kicker = 8,
    Decal = 9,
    Gate = 10,
    Spinner = 11,
    Ramp = 12,
    Table = 13,
    LightCenter = 14,
    DragPoint = 15,
    Collection = 16,
    DispReel = 17,
    LightSeq = 18,
    Primitive = 19,
    Flasher = 20,
    Rubber = 21,
    HitTarget = 22,
}

/// Объект стола одного из реализованных типов.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum GameItem {
    HitTarget(HitTargetData),
    Kicker(KickerData),
    Timer(TimerData),
}

impl TryFrom<i32> for ItemType {
    /// Исходное значение, не совпавшее ни с одним типом.
    type Error = i32;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Self::iter().find(|t| t.discriminator() == raw).ok_or(raw)
    }
}

impl ItemType {
    /// Сырое значение дискриминатора.
    pub fn discriminator(self) -> i32 {
        self as i32
    }

    /// Есть ли в этой сборке схема для типа.
    pub fn is_supported(self) -> bool {
        matches!(self, Self::HitTarget | Self::Kicker | Self::Timer)
    }

    /// Таблица полей типа в порядке записи; `None` для нереализованных
    /// типов.
    pub fn field_table(self) -> Result<Option<Vec<FieldInfo>>, SchemaError> {
        let infos = match self {
            Self::HitTarget => HitTargetData::schema()?.infos(),
            Self::Kicker => KickerData::schema()?.infos(),
            Self::Timer => TimerData::schema()?.infos(),
            _ => return Ok(None),
        };
        Ok(Some(infos))
    }
}

impl GameItem {
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::HitTarget(_) => ItemType::HitTarget,
            Self::Kicker(_) => ItemType::Kicker,
            Self::Timer(_) => ItemType::Timer,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::HitTarget(d) => d.name(),
            Self::Kicker(d) => d.name(),
            Self::Timer(d) => d.name(),
        }
    }

    pub fn editor(&self) -> &EditorState {
        match self {
            Self::HitTarget(d) => d.editor(),
            Self::Kicker(d) => d.editor(),
            Self::Timer(d) => d.editor(),
        }
    }

    /// Загружает группу записей для типа `item_type`.
    ///
    /// `Ok(None)`: тип известен, но в этой сборке не реализован; группу
    /// нужно пропустить.
    pub fn load(
        item_type: ItemType,
        cursor: &mut ByteCursor<'_>,
    ) -> BiffResult<Option<Self>> {
        let item = match item_type {
            ItemType::HitTarget => Self::HitTarget(HitTargetData::load(cursor)?),
            ItemType::Kicker => Self::Kicker(KickerData::load(cursor)?),
            ItemType::Timer => Self::Timer(TimerData::load(cursor)?),
            _ => return Ok(None),
        };
        Ok(Some(item))
    }

    /// Загружает объект из отдельной секции хранилища: дискриминатор, затем
    /// записи до маркера конца. Байты после маркера игнорируются.
    ///
    /// `Ok(None)`: дискриминатор не принадлежит реализованному типу.
    pub fn from_storage(bytes: &[u8]) -> BiffResult<Option<Self>> {
        let mut cursor = ByteCursor::new(bytes);
        let raw = cursor.read_i32("type discriminator")?;
        match ItemType::try_from(raw) {
            Ok(item_type) => Self::load(item_type, &mut cursor),
            Err(_) => Ok(None),
        }
    }

    /// Пишет дискриминатор и записи объекта.
    ///
    /// Дискриминатор в `hash` не попадает, записи попадают целиком.
    pub fn write<W: Write>(
        &self,
        sink: &mut W,
        hash: Option<&mut (dyn HashAccumulator + '_)>,
    ) -> BiffResult<usize> {
        let mut raw = [0u8; DISCRIMINATOR_LEN];
        LittleEndian::write_i32(&mut raw, self.item_type().discriminator());
        sink.write_all(&raw)
            .map_err(|e| BiffError::io("writing type discriminator", &e))?;

        let records = match self {
            Self::HitTarget(d) => d.write_records(sink, hash),
            Self::Kicker(d) => d.write_records(sink, hash),
            Self::Timer(d) => d.write_records(sink, hash),
        }
        .map_err(|e| e.with_item_type(self.item_type().to_string()))?;

        Ok(DISCRIMINATOR_LEN + records)
    }

    /// Объект целиком (дискриминатор и записи) отдельным буфером.
    pub fn to_storage(&self) -> BiffResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out, None)?;
        Ok(out)
    }
}

impl From<HitTargetData> for GameItem {
    fn from(d: HitTargetData) -> Self {
        Self::HitTarget(d)
    }
}

impl From<KickerData> for GameItem {
    fn from(d: KickerData) -> Self {
        Self::Kicker(d)
    }
}

impl From<TimerData> for GameItem {
    fn from(d: TimerData) -> Self {
        Self::Timer(d)
    }
}
