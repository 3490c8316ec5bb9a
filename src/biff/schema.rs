//! Схема полей сущности.
//!
//! Схема: статическое описание формата одного типа сущности: для каждого
//! поля тег, тип на проводе, позиция в порядке записи, опции кодирования и
//! пара функций доступа к полю структуры. Схема строится один раз через
//! [`SchemaBuilder`], проверяется целиком и дальше только читается. И
//! загрузка, и запись работают исключительно через неё.

use std::{fmt, str::FromStr};

use biffkit_error::{BiffResult, SchemaError};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Serialize, Serializer};

use super::{primitives::*, ByteCursor, Tag};
use crate::math::{Vertex2D, Vertex3D};

/// Тип значения на проводе.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireKind {
    Int,
    Float,
    Bool,
    StringNarrow,
    StringWide,
    Vertex2D,
    Vertex3D,
    /// Обычный float на проводе; разрядность описывает только логическую
    /// точность значения.
    QuantizedFloat(u8),
}

/// Модификаторы кодирования поля.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldOptions {
    /// Vertex3D дополняется четвёртым float до 16 байт.
    pub padded: bool,
}

/// Описание поля без функций доступа.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    pub tag: Tag,
    pub kind: WireKind,
    pub pos: u32,
    pub options: FieldOptions,
}

/// Функции чтения и записи поля структуры `E`.
pub enum Accessor<E> {
    Int {
        get: fn(&E) -> i32,
        set: fn(&mut E, i32),
    },
    Float {
        get: fn(&E) -> f32,
        set: fn(&mut E, f32),
    },
    Bool {
        get: fn(&E) -> bool,
        set: fn(&mut E, bool),
    },
    Str {
        get: fn(&E) -> &str,
        set: fn(&mut E, String),
    },
    Vertex2D {
        get: fn(&E) -> Vertex2D,
        set: fn(&mut E, Vertex2D),
    },
    Vertex3D {
        get: fn(&E) -> Vertex3D,
        set: fn(&mut E, Vertex3D),
    },
}

/// Поле схемы: описание плюс функции доступа.
pub struct FieldDescriptor<E> {
    pub info: FieldInfo,
    pub accessor: Accessor<E>,
}

/// Проверенная неизменяемая схема одного типа сущности.
pub struct EntitySchema<E> {
    name: &'static str,
    /// Поля в порядке возрастания `pos`.
    fields: Vec<FieldDescriptor<E>>,
    by_tag: FxHashMap<Tag, usize>,
}

/// Построитель схемы. Все проверки откладываются до [`SchemaBuilder::build`].
pub struct SchemaBuilder<E> {
    name: &'static str,
    fields: Vec<PendingField<E>>,
}

struct PendingField<E> {
    tag: &'static str,
    kind: WireKind,
    pos: u32,
    options: FieldOptions,
    accessor: Accessor<E>,
}

impl WireKind {
    /// Декодирует значение этого типа без привязки к сущности.
    pub fn decode_value(
        &self,
        options: FieldOptions,
        cursor: &mut ByteCursor<'_>,
    ) -> BiffResult<WireValue> {
        Ok(match self {
            Self::Int => WireValue::Int(decode_int(cursor)?),
            Self::Float | Self::QuantizedFloat(_) => WireValue::Float(decode_float(cursor)?),
            Self::Bool => WireValue::Bool(decode_bool(cursor)?),
            Self::StringNarrow => WireValue::String(decode_string_narrow(cursor)?),
            Self::StringWide => WireValue::String(decode_string_wide(cursor)?),
            Self::Vertex2D => WireValue::Vertex2D(decode_vertex2d(cursor)?),
            Self::Vertex3D => WireValue::Vertex3D(decode_vertex3d(cursor, options.padded)?),
        })
    }

    /// Совместим ли тип с функциями доступа.
    fn accepts<E>(
        &self,
        accessor: &Accessor<E>,
    ) -> bool {
        matches!(
            (self, accessor),
            (Self::Int, Accessor::Int { .. })
                | (Self::Float | Self::QuantizedFloat(_), Accessor::Float { .. })
                | (Self::Bool, Accessor::Bool { .. })
                | (Self::StringNarrow | Self::StringWide, Accessor::Str { .. })
                | (Self::Vertex2D, Accessor::Vertex2D { .. })
                | (Self::Vertex3D, Accessor::Vertex3D { .. })
        )
    }
}

impl fmt::Display for WireKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::StringNarrow => f.write_str("string"),
            Self::StringWide => f.write_str("wstring"),
            Self::Vertex2D => f.write_str("vertex2d"),
            Self::Vertex3D => f.write_str("vertex3d"),
            Self::QuantizedFloat(bits) => write!(f, "quantized:{bits}"),
        }
    }
}

impl FromStr for WireKind {
    type Err = SchemaError;

    /// Разбирает имя типа (`int`, `wstring`, `quantized:8`, ...). Регистр не
    /// важен.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let kind = match name.as_str() {
            "int" => Self::Int,
            "float" => Self::Float,
            "bool" => Self::Bool,
            "string" => Self::StringNarrow,
            "wstring" => Self::StringWide,
            "vertex2d" => Self::Vertex2D,
            "vertex3d" => Self::Vertex3D,
            other => match other
                .strip_prefix("quantized:")
                .and_then(|bits| bits.parse::<u8>().ok())
            {
                Some(bits) => Self::QuantizedFloat(bits),
                None => {
                    return Err(SchemaError::UnknownWireKind {
                        name: s.to_string(),
                    })
                }
            },
        };
        Ok(kind)
    }
}

impl Serialize for WireKind {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<E> Accessor<E> {
    /// Имя типа значения, которое хранят функции доступа.
    pub fn value_type(&self) -> &'static str {
        match self {
            Self::Int { .. } => "i32",
            Self::Float { .. } => "f32",
            Self::Bool { .. } => "bool",
            Self::Str { .. } => "String",
            Self::Vertex2D { .. } => "Vertex2D",
            Self::Vertex3D { .. } => "Vertex3D",
        }
    }
}

// Ручные impl: derive потребовал бы `E: Clone`.
impl<E> Clone for Accessor<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Accessor<E> {}

impl<E> fmt::Debug for Accessor<E> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Accessor<{}>", self.value_type())
    }
}

impl<E> FieldDescriptor<E> {
    pub fn tag(&self) -> Tag {
        self.info.tag
    }

    /// Декодирует payload записи и присваивает значение полю сущности.
    ///
    /// Возвращает кол-во потреблённых байт payload.
    pub fn decode_into(
        &self,
        entity: &mut E,
        cursor: &mut ByteCursor<'_>,
    ) -> BiffResult<usize> {
        let start = cursor.local_position();
        match (self.info.kind, &self.accessor) {
            (WireKind::Int, Accessor::Int { set, .. }) => set(entity, decode_int(cursor)?),
            (WireKind::Float | WireKind::QuantizedFloat(_), Accessor::Float { set, .. }) => {
                set(entity, decode_float(cursor)?)
            }
            (WireKind::Bool, Accessor::Bool { set, .. }) => set(entity, decode_bool(cursor)?),
            (WireKind::StringNarrow, Accessor::Str { set, .. }) => {
                set(entity, decode_string_narrow(cursor)?)
            }
            (WireKind::StringWide, Accessor::Str { set, .. }) => {
                set(entity, decode_string_wide(cursor)?)
            }
            (WireKind::Vertex2D, Accessor::Vertex2D { set, .. }) => {
                set(entity, decode_vertex2d(cursor)?)
            }
            (WireKind::Vertex3D, Accessor::Vertex3D { set, .. }) => {
                set(entity, decode_vertex3d(cursor, self.info.options.padded)?)
            }
            // build() отклоняет такие сочетания
            _ => {}
        }
        Ok(cursor.local_position() - start)
    }

    /// Кодирует значение поля в payload записи.
    pub fn encode_from(
        &self,
        entity: &E,
        buf: &mut Vec<u8>,
    ) {
        match (self.info.kind, &self.accessor) {
            (WireKind::Int, Accessor::Int { get, .. }) => encode_int(get(entity), buf),
            (WireKind::Float | WireKind::QuantizedFloat(_), Accessor::Float { get, .. }) => {
                encode_float(get(entity), buf)
            }
            (WireKind::Bool, Accessor::Bool { get, .. }) => encode_bool(get(entity), buf),
            (WireKind::StringNarrow, Accessor::Str { get, .. }) => {
                encode_string_narrow(get(entity), buf)
            }
            (WireKind::StringWide, Accessor::Str { get, .. }) => {
                encode_string_wide(get(entity), buf)
            }
            (WireKind::Vertex2D, Accessor::Vertex2D { get, .. }) => {
                encode_vertex2d(get(entity), buf)
            }
            (WireKind::Vertex3D, Accessor::Vertex3D { get, .. }) => {
                encode_vertex3d(get(entity), self.info.options.padded, buf)
            }
            _ => {}
        }
    }
}

impl<E> fmt::Debug for FieldDescriptor<E> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("info", &self.info)
            .field("accessor", &self.accessor)
            .finish()
    }
}

impl<E> EntitySchema<E> {
    /// Имя типа сущности.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Поля в порядке записи (по возрастанию `pos`).
    pub fn fields(&self) -> &[FieldDescriptor<E>] {
        &self.fields
    }

    /// Поиск поля по тегу.
    pub fn field(
        &self,
        tag: Tag,
    ) -> Option<&FieldDescriptor<E>> {
        self.by_tag.get(&tag).map(|&i| &self.fields[i])
    }

    /// Теги в порядке записи.
    pub fn write_order(&self) -> impl Iterator<Item = Tag> + '_ {
        self.fields.iter().map(|f| f.info.tag)
    }

    /// Описания полей без функций доступа.
    pub fn infos(&self) -> Vec<FieldInfo> {
        self.fields.iter().map(|f| f.info).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<E> fmt::Debug for EntitySchema<E> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("EntitySchema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

impl<E> SchemaBuilder<E> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Добавляет поле с явно указанными типом, опциями и функциями доступа.
    pub fn field(
        mut self,
        tag: &'static str,
        kind: WireKind,
        pos: u32,
        options: FieldOptions,
        accessor: Accessor<E>,
    ) -> Self {
        self.fields.push(PendingField {
            tag,
            kind,
            pos,
            options,
            accessor,
        });
        self
    }

    pub fn int(
        self,
        tag: &'static str,
        pos: u32,
        get: fn(&E) -> i32,
        set: fn(&mut E, i32),
    ) -> Self {
        self.field(tag, WireKind::Int, pos, FieldOptions::default(), Accessor::Int { get, set })
    }

    pub fn float(
        self,
        tag: &'static str,
        pos: u32,
        get: fn(&E) -> f32,
        set: fn(&mut E, f32),
    ) -> Self {
        self.field(tag, WireKind::Float, pos, FieldOptions::default(), Accessor::Float { get, set })
    }

    pub fn quantized_float(
        self,
        tag: &'static str,
        pos: u32,
        bits: u8,
        get: fn(&E) -> f32,
        set: fn(&mut E, f32),
    ) -> Self {
        self.field(
            tag,
            WireKind::QuantizedFloat(bits),
            pos,
            FieldOptions::default(),
            Accessor::Float { get, set },
        )
    }

    pub fn bool(
        self,
        tag: &'static str,
        pos: u32,
        get: fn(&E) -> bool,
        set: fn(&mut E, bool),
    ) -> Self {
        self.field(tag, WireKind::Bool, pos, FieldOptions::default(), Accessor::Bool { get, set })
    }

    /// Узкая (Latin-1) строка.
    pub fn string(
        self,
        tag: &'static str,
        pos: u32,
        get: fn(&E) -> &str,
        set: fn(&mut E, String),
    ) -> Self {
        self.field(
            tag,
            WireKind::StringNarrow,
            pos,
            FieldOptions::default(),
            Accessor::Str { get, set },
        )
    }

    /// Широкая (UTF-16LE) строка.
    pub fn wide_string(
        self,
        tag: &'static str,
        pos: u32,
        get: fn(&E) -> &str,
        set: fn(&mut E, String),
    ) -> Self {
        self.field(
            tag,
            WireKind::StringWide,
            pos,
            FieldOptions::default(),
            Accessor::Str { get, set },
        )
    }

    pub fn vertex2d(
        self,
        tag: &'static str,
        pos: u32,
        get: fn(&E) -> Vertex2D,
        set: fn(&mut E, Vertex2D),
    ) -> Self {
        self.field(
            tag,
            WireKind::Vertex2D,
            pos,
            FieldOptions::default(),
            Accessor::Vertex2D { get, set },
        )
    }

    pub fn vertex3d(
        self,
        tag: &'static str,
        pos: u32,
        padded: bool,
        get: fn(&E) -> Vertex3D,
        set: fn(&mut E, Vertex3D),
    ) -> Self {
        self.field(
            tag,
            WireKind::Vertex3D,
            pos,
            FieldOptions { padded },
            Accessor::Vertex3D { get, set },
        )
    }

    /// Проверяет объявления и строит схему.
    ///
    /// Ошибки: пустая схема, тег не из 4 печатных ASCII-байт, тег `ENDB`,
    /// повтор тега или позиции, тип не совпадает с функциями доступа,
    /// `padded` не у Vertex3D, разрядность вне `1..=32`.
    pub fn build(self) -> Result<EntitySchema<E>, SchemaError> {
        let schema = self.name.to_string();
        if self.fields.is_empty() {
            return Err(SchemaError::EmptySchema { schema });
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        let mut by_pos: FxHashMap<u32, &'static str> = FxHashMap::default();
        let mut seen_tags: FxHashSet<Tag> = FxHashSet::default();

        for pending in self.fields {
            let tag = Tag::parse(pending.tag).ok_or_else(|| SchemaError::InvalidTag {
                schema: schema.clone(),
                tag: pending.tag.to_string(),
            })?;
            if tag.is_end() {
                return Err(SchemaError::ReservedTag {
                    schema,
                    tag: pending.tag.to_string(),
                });
            }
            if !seen_tags.insert(tag) {
                return Err(SchemaError::DuplicateTag {
                    schema,
                    tag: pending.tag.to_string(),
                });
            }
            if let Some(first) = by_pos.insert(pending.pos, pending.tag) {
                return Err(SchemaError::DuplicatePosition {
                    schema,
                    pos: pending.pos,
                    first: first.to_string(),
                    second: pending.tag.to_string(),
                });
            }
            if !pending.kind.accepts(&pending.accessor) {
                return Err(SchemaError::KindMismatch {
                    schema,
                    tag: pending.tag.to_string(),
                    kind: pending.kind.to_string(),
                    accessor: pending.accessor.value_type(),
                });
            }
            if pending.options.padded && pending.kind != WireKind::Vertex3D {
                return Err(SchemaError::InvalidOption {
                    schema,
                    tag: pending.tag.to_string(),
                    option: "padded",
                    kind: pending.kind.to_string(),
                });
            }
            if let WireKind::QuantizedFloat(bits) = pending.kind {
                if !(1..=32).contains(&bits) {
                    return Err(SchemaError::InvalidQuantization {
                        schema,
                        tag: pending.tag.to_string(),
                        bits,
                    });
                }
            }

            fields.push(FieldDescriptor {
                info: FieldInfo {
                    tag,
                    kind: pending.kind,
                    pos: pending.pos,
                    options: pending.options,
                },
                accessor: pending.accessor,
            });
        }

        fields.sort_by_key(|f| f.info.pos);
        let by_tag = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.info.tag, i))
            .collect();

        Ok(EntitySchema {
            name: self.name,
            fields,
            by_tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use once_cell::sync::Lazy;
    use rstest::rstest;

    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Probe {
        count: i32,
        ratio: f32,
        label: String,
        spot: Vertex3D,
    }

    fn probe_builder() -> SchemaBuilder<Probe> {
        SchemaBuilder::<Probe>::new("Probe")
            .float("RATI", 5, |p| p.ratio, |p, v| p.ratio = v)
            .int("CNT0", 2, |p| p.count, |p, v| p.count = v)
            .wide_string("LABL", 9, |p| p.label.as_str(), |p, v| p.label = v)
            .vertex3d("SPOT", 1, true, |p| p.spot, |p, v| p.spot = v)
    }

    /// Тест проверяет, что поля упорядочены по позиции, а не по объявлению.
    #[test]
    fn test_fields_sorted_by_pos() {
        let schema = probe_builder().build().unwrap();
        let order: Vec<String> = schema.write_order().map(|t| t.to_string()).collect();
        assert_eq!(order, vec!["SPOT", "CNT0", "RATI", "LABL"]);
        assert_eq!(schema.len(), 4);
        assert_eq!(schema.name(), "Probe");

        let ratio = schema.field(Tag::new(*b"RATI")).unwrap();
        assert_eq!(ratio.info.kind, WireKind::Float);
        assert_eq!(ratio.info.pos, 5);
        assert!(schema.field(Tag::new(*b"rati")).is_none());
    }

    /// Тест проверяет ошибки валидации при построении схемы.
    #[rstest]
    #[case::invalid_tag(
        probe_builder().int("TOO_LONG", 20, |p| p.count, |p, v| p.count = v),
        "InvalidTag"
    )]
    #[case::reserved(
        probe_builder().int("ENDB", 20, |p| p.count, |p, v| p.count = v),
        "ReservedTag"
    )]
    #[case::duplicate_tag(
        probe_builder().int("CNT0", 20, |p| p.count, |p, v| p.count = v),
        "DuplicateTag"
    )]
    #[case::duplicate_pos(
        probe_builder().int("CNT1", 5, |p| p.count, |p, v| p.count = v),
        "DuplicatePosition"
    )]
    #[case::kind_mismatch(
        probe_builder().field(
            "MISM",
            WireKind::Bool,
            20,
            FieldOptions::default(),
            Accessor::Int { get: |p: &Probe| p.count, set: |p: &mut Probe, v| p.count = v },
        ),
        "KindMismatch"
    )]
    #[case::padded_on_float(
        probe_builder().field(
            "PADF",
            WireKind::Float,
            20,
            FieldOptions { padded: true },
            Accessor::Float { get: |p: &Probe| p.ratio, set: |p: &mut Probe, v| p.ratio = v },
        ),
        "InvalidOption"
    )]
    #[case::quantization_zero(
        probe_builder().quantized_float("QNT0", 20, 0, |p| p.ratio, |p, v| p.ratio = v),
        "InvalidQuantization"
    )]
    #[case::quantization_wide(
        probe_builder().quantized_float("QNT0", 20, 33, |p| p.ratio, |p, v| p.ratio = v),
        "InvalidQuantization"
    )]
    #[case::empty(SchemaBuilder::new("Probe"), "EmptySchema")]
    fn test_build_rejects(
        #[case] builder: SchemaBuilder<Probe>,
        #[case] expected: &str,
    ) {
        let err = builder.build().unwrap_err();
        let debug = format!("{err:?}");
        assert!(debug.starts_with(expected), "{debug}");
    }

    /// Тест проверяет, что QuantizedFloat на проводе: обычный float.
    #[test]
    fn test_quantized_is_plain_float() {
        let schema = SchemaBuilder::<Probe>::new("Probe")
            .quantized_float("DILI", 1, 8, |p| p.ratio, |p, v| p.ratio = v)
            .build()
            .unwrap();
        let field = &schema.fields()[0];

        let mut probe = Probe {
            ratio: 0.123_456_7,
            ..Default::default()
        };
        let mut buf = Vec::new();
        field.encode_from(&probe, &mut buf);
        assert_eq!(buf, 0.123_456_7f32.to_le_bytes().to_vec());

        probe.ratio = 0.0;
        let mut cursor = ByteCursor::new(&buf);
        assert_eq!(field.decode_into(&mut probe, &mut cursor).unwrap(), 4);
        assert_eq!(probe.ratio, 0.123_456_7);
    }

    /// Тест проверяет разбор имён типов и UnknownWireKind.
    #[rstest]
    #[case("int", WireKind::Int)]
    #[case("Float", WireKind::Float)]
    #[case("wstring", WireKind::StringWide)]
    #[case("vertex3d", WireKind::Vertex3D)]
    #[case("quantized:8", WireKind::QuantizedFloat(8))]
    fn test_wire_kind_from_str(
        #[case] name: &str,
        #[case] expected: WireKind,
    ) {
        assert_eq!(name.parse::<WireKind>().unwrap(), expected);
        assert_eq!(expected.to_string().parse::<WireKind>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_wire_kind() {
        let err = "matrix4".parse::<WireKind>().unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownWireKind {
                name: "matrix4".to_string()
            }
        );
        assert!("quantized:x".parse::<WireKind>().is_err());
    }

    static PROBE_SCHEMA: Lazy<Result<EntitySchema<Probe>, SchemaError>> =
        Lazy::new(|| probe_builder().build());

    /// Тест проверяет, что конкурентное первое обращение к кэшу схемы даёт
    /// один и тот же экземпляр во всех потоках.
    #[test]
    fn test_concurrent_first_build_converges() {
        let barrier = Arc::new(std::sync::Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let schema = PROBE_SCHEMA.as_ref().unwrap();
                    schema as *const EntitySchema<Probe> as usize
                })
            })
            .collect();

        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }
}
