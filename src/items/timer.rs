use biffkit_error::SchemaError;
use once_cell::sync::Lazy;
use serde::Serialize;

use super::{with_editor_fields, EditorState, HasEditorState};
use crate::{
    biff::{BiffEntity, EntitySchema, SchemaBuilder},
    math::Vertex2D,
};

/// Таймер стола: невидимый объект, периодически генерирующий событие.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerData {
    pub name: String,
    pub center: Vertex2D,
    pub is_timer_enabled: bool,
    pub timer_interval: i32,
    /// Размещён на бэкгласе, а не на игровом поле.
    pub backglass: bool,
    pub editor: EditorState,
}

impl Default for TimerData {
    fn default() -> Self {
        Self {
            name: String::new(),
            center: Vertex2D::default(),
            is_timer_enabled: true,
            timer_interval: 100,
            backglass: false,
            editor: EditorState::default(),
        }
    }
}

static SCHEMA: Lazy<Result<EntitySchema<TimerData>, SchemaError>> = Lazy::new(|| {
    let builder = SchemaBuilder::<TimerData>::new("Timer")
        .vertex2d("VCEN", 1, |d| d.center, |d, v| d.center = v)
        .bool("TMON", 2, |d| d.is_timer_enabled, |d, v| d.is_timer_enabled = v)
        .int("TMIN", 3, |d| d.timer_interval, |d, v| d.timer_interval = v)
        .wide_string("NAME", 4, |d| d.name.as_str(), |d, v| d.name = v)
        .bool("BGLS", 5, |d| d.backglass, |d, v| d.backglass = v);
    with_editor_fields(builder).build()
});

impl TimerData {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(
        &mut self,
        name: impl Into<String>,
    ) {
        self.name = name.into();
    }
}

impl HasEditorState for TimerData {
    fn editor(&self) -> &EditorState {
        &self.editor
    }

    fn editor_mut(&mut self) -> &mut EditorState {
        &mut self.editor
    }
}

impl BiffEntity for TimerData {
    const NAME: &'static str = "Timer";

    fn schema() -> Result<&'static EntitySchema<Self>, SchemaError> {
        SCHEMA.as_ref().map_err(Clone::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biff::{ByteCursor, Tag};

    /// Тест проверяет, что пустая группа даёт таймер со значениями по
    /// умолчанию.
    #[test]
    fn test_empty_group_is_default() {
        let bytes = b"ENDB\0\0\0\0";
        let loaded = TimerData::load(&mut ByteCursor::new(bytes)).unwrap();
        assert_eq!(loaded, TimerData::default());
        assert_eq!(loaded.timer_interval, 100);
    }

    /// Тест проверяет, что поля редактора пишутся после полей таймера.
    #[test]
    fn test_editor_fields_last() {
        let schema = TimerData::schema().unwrap();
        let tags: Vec<Tag> = schema.write_order().collect();
        assert_eq!(tags.len(), 9);
        assert_eq!(tags[4], Tag::new(*b"BGLS"));
        assert_eq!(tags[5], Tag::new(*b"LOCK"));
        assert_eq!(tags[8], Tag::new(*b"LVIS"));
    }

    #[test]
    fn test_round_trip() {
        let mut d = TimerData::default();
        d.set_name("Timer1");
        d.backglass = true;
        d.editor.layer_index = 3;

        let mut bytes = Vec::new();
        d.write_records(&mut bytes, None).unwrap();
        assert_eq!(TimerData::load(&mut ByteCursor::new(&bytes)).unwrap(), d);
    }
}
