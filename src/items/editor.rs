use serde::Serialize;

use crate::biff::SchemaBuilder;

/// Состояние объекта в редакторе: блокировка и слой.
///
/// Есть у каждого объекта стола и пишется в конце группы (позиции 1000+),
/// после собственных полей объекта.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorState {
    pub is_locked: bool,
    pub layer_index: i32,
    /// Узкая строка (Latin-1): символы вне Latin-1 пишутся как `?` и не
    /// восстанавливаются при чтении.
    pub layer_name: String,
    pub is_visible: bool,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            is_locked: false,
            layer_index: 0,
            layer_name: String::new(),
            is_visible: true,
        }
    }
}

/// Объект, у которого есть [`EditorState`].
pub trait HasEditorState {
    fn editor(&self) -> &EditorState;
    fn editor_mut(&mut self) -> &mut EditorState;
}

/// Добавляет в схему поля `LOCK`, `LAYR`, `LANR`, `LVIS`.
pub fn with_editor_fields<E: HasEditorState>(builder: SchemaBuilder<E>) -> SchemaBuilder<E> {
    builder
        .bool(
            "LOCK",
            1000,
            |e| e.editor().is_locked,
            |e, v| e.editor_mut().is_locked = v,
        )
        .int(
            "LAYR",
            1001,
            |e| e.editor().layer_index,
            |e, v| e.editor_mut().layer_index = v,
        )
        .string(
            "LANR",
            1002,
            |e| e.editor().layer_name.as_str(),
            |e, v| e.editor_mut().layer_name = v,
        )
        .bool(
            "LVIS",
            1003,
            |e| e.editor().is_visible,
            |e, v| e.editor_mut().is_visible = v,
        )
}
