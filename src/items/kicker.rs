//! Кикер: лунка, захватывающая и выбрасывающая шар.

use biffkit_error::SchemaError;
use num_enum::TryFromPrimitive;
use once_cell::sync::Lazy;
use serde::Serialize;
use strum_macros::Display;

use super::{with_editor_fields, EditorState, HasEditorState};
use crate::{
    biff::{BiffEntity, EntitySchema, SchemaBuilder},
    math::Vertex2D,
};

/// Внешний вид кикера (поле `TYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, Display, Serialize)]
#[repr(i32)]
pub enum KickerType {
    Invisible = 0,
    Hole = 1,
    Cup = 2,
    HoleSimple = 3,
    Williams = 4,
    Gottlieb = 5,
    Cup2 = 6,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KickerData {
    pub name: String,
    pub center: Vertex2D,
    pub radius: f32,
    pub is_timer_enabled: bool,
    pub timer_interval: i32,
    /// Узкая строка (Latin-1): символы вне Latin-1 пишутся как `?` и не
    /// восстанавливаются при чтении.
    pub material: String,
    /// Узкая строка (Latin-1): символы вне Latin-1 пишутся как `?` и не
    /// восстанавливаются при чтении.
    pub surface: String,
    pub is_enabled: bool,
    pub kicker_type: i32,
    pub scatter: f32,
    pub hit_accuracy: f32,
    pub hit_height: f32,
    pub orientation: f32,
    pub fall_through: bool,
    pub legacy_mode: bool,
    pub editor: EditorState,
}

impl Default for KickerData {
    fn default() -> Self {
        Self {
            name: String::new(),
            center: Vertex2D::default(),
            radius: 25.0,
            is_timer_enabled: false,
            timer_interval: 0,
            material: String::new(),
            surface: String::new(),
            is_enabled: true,
            kicker_type: KickerType::Hole as i32,
            scatter: 0.0,
            hit_accuracy: 0.7,
            hit_height: 40.0,
            orientation: 0.0,
            fall_through: false,
            legacy_mode: true,
            editor: EditorState::default(),
        }
    }
}

static SCHEMA: Lazy<Result<EntitySchema<KickerData>, SchemaError>> = Lazy::new(|| {
    let builder = SchemaBuilder::<KickerData>::new("Kicker")
        .vertex2d("VCEN", 1, |d| d.center, |d, v| d.center = v)
        .float("RADI", 2, |d| d.radius, |d, v| d.radius = v)
        .bool("TMON", 3, |d| d.is_timer_enabled, |d, v| d.is_timer_enabled = v)
        .int("TMIN", 4, |d| d.timer_interval, |d, v| d.timer_interval = v)
        .string("MATR", 5, |d| d.material.as_str(), |d, v| d.material = v)
        .string("SURF", 6, |d| d.surface.as_str(), |d, v| d.surface = v)
        .bool("EBLD", 7, |d| d.is_enabled, |d, v| d.is_enabled = v)
        .int("TYPE", 8, |d| d.kicker_type, |d, v| d.kicker_type = v)
        .float("KSCT", 9, |d| d.scatter, |d, v| d.scatter = v)
        .float("KHAC", 10, |d| d.hit_accuracy, |d, v| d.hit_accuracy = v)
        .float("KHHI", 11, |d| d.hit_height, |d, v| d.hit_height = v)
        .float("KORI", 12, |d| d.orientation, |d, v| d.orientation = v)
        .bool("FATH", 13, |d| d.fall_through, |d, v| d.fall_through = v)
        .bool("LEMO", 14, |d| d.legacy_mode, |d, v| d.legacy_mode = v)
        .wide_string("NAME", 15, |d| d.name.as_str(), |d, v| d.name = v);
    with_editor_fields(builder).build()
});

impl KickerData {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(
        &mut self,
        name: impl Into<String>,
    ) {
        self.name = name.into();
    }

    pub fn kicker_type(&self) -> Option<KickerType> {
        KickerType::try_from(self.kicker_type).ok()
    }
}

impl HasEditorState for KickerData {
    fn editor(&self) -> &EditorState {
        &self.editor
    }

    fn editor_mut(&mut self) -> &mut EditorState {
        &mut self.editor
    }
}

impl BiffEntity for KickerData {
    const NAME: &'static str = "Kicker";

    fn schema() -> Result<&'static EntitySchema<Self>, SchemaError> {
        SCHEMA.as_ref().map_err(Clone::clone)
    }
}
