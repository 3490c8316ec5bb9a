//! Мишень: неподвижная или падающая (drop target).

use biffkit_error::SchemaError;
use num_enum::TryFromPrimitive;
use once_cell::sync::Lazy;
use serde::Serialize;
use strum_macros::{Display, EnumIter};

use super::{with_editor_fields, EditorState, HasEditorState};
use crate::{
    biff::{BiffEntity, EntitySchema, SchemaBuilder},
    math::Vertex3D,
};

/// Форма мишени (поле `TRTY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, Display, EnumIter, Serialize)]
#[repr(i32)]
pub enum TargetType {
    DropTargetBeveled = 1,
    DropTargetSimple = 2,
    HitTargetRound = 3,
    HitTargetRectangle = 4,
    HitFatTargetRectangle = 5,
    HitFatTargetSquare = 6,
    DropTargetFlatSimple = 7,
    HitFatTargetSlim = 8,
    HitTargetSlim = 9,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitTargetData {
    pub name: String,
    pub position: Vertex3D,
    pub size: Vertex3D,
    pub rot_z: f32,
    /// Узкая строка (Latin-1): символы вне Latin-1 пишутся как `?` и не
    /// восстанавливаются при чтении.
    pub image: String,
    /// Сырое значение `TRTY`; неизвестные формы сохраняются как есть.
    pub target_type: i32,
    /// Узкая строка (Latin-1): символы вне Latin-1 пишутся как `?` и не
    /// восстанавливаются при чтении.
    pub material: String,
    pub is_visible: bool,
    pub is_legacy: bool,
    pub use_hit_event: bool,
    pub threshold: f32,
    pub elasticity: f32,
    pub elasticity_falloff: f32,
    pub friction: f32,
    pub scatter: f32,
    pub is_collidable: bool,
    /// Хранится с логической точностью 8 бит.
    pub disable_lighting_top: f32,
    pub disable_lighting_below: f32,
    pub is_reflection_enabled: bool,
    pub depth_bias: f32,
    pub is_dropped: bool,
    pub drop_speed: f32,
    pub is_timer_enabled: bool,
    pub timer_interval: i32,
    pub raise_delay: i32,
    /// Узкая строка (Latin-1): символы вне Latin-1 пишутся как `?` и не
    /// восстанавливаются при чтении.
    pub physics_material: String,
    pub overwrite_physics: bool,
    pub editor: EditorState,
}

impl Default for HitTargetData {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vertex3D::default(),
            size: Vertex3D::new(32.0, 32.0, 32.0),
            rot_z: 0.0,
            image: String::new(),
            target_type: TargetType::DropTargetSimple as i32,
            material: String::new(),
            is_visible: true,
            is_legacy: false,
            use_hit_event: true,
            threshold: 2.0,
            elasticity: 0.0,
            elasticity_falloff: 0.0,
            friction: 0.0,
            scatter: 0.0,
            is_collidable: true,
            disable_lighting_top: 0.0,
            disable_lighting_below: 0.0,
            is_reflection_enabled: true,
            depth_bias: 0.0,
            is_dropped: false,
            drop_speed: 0.5,
            is_timer_enabled: false,
            timer_interval: 0,
            raise_delay: 100,
            physics_material: String::new(),
            overwrite_physics: false,
            editor: EditorState::default(),
        }
    }
}

static SCHEMA: Lazy<Result<EntitySchema<HitTargetData>, SchemaError>> = Lazy::new(|| {
    let builder = SchemaBuilder::<HitTargetData>::new("HitTarget")
        .vertex3d("VPOS", 1, true, |d| d.position, |d, v| d.position = v)
        .vertex3d("VSIZ", 2, true, |d| d.size, |d, v| d.size = v)
        .float("ROTZ", 3, |d| d.rot_z, |d, v| d.rot_z = v)
        .string("IMAG", 4, |d| d.image.as_str(), |d, v| d.image = v)
        .int("TRTY", 5, |d| d.target_type, |d, v| d.target_type = v)
        .wide_string("NAME", 6, |d| d.name.as_str(), |d, v| d.name = v)
        .string("MATR", 7, |d| d.material.as_str(), |d, v| d.material = v)
        .bool("TVIS", 8, |d| d.is_visible, |d, v| d.is_visible = v)
        .bool("LEMO", 9, |d| d.is_legacy, |d, v| d.is_legacy = v)
        .bool("HTEV", 10, |d| d.use_hit_event, |d, v| d.use_hit_event = v)
        .float("THRS", 11, |d| d.threshold, |d, v| d.threshold = v)
        .float("ELAS", 12, |d| d.elasticity, |d, v| d.elasticity = v)
        .float("ELFO", 13, |d| d.elasticity_falloff, |d, v| d.elasticity_falloff = v)
        .float("RFCT", 14, |d| d.friction, |d, v| d.friction = v)
        .float("RSCT", 15, |d| d.scatter, |d, v| d.scatter = v)
        .bool("CLDR", 16, |d| d.is_collidable, |d, v| d.is_collidable = v)
        .quantized_float(
            "DILI",
            17,
            8,
            |d| d.disable_lighting_top,
            |d, v| d.disable_lighting_top = v,
        )
        .float(
            "DILB",
            18,
            |d| d.disable_lighting_below,
            |d, v| d.disable_lighting_below = v,
        )
        .bool(
            "REEN",
            19,
            |d| d.is_reflection_enabled,
            |d, v| d.is_reflection_enabled = v,
        )
        .float("PIDB", 20, |d| d.depth_bias, |d, v| d.depth_bias = v)
        .bool("ISDR", 21, |d| d.is_dropped, |d, v| d.is_dropped = v)
        .float("DRSP", 22, |d| d.drop_speed, |d, v| d.drop_speed = v)
        .bool("TMON", 23, |d| d.is_timer_enabled, |d, v| d.is_timer_enabled = v)
        .int("TMIN", 24, |d| d.timer_interval, |d, v| d.timer_interval = v)
        .int("RADE", 25, |d| d.raise_delay, |d, v| d.raise_delay = v)
        .string(
            "MAPH",
            26,
            |d| d.physics_material.as_str(),
            |d, v| d.physics_material = v,
        )
        .bool("OVPH", 27, |d| d.overwrite_physics, |d, v| d.overwrite_physics = v);
    with_editor_fields(builder).build()
});

impl HitTargetData {
    /// Мишень с именем в точке `(x, y)` на плоскости стола.
    pub fn new(
        name: impl Into<String>,
        x: f32,
        y: f32,
    ) -> Self {
        Self {
            name: name.into(),
            position: Vertex3D::new(x, y, 0.0),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(
        &mut self,
        name: impl Into<String>,
    ) {
        self.name = name.into();
    }

    /// Типизированная форма; `None` для значений, которых нет в перечне.
    pub fn target_type(&self) -> Option<TargetType> {
        TargetType::try_from(self.target_type).ok()
    }

    pub fn is_drop_target(&self) -> bool {
        matches!(
            self.target_type(),
            Some(
                TargetType::DropTargetBeveled
                    | TargetType::DropTargetSimple
                    | TargetType::DropTargetFlatSimple
            )
        )
    }
}

impl HasEditorState for HitTargetData {
    fn editor(&self) -> &EditorState {
        &self.editor
    }

    fn editor_mut(&mut self) -> &mut EditorState {
        &mut self.editor
    }
}

impl BiffEntity for HitTargetData {
    const NAME: &'static str = "HitTarget";

    fn schema() -> Result<&'static EntitySchema<Self>, SchemaError> {
        SCHEMA.as_ref().map_err(Clone::clone)
    }
}
