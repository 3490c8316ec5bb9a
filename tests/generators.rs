//! Генераторы для property-based тестирования объектов стола
//!
//! Строки делятся на узкие (только Latin-1, иначе символ заменяется на `?`
//! и обратное чтение не совпадает) и широкие (любой Unicode). Float-ы
//! конечные, чтобы сравнение через `PartialEq` было осмысленным.

#![allow(dead_code)]

use biffkit::{
    items::{EditorState, GameItem, HitTargetData, KickerData, TimerData},
    Vertex2D, Vertex3D,
};
use proptest::{prelude::*, string::string_regex};

/// Конечный float, включая граничные значения.
pub fn finite_f32() -> impl Strategy<Value = f32> {
    prop_oneof![
        Just(0.0f32),
        Just(f32::MIN_POSITIVE),
        Just(f32::MAX),
        Just(f32::MIN),
        -1.0e6f32..1.0e6f32,
    ]
}

/// Строка, представимая в Latin-1.
pub fn narrow_string() -> impl Strategy<Value = String> {
    string_regex(r"[\x20-\x7E\u{A0}-\u{FF}]{0,24}").unwrap()
}

/// Произвольная Unicode-строка, в том числе с символами вне BMP.
pub fn wide_string() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        string_regex("[a-zA-Z0-9_]{1,16}").unwrap(),
        any::<String>(),
        Just("Мишень 🎯".to_string()),
    ]
}

pub fn vertex2d() -> impl Strategy<Value = Vertex2D> {
    (finite_f32(), finite_f32()).prop_map(|(x, y)| Vertex2D::new(x, y))
}

pub fn vertex3d() -> impl Strategy<Value = Vertex3D> {
    (finite_f32(), finite_f32(), finite_f32()).prop_map(|(x, y, z)| Vertex3D::new(x, y, z))
}

pub fn editor_state() -> impl Strategy<Value = EditorState> {
    (any::<bool>(), any::<i32>(), narrow_string(), any::<bool>()).prop_map(
        |(is_locked, layer_index, layer_name, is_visible)| EditorState {
            is_locked,
            layer_index,
            layer_name,
            is_visible,
        },
    )
}

prop_compose! {
    pub fn hit_target()(
        strings in (wide_string(), narrow_string(), narrow_string(), narrow_string()),
        geometry in (vertex3d(), vertex3d(), finite_f32(), any::<i32>()),
        physics in (
            finite_f32(), finite_f32(), finite_f32(), finite_f32(), finite_f32(),
            finite_f32(), finite_f32(), finite_f32(), finite_f32(),
        ),
        flags in prop::array::uniform9(any::<bool>()),
        timers in (any::<i32>(), any::<i32>()),
        editor in editor_state(),
    ) -> HitTargetData {
        let (name, image, material, physics_material) = strings;
        let (position, size, rot_z, target_type) = geometry;
        let (
            threshold, elasticity, elasticity_falloff, friction, scatter,
            disable_lighting_top, disable_lighting_below, depth_bias, drop_speed,
        ) = physics;
        HitTargetData {
            name,
            position,
            size,
            rot_z,
            image,
            target_type,
            material,
            is_visible: flags[0],
            is_legacy: flags[1],
            use_hit_event: flags[2],
            threshold,
            elasticity,
            elasticity_falloff,
            friction,
            scatter,
            is_collidable: flags[3],
            disable_lighting_top,
            disable_lighting_below,
            is_reflection_enabled: flags[4],
            depth_bias,
            is_dropped: flags[5],
            drop_speed,
            is_timer_enabled: flags[6],
            timer_interval: timers.0,
            raise_delay: timers.1,
            physics_material,
            overwrite_physics: flags[7],
            editor: EditorState { is_locked: flags[8], ..editor },
        }
    }
}

prop_compose! {
    pub fn kicker()(
        name in wide_string(),
        material in narrow_string(),
        surface in narrow_string(),
        center in vertex2d(),
        floats in prop::array::uniform5(finite_f32()),
        ints in (any::<i32>(), any::<i32>()),
        flags in prop::array::uniform4(any::<bool>()),
        editor in editor_state(),
    ) -> KickerData {
        KickerData {
            name,
            center,
            radius: floats[0],
            is_timer_enabled: flags[0],
            timer_interval: ints.0,
            material,
            surface,
            is_enabled: flags[1],
            kicker_type: ints.1,
            scatter: floats[1],
            hit_accuracy: floats[2],
            hit_height: floats[3],
            orientation: floats[4],
            fall_through: flags[2],
            legacy_mode: flags[3],
            editor,
        }
    }
}

prop_compose! {
    pub fn timer()(
        name in wide_string(),
        center in vertex2d(),
        is_timer_enabled in any::<bool>(),
        timer_interval in any::<i32>(),
        backglass in any::<bool>(),
        editor in editor_state(),
    ) -> TimerData {
        TimerData { name, center, is_timer_enabled, timer_interval, backglass, editor }
    }
}

pub fn game_item() -> impl Strategy<Value = GameItem> {
    prop_oneof![
        hit_target().prop_map(GameItem::from),
        kicker().prop_map(GameItem::from),
        timer().prop_map(GameItem::from),
    ]
}
