//! Геометрические типы, хранимые в записях таблицы.

use serde::{Deserialize, Serialize};

/// Точка на плоскости стола.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex2D {
    pub x: f32,
    pub y: f32,
}

/// Точка или размер в пространстве стола.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vertex2D {
    pub const fn new(
        x: f32,
        y: f32,
    ) -> Self {
        Self { x, y }
    }
}

impl Vertex3D {
    pub const fn new(
        x: f32,
        y: f32,
        z: f32,
    ) -> Self {
        Self { x, y, z }
    }
}

impl From<Vertex2D> for Vertex3D {
    fn from(v: Vertex2D) -> Self {
        Vertex3D::new(v.x, v.y, 0.0)
    }
}
