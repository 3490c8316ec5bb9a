use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки объявления схемы сущности.
///
/// Возникают только при построении схемы (один раз на тип) и означают ошибку
/// программиста, а не повреждённый файл.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Unknown wire kind '{name}'")]
    UnknownWireKind { name: String },

    #[error("Invalid tag {tag:?} in schema {schema}: tags are exactly 4 ASCII bytes")]
    InvalidTag { schema: String, tag: String },

    #[error("Tag {tag} is reserved for the end marker (schema {schema})")]
    ReservedTag { schema: String, tag: String },

    #[error("Duplicate tag {tag} in schema {schema}")]
    DuplicateTag { schema: String, tag: String },

    #[error("Duplicate write position {pos} in schema {schema} (tags {first} and {second})")]
    DuplicatePosition {
        schema: String,
        pos: u32,
        first: String,
        second: String,
    },

    #[error("Field {tag} in schema {schema} declares wire kind {kind} but its accessor holds {accessor}")]
    KindMismatch {
        schema: String,
        tag: String,
        kind: String,
        accessor: &'static str,
    },

    #[error("Field {tag} in schema {schema}: option '{option}' is not valid for wire kind {kind}")]
    InvalidOption {
        schema: String,
        tag: String,
        option: &'static str,
        kind: String,
    },

    #[error("Field {tag} in schema {schema}: quantization width {bits} is outside 1..=32")]
    InvalidQuantization {
        schema: String,
        tag: String,
        bits: u8,
    },

    #[error("Schema {schema} declares no fields")]
    EmptySchema { schema: String },
}

impl ErrorExt for SchemaError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownWireKind { .. } => StatusCode::UnknownWireKind,
            _ => StatusCode::SchemaInvalid,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
