/// BIFF tagged-record codec: tags, primitives, records, schemas, hashing.
pub mod biff;
/// CLI and library settings loading.
pub mod config;
/// Persisted table objects (HitTarget, Kicker, Timer) and their schemas.
pub mod items;
/// Flexible logging (formatting, filters, sinks).
pub mod logging;
/// Geometry types stored in records.
pub mod math;
/// Storage sections holding many object groups back to back.
pub mod table;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Codec core: schemas, record framing, digests.
pub use biff::{
    BiffEntity, ByteCursor, Digest, EntitySchema, FieldInfo, HashAccumulator, HashAlgorithm,
    LoadStats, Record, SchemaBuilder, Tag, WireKind, WireValue,
};
/// Error types and result aliases.
pub use biffkit_error::{
    BiffError, BiffResult, BiffkitResult, LogLevel, SchemaError, StackError, StatusCode,
};
/// Settings.
pub use config::Settings;
/// Table objects.
pub use items::{EditorState, GameItem, HitTargetData, ItemType, KickerData, TimerData};
/// Logging bootstrap.
pub use logging::{init_logging, LoggingConfig, LoggingHandle};
/// Geometry.
pub use math::{Vertex2D, Vertex3D};
/// Storage sections.
pub use table::{
    compute_digest, read_table, verify_digest, write_table, ContainerReader, ContainerStats,
    GroupEvent, GroupHandler, RecoveryPolicy, TableWriter,
};
