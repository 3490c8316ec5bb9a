//! BIFF: формат тегированных записей, в котором хранятся объекты стола.
//!
//! ```text
//! группа   := type_discriminator: i32 LE | record* | end_marker
//! record   := tag: [u8; 4] | length: u32 LE | payload: [u8; length]
//! end_marker := "ENDB" | 0u32
//! ```
//!
//! Слои снизу вверх: [`cursor`] и [`primitives`] → [`record`] → [`schema`] →
//! [`serializer`]. Контейнер групп живёт в [`crate::table`].

pub mod cursor;
pub mod hash;
pub mod primitives;
pub mod record;
pub mod schema;
pub mod serializer;
pub mod tags;

pub use cursor::*;
pub use hash::*;
pub use primitives::{WireValue, PADDED_VERTEX3D_LEN, SCALAR_LEN};
pub use record::*;
pub use schema::*;
pub use serializer::*;
pub use tags::*;
