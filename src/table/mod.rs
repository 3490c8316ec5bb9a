//! Контейнер: секция хранилища с группами объектов подряд.
//!
//! ```text
//! секция := группа*
//! группа := type_discriminator: i32 LE | record* | ENDB
//! ```
//!
//! Неизвестные дискриминаторы пропускают всю группу, а не одну запись,
//! поэтому файл с типами, которых нет в этой сборке, загружается частично.

mod digest;
mod reader;
mod writer;

use biffkit_error::BiffkitResult;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

pub use digest::{compute_digest, verify_digest};
pub use reader::{
    CallbackHandler, CollectHandler, ContainerReader, ContainerStats, CountHandler, GroupEvent,
    GroupHandler,
};
pub use writer::{write_table, TableWriter};

use crate::items::GameItem;

/// Что делать с группой, поля которой не удалось декодировать.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RecoveryPolicy {
    /// Прервать загрузку секции
    #[default]
    Abort,
    /// Пропустить группу и продолжить со следующей
    Skip,
}

/// Загружает все объекты секции.
pub fn read_table(
    bytes: &[u8],
    policy: RecoveryPolicy,
) -> BiffkitResult<(Vec<GameItem>, ContainerStats)> {
    let mut reader = ContainerReader::new(bytes);
    let mut handler = CollectHandler::with_policy(policy);
    reader.parse(&mut handler)?;
    Ok((handler.into_items(), reader.stats().clone()))
}
