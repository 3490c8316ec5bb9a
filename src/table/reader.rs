//! Событийный обход групп записей в секции хранилища.
//!
//! Читатель выделяет границы каждой группы до её декодирования. Поэтому
//! ошибка внутри полей группы оставляет поток в согласованном состоянии, и
//! обработчик может решить: пропустить группу или прервать загрузку.
//! Ошибки разметки (поток оборвался внутри дискриминатора или записи) всегда
//! фатальны.
//!
//! # События
//!
//! - `Entity`: группа известного типа успешно загружена
//! - `UnknownGroup`: дискриминатор неизвестен или тип не реализован,
//!   группа пропущена целиком
//! - `Error`: ошибка декодирования или разметки
//! - `End`: поток исчерпан

use biffkit_error::{BiffError, BiffkitResult, StackError};
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use super::RecoveryPolicy;
use crate::{
    biff::{skip_group, ByteCursor},
    items::{GameItem, ItemType},
};

/// Трейт для обработки событий контейнера.
pub trait GroupHandler {
    /// Вызывается для каждого события.
    fn handle_event(
        &mut self,
        event: GroupEvent,
    ) -> BiffkitResult<()>;

    /// Пропускать ли группу, поля которой не удалось декодировать.
    fn should_continue_on_error(&self) -> bool {
        false
    }

    /// Вызывается в конце обхода для финализации.
    fn finalize(&mut self) -> BiffkitResult<()> {
        Ok(())
    }
}

/// События, генерируемые читателем.
#[derive(Debug, Clone)]
pub enum GroupEvent {
    /// Загружен объект
    Entity { offset: u64, item: GameItem },
    /// Группа пропущена: неизвестный дискриминатор или нереализованный тип
    UnknownGroup {
        offset: u64,
        discriminator: i32,
        item_type: Option<ItemType>,
        records: usize,
    },
    /// Ошибка; `recoverable` означает, что границы группы известны
    Error {
        offset: u64,
        error: BiffError,
        recoverable: bool,
    },
    /// Конец потока
    End,
}

/// Статистика обхода.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// Кол-во байт, пройденных читателем
    pub bytes_read: u64,
    /// Кол-во групп (включая пропущенные)
    pub groups: u64,
    /// Кол-во загруженных объектов
    pub entities: u64,
    /// Кол-во групп неизвестных или нереализованных типов
    pub unknown_groups: u64,
    /// Кол-во групп, пропущенных после ошибки
    pub skipped_groups: u64,
    /// Кол-во ошибок
    pub errors: u64,
}

/// Читатель секции хранилища, содержащей группы подряд.
pub struct ContainerReader<'a> {
    cursor: ByteCursor<'a>,
    stats: ContainerStats,
}

/// Handler для сбора всех объектов в Vec.
#[derive(Debug, Default)]
pub struct CollectHandler {
    items: Vec<GameItem>,
    policy: RecoveryPolicy,
}

/// Handler для подсчёта групп по типам без сохранения объектов.
#[derive(Debug, Default)]
pub struct CountHandler {
    by_type: FxHashMap<ItemType, u64>,
    unknown_discriminators: FxHashMap<i32, u64>,
    errors: u64,
    policy: RecoveryPolicy,
}

/// Handler с callback ф-ей для каждого объекта.
pub struct CallbackHandler<F>
where
    F: FnMut(u64, GameItem) -> BiffkitResult<()>,
{
    callback: F,
    policy: RecoveryPolicy,
}

impl<'a> ContainerReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base_offset(data, 0)
    }

    /// Читатель для секции, начинающейся на `base_offset` исходного файла.
    pub fn with_base_offset(
        data: &'a [u8],
        base_offset: u64,
    ) -> Self {
        Self {
            cursor: ByteCursor::with_base_offset(data, base_offset),
            stats: ContainerStats::default(),
        }
    }

    /// Обходит все группы, вызывая handler для каждого события.
    pub fn parse<H: GroupHandler>(
        &mut self,
        handler: &mut H,
    ) -> BiffkitResult<()> {
        while !self.cursor.eof() {
            let offset = self.cursor.position();
            self.stats.groups += 1;

            let (discriminator, group) = match self.frame_group() {
                Ok(framed) => framed,
                Err(e) => {
                    self.stats.errors += 1;
                    handler.handle_event(GroupEvent::Error {
                        offset,
                        error: e.clone(),
                        recoverable: false,
                    })?;
                    return Err(StackError::from(e)
                        .context(format!("group at offset 0x{offset:X} is not framed")));
                }
            };

            let item_type = ItemType::try_from(discriminator).ok();
            let loaded = match item_type {
                Some(t) => GameItem::load(t, &mut group.clone()),
                None => Ok(None),
            };

            match loaded {
                Ok(Some(item)) => {
                    self.stats.entities += 1;
                    handler.handle_event(GroupEvent::Entity { offset, item })?;
                }
                Ok(None) => {
                    self.stats.unknown_groups += 1;
                    let records = count_records(&group);
                    debug!(
                        offset,
                        discriminator,
                        item_type = ?item_type,
                        records,
                        "skipping group of unsupported type"
                    );
                    handler.handle_event(GroupEvent::UnknownGroup {
                        offset,
                        discriminator,
                        item_type,
                        records,
                    })?;
                }
                Err(e) => {
                    self.stats.errors += 1;
                    handler.handle_event(GroupEvent::Error {
                        offset,
                        error: e.clone(),
                        recoverable: e.is_recoverable(),
                    })?;

                    if !(e.is_recoverable() && handler.should_continue_on_error()) {
                        return Err(StackError::from(e)
                            .context(format!("failed to load group at offset 0x{offset:X}")));
                    }
                    self.stats.skipped_groups += 1;
                    warn!(offset, error = %e, "skipped corrupted group");
                }
            }
        }

        self.stats.bytes_read = self.cursor.local_position() as u64;
        handler.handle_event(GroupEvent::End)?;
        handler.finalize()?;

        info!(
            groups = self.stats.groups,
            entities = self.stats.entities,
            unknown = self.stats.unknown_groups,
            skipped = self.stats.skipped_groups,
            "table section parsed"
        );
        Ok(())
    }

    /// Возвращает статистику обхода.
    pub fn stats(&self) -> &ContainerStats {
        &self.stats
    }

    /// Читает дискриминатор и находит границы группы. Возвращает курсор,
    /// ограниченный записями группы.
    fn frame_group(&mut self) -> Result<(i32, ByteCursor<'a>), BiffError> {
        let discriminator = self.cursor.read_i32("type discriminator")?;
        let start_local = self.cursor.local_position();
        let item_type = ItemType::try_from(discriminator).ok();
        let frame = skip_group(&mut self.cursor).map_err(|e| match item_type {
            Some(t) => e.with_item_type(t.to_string()),
            None => e,
        })?;
        let data = self.cursor.data();
        let group = &data[start_local..start_local + frame.len];
        Ok((discriminator, ByteCursor::with_base_offset(group, frame.start)))
    }
}

/// Кол-во записей в уже размеченной группе (без маркера конца).
fn count_records(group: &ByteCursor<'_>) -> usize {
    skip_group(&mut group.clone())
        .map(|f| f.records)
        .unwrap_or_default()
}

impl CollectHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: RecoveryPolicy) -> Self {
        Self {
            items: Vec::new(),
            policy,
        }
    }

    /// Возвращает собранные объекты.
    pub fn items(&self) -> &[GameItem] {
        &self.items
    }

    /// Забирает собранные объекты.
    pub fn into_items(self) -> Vec<GameItem> {
        self.items
    }
}

impl GroupHandler for CollectHandler {
    fn handle_event(
        &mut self,
        event: GroupEvent,
    ) -> BiffkitResult<()> {
        if let GroupEvent::Entity { item, .. } = event {
            self.items.push(item);
        }
        Ok(())
    }

    fn should_continue_on_error(&self) -> bool {
        self.policy == RecoveryPolicy::Skip
    }
}

impl CountHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: RecoveryPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Кол-во загруженных объектов типа.
    pub fn count(
        &self,
        item_type: ItemType,
    ) -> u64 {
        self.by_type.get(&item_type).copied().unwrap_or(0)
    }

    /// Кол-во загруженных объектов всех типов.
    pub fn total(&self) -> u64 {
        self.by_type.values().sum()
    }

    /// Пропущенные группы по сырому дискриминатору.
    pub fn unknown_discriminators(&self) -> &FxHashMap<i32, u64> {
        &self.unknown_discriminators
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }
}

impl GroupHandler for CountHandler {
    fn handle_event(
        &mut self,
        event: GroupEvent,
    ) -> BiffkitResult<()> {
        match event {
            GroupEvent::Entity { item, .. } => {
                *self.by_type.entry(item.item_type()).or_default() += 1;
            }
            GroupEvent::UnknownGroup { discriminator, .. } => {
                *self.unknown_discriminators.entry(discriminator).or_default() += 1;
            }
            GroupEvent::Error { .. } => self.errors += 1,
            GroupEvent::End => {}
        }
        Ok(())
    }

    fn should_continue_on_error(&self) -> bool {
        self.policy == RecoveryPolicy::Skip
    }
}

impl<F> CallbackHandler<F>
where
    F: FnMut(u64, GameItem) -> BiffkitResult<()>,
{
    /// Создаёт handler; callback получает смещение группы и объект.
    pub fn new(
        policy: RecoveryPolicy,
        callback: F,
    ) -> Self {
        Self { callback, policy }
    }
}

impl<F> GroupHandler for CallbackHandler<F>
where
    F: FnMut(u64, GameItem) -> BiffkitResult<()>,
{
    fn handle_event(
        &mut self,
        event: GroupEvent,
    ) -> BiffkitResult<()> {
        if let GroupEvent::Entity { offset, item } = event {
            (self.callback)(offset, item)?;
        }
        Ok(())
    }

    fn should_continue_on_error(&self) -> bool {
        self.policy == RecoveryPolicy::Skip
    }
}
