//! Property-based tests для BIFF кодека
//!
//! Генерируют случайные объекты стола и проверяют, что запись и чтение
//! сохраняют значения, запись детерминирована, а обрыв потока всегда даёт
//! ошибку, а не тихо прочитанный объект.

use biffkit::{
    biff::{read_record, BiffEntity, ByteCursor, HashAlgorithm},
    compute_digest,
    items::DISCRIMINATOR_LEN,
    read_table, write_table, GameItem, HitTargetData, KickerData, RecoveryPolicy, TimerData,
};
use proptest::prelude::*;

mod generators;
use generators::*;

/// Базовая настройка proptest - количество итераций
const PROPTEST_CASES: u32 = 256;

fn records_of<E: BiffEntity>(entity: &E) -> Vec<u8> {
    let mut out = Vec::new();
    entity.write_records(&mut out, None).unwrap();
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn prop_hit_target_round_trip(d in hit_target()) {
        let bytes = records_of(&d);
        let loaded = HitTargetData::load(&mut ByteCursor::new(&bytes)).unwrap();
        prop_assert_eq!(loaded, d);
    }

    #[test]
    fn prop_kicker_round_trip(d in kicker()) {
        let bytes = records_of(&d);
        let loaded = KickerData::load(&mut ByteCursor::new(&bytes)).unwrap();
        prop_assert_eq!(loaded, d);
    }

    #[test]
    fn prop_timer_round_trip(d in timer()) {
        let bytes = records_of(&d);
        let loaded = TimerData::load(&mut ByteCursor::new(&bytes)).unwrap();
        prop_assert_eq!(loaded, d);
    }

    /// Повторная запись даёт те же байты и ту же контрольную сумму.
    #[test]
    fn prop_write_is_deterministic(items in prop::collection::vec(game_item(), 0..6)) {
        let mut a = Vec::new();
        let mut b = Vec::new();
        let (_, da) = write_table(&items, &mut a, HashAlgorithm::Sha256).unwrap();
        let (_, db) = write_table(&items, &mut b, HashAlgorithm::Sha256).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(&da, &db);
        prop_assert_eq!(compute_digest(&a, HashAlgorithm::Sha256).unwrap(), da);
    }

    #[test]
    fn prop_table_round_trip(items in prop::collection::vec(game_item(), 0..6)) {
        let mut bytes = Vec::new();
        write_table(&items, &mut bytes, HashAlgorithm::Crc32).unwrap();
        let (loaded, stats) = read_table(&bytes, RecoveryPolicy::Abort).unwrap();
        prop_assert_eq!(stats.entities as usize, items.len());
        prop_assert_eq!(loaded, items);
    }

    /// Обрыв внутри записи даёт ошибку обрыва; обрыв ровно на границе
    /// записи читается как исчерпание потока.
    #[test]
    fn prop_truncation_is_detected(item in game_item(), cut in any::<prop::sample::Index>()) {
        let bytes = item.to_storage().unwrap();

        let err = GameItem::from_storage(&bytes[..bytes.len() - 1]).unwrap_err();
        prop_assert!(err.is_truncated());

        let cut = cut.index(bytes.len());
        let boundaries = record_boundaries(&bytes);
        match GameItem::from_storage(&bytes[..cut]) {
            Ok(_) => prop_assert!(boundaries.contains(&cut), "cut at {} decoded", cut),
            Err(e) => {
                prop_assert!(e.is_truncated(), "cut at {}: {}", cut, e);
                prop_assert!(!boundaries.contains(&cut));
            }
        }
    }
}

/// Смещения, на которых заканчивается дискриминатор или целая запись.
fn record_boundaries(bytes: &[u8]) -> Vec<usize> {
    let mut cursor = ByteCursor::new(&bytes[DISCRIMINATOR_LEN..]);
    let mut out = vec![DISCRIMINATOR_LEN];
    while !cursor.eof() {
        read_record(&mut cursor).unwrap();
        out.push(DISCRIMINATOR_LEN + cursor.local_position());
    }
    out
}
