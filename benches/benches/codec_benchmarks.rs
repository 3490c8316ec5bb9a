use std::hint::black_box;

use biffkit::{
    biff::{BiffEntity, ByteCursor, HashAlgorithm},
    compute_digest, read_table, write_table, GameItem, HitTargetData, KickerData,
    RecoveryPolicy, TimerData,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::SmallRng, Rng, SeedableRng};

// ============================================================================
// Helper functions для создания тестовых данных
// ============================================================================

fn create_items(count: usize) -> Vec<GameItem> {
    let mut rng = SmallRng::seed_from_u64(0xB1FF);
    (0..count)
        .map(|i| -> GameItem {
            match i % 3 {
                0 => {
                    let mut d = HitTargetData::new(
                        format!("Target{i}"),
                        rng.gen_range(0.0..1000.0),
                        rng.gen_range(0.0..2000.0),
                    );
                    d.elasticity = rng.gen();
                    d.into()
                }
                1 => KickerData {
                    name: format!("Kicker{i}"),
                    radius: rng.gen_range(10.0..50.0),
                    ..Default::default()
                }
                .into(),
                _ => TimerData {
                    name: format!("Timer{i}"),
                    timer_interval: rng.gen_range(1..1000),
                    ..Default::default()
                }
                .into(),
            }
        })
        .collect()
}

fn encode(items: &[GameItem]) -> Vec<u8> {
    let mut out = Vec::new();
    if let Err(e) = write_table(items, &mut out, HashAlgorithm::Crc32) {
        panic!("failed to encode bench data: {e}");
    }
    out
}

// ============================================================================
// Бенчмарки
// ============================================================================

fn bench_entity(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity");
    let target = HitTargetData::new("Target1", 100.0, 200.0);
    let mut bytes = Vec::new();
    target.write_records(&mut bytes, None).unwrap();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("hit_target_load", |b| {
        b.iter(|| HitTargetData::load(&mut ByteCursor::new(black_box(&bytes))).unwrap())
    });
    group.bench_function("hit_target_write", |b| {
        let mut out = Vec::with_capacity(bytes.len());
        b.iter(|| {
            out.clear();
            black_box(&target).write_records(&mut out, None).unwrap()
        })
    });
    group.finish();
}

fn bench_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("table");

    for count in [10usize, 100, 1000] {
        let items = create_items(count);
        let bytes = encode(&items);
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("read", count), &bytes, |b, bytes| {
            b.iter(|| read_table(black_box(bytes), RecoveryPolicy::Abort).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("write", count), &items, |b, items| {
            b.iter(|| encode(black_box(items)))
        });
        for alg in [HashAlgorithm::Crc32, HashAlgorithm::Sha256] {
            group.bench_with_input(
                BenchmarkId::new(format!("digest_{alg}"), count),
                &bytes,
                |b, bytes| b.iter(|| compute_digest(black_box(bytes), alg).unwrap()),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_entity, bench_table);
criterion_main!(benches);
