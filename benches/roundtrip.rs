//! Read/write round-trip micro-benchmark, exercising the columnar blit write path and the
//! streaming read path at a few table sizes.

use criterion::{criterion_group, criterion_main, Criterion};
use std::io::Cursor;

use lastable::table::{PointTable, Row};
use lastable::Dataset;

fn dataset_of_size(n: usize) -> Dataset {
    let mut table = PointTable::new();
    for i in 0..n {
        table
            .push(Row {
                position: (i as f64, (i as f64) * 0.5, (i as f64) * 0.25),
                intensity: (i % u16::MAX as usize) as u16,
                return_number: 1,
                number_of_returns: 1,
                ..Row::default()
            })
            .unwrap();
    }
    Dataset::new(table).unwrap()
}

fn roundtrip(n: usize) {
    let dataset = dataset_of_size(n);
    let mut buffer = Vec::new();
    dataset.write_to(&mut buffer).unwrap();
    let back = Dataset::read_from(Cursor::new(buffer)).unwrap();
    assert_eq!(n as u64, back.header().point_count());
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip");
    for &n in &[0usize, 1, 100, 10_000] {
        group.bench_function(format!("{n}_points"), |b| b.iter(|| roundtrip(n)));
    }
    group.finish();
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
