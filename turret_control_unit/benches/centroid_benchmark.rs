//! Centroid extraction benchmark.
//!
//! - empty scene (no pixel above threshold)
//! - 3×3 hot spot
//! - every pixel hot (worst case for the accumulators)

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use turret_common::frame::ThermalFrame;
use turret_control_unit::vision::centroid::CentroidLocator;

fn bench_locate(c: &mut Criterion) {
    let locator = CentroidLocator::default();
    let reference = ThermalFrame::uniform(60);

    let empty = reference.clone();
    let mut spot = reference.clone();
    for row in 5..8 {
        for col in 20..23 {
            spot.set(col, row, 240);
        }
    }
    let saturated = ThermalFrame::uniform(255);

    c.bench_function("locate_empty", |b| {
        b.iter(|| locator.locate(black_box(&reference), black_box(&empty)))
    });
    c.bench_function("locate_hot_spot", |b| {
        b.iter(|| locator.find_angles(black_box(&reference), black_box(&spot)))
    });
    c.bench_function("locate_all_hot", |b| {
        b.iter(|| locator.locate(black_box(&reference), black_box(&saturated)))
    });
}

criterion_group!(benches, bench_locate);
criterion_main!(benches);
