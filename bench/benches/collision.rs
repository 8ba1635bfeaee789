//! Collision pass benchmarks over seeded random crowds.
//!
//! Each iteration integrates the movers and runs one full detection and resolution pass, which
//! is dominated by the quadratic nested scan.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use forage_bench::crowd::{self, Crowd, CrowdConfig};

// =============================================================================
// Collision Pass Benchmarks
// =============================================================================

fn bench_collision_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision_pass");
    group.sample_size(20);

    for count in [100, 500, 2_000] {
        group.throughput(Throughput::Elements(count as u64));

        // Sparse: few overlaps, measures detection
        group.bench_with_input(BenchmarkId::new("sparse", count), &count, |b, &n| {
            let mut crowd = Crowd::with_config(CrowdConfig {
                body_count: n,
                ..Default::default()
            });
            let mut collisions = crowd::collisions().expect("crowd dispatch table");
            crowd.setup();

            b.iter(|| black_box(crowd.update(&mut collisions)));
        });

        // Dense: many overlaps, measures resolution
        group.bench_with_input(BenchmarkId::new("dense", count), &count, |b, &n| {
            let mut crowd = Crowd::with_config(CrowdConfig {
                body_count: n,
                extent: (n as f32).sqrt(),
                ..Default::default()
            });
            let mut collisions = crowd::collisions().expect("crowd dispatch table");
            crowd.setup();

            b.iter(|| black_box(crowd.update(&mut collisions)));
        });
    }

    group.finish();
}

// =============================================================================
// Dispatch Benchmarks
// =============================================================================

fn bench_dispatch_build(c: &mut Criterion) {
    c.bench_function("dispatch_build", |b| {
        b.iter(|| black_box(crowd::dispatch_table().is_ok()));
    });
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(benches, bench_collision_pass, bench_dispatch_build);

criterion_main!(benches);
