use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use louvain_community::generator::planted_partition;
use louvain_community::LouvainDetector;

fn bench_detect(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let graph = planted_partition(10, 50, 0.3, 0.005, &mut rng).unwrap();

    c.bench_function("louvain planted 10x50", |b| {
        b.iter_batched(
            || LouvainDetector::new(graph.clone()),
            |mut detector| {
                detector.run_default().unwrap();
                black_box(detector.modularity())
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_detect);
criterion_main!(benches);
