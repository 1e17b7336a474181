//! Query and construction benchmarks for the three metric trees.
//!
//! Low intrinsic dimensionality is where metric trees shine; the `dim`
//! sweep shows how quickly pruning fades as dimension grows.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vantage::distance::{Distance, Euclidean};
use vantage::gnat::{GNATIndex, GNATParams};
use vantage::mvptree::{MVPTreeIndex, MVPTreeParams};
use vantage::vptree::{VPTreeIndex, VPTreeParams};
use vantage::MetricIndex;

fn create_dataset(n: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dim).map(|_| rng.random::<f32>()).collect())
        .collect()
}

fn brute_force_knn(query: &Vec<f32>, database: &[Vec<f32>], k: usize) -> Vec<(u32, f64)> {
    let mut distances: Vec<(u32, f64)> = database
        .iter()
        .enumerate()
        .map(|(i, v)| (i as u32, Euclidean.distance(v, query)))
        .collect();
    distances.sort_by(|a, b| a.1.total_cmp(&b.1));
    distances.truncate(k);
    distances
}

/// kNN query time for each tree against a linear scan.
fn bench_knn(c: &mut Criterion) {
    let mut group = c.benchmark_group("knn");
    group.sample_size(20);

    let n = 10_000;
    let k = 10;

    for dim in [2usize, 8, 32] {
        let database = create_dataset(n, dim, 42);
        let queries = create_dataset(10, dim, 123);

        let mut vp = VPTreeIndex::new(&database, Euclidean, VPTreeParams::default().with_seed(1)).unwrap();
        vp.build().unwrap();
        let mut mvp = MVPTreeIndex::new(&database, Euclidean, MVPTreeParams::default().with_seed(1)).unwrap();
        mvp.build().unwrap();
        let mut gnat = GNATIndex::new(&database, Euclidean, GNATParams::default().with_seed(1)).unwrap();
        gnat.build().unwrap();

        group.throughput(Throughput::Elements(queries.len() as u64));

        group.bench_with_input(BenchmarkId::new("vptree", dim), &dim, |b, _| {
            b.iter(|| {
                for query in &queries {
                    black_box(vp.knn(query, k).unwrap());
                }
            })
        });
        group.bench_with_input(BenchmarkId::new("mvptree", dim), &dim, |b, _| {
            b.iter(|| {
                for query in &queries {
                    black_box(mvp.knn(query, k).unwrap());
                }
            })
        });
        group.bench_with_input(BenchmarkId::new("gnat", dim), &dim, |b, _| {
            b.iter(|| {
                for query in &queries {
                    black_box(gnat.knn(query, k).unwrap());
                }
            })
        });
        group.bench_with_input(BenchmarkId::new("brute", dim), &dim, |b, _| {
            b.iter(|| {
                for query in &queries {
                    black_box(brute_force_knn(query, &database, k));
                }
            })
        });
    }

    group.finish();
}

/// Range queries with a radius that catches roughly 1% of the data.
fn bench_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("range");
    group.sample_size(20);

    let database = create_dataset(10_000, 4, 7);
    let queries = create_dataset(10, 4, 8);
    let radius = 0.15;

    let mut vp = VPTreeIndex::new(&database, Euclidean, VPTreeParams::default().with_seed(2)).unwrap();
    vp.build().unwrap();
    let mut gnat = GNATIndex::new(&database, Euclidean, GNATParams::default().with_seed(2)).unwrap();
    gnat.build().unwrap();

    group.bench_function("vptree", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(vp.range(query, radius).unwrap());
            }
        })
    });
    group.bench_function("gnat", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(gnat.range(query, radius).unwrap());
            }
        })
    });

    group.finish();
}

/// Cost of pulling the first few results from a priority search.
fn bench_priority(c: &mut Criterion) {
    let mut group = c.benchmark_group("priority_first_k");
    group.sample_size(20);

    let database = create_dataset(10_000, 4, 9);
    let query = create_dataset(1, 4, 10).remove(0);
    let mut mvp = MVPTreeIndex::new(&database, Euclidean, MVPTreeParams::default().with_seed(3)).unwrap();
    mvp.build().unwrap();

    for take in [1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::new("mvptree", take), &take, |b, &take| {
            b.iter(|| black_box(mvp.priority_search(&query).unwrap().take(take).count()))
        });
    }

    group.finish();
}

/// Build time scaling with collection size.
fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    group.sample_size(10);

    for n in [1_000usize, 5_000, 20_000] {
        let database = create_dataset(n, 8, 42);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("vptree", n), &n, |b, _| {
            b.iter(|| {
                let mut index = VPTreeIndex::new(&database, Euclidean, VPTreeParams::default().with_seed(1)).unwrap();
                index.build().unwrap();
                black_box(index.stats())
            })
        });
        group.bench_with_input(BenchmarkId::new("mvptree", n), &n, |b, _| {
            b.iter(|| {
                let mut index = MVPTreeIndex::new(&database, Euclidean, MVPTreeParams::default().with_seed(1)).unwrap();
                index.build().unwrap();
                black_box(index.stats())
            })
        });
        group.bench_with_input(BenchmarkId::new("gnat", n), &n, |b, _| {
            b.iter(|| {
                let mut index = GNATIndex::new(&database, Euclidean, GNATParams::default().with_seed(1)).unwrap();
                index.build().unwrap();
                black_box(index.stats())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_knn, bench_range, bench_priority, bench_construction);
criterion_main!(benches);
