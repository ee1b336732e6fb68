use std::collections::BTreeMap;
use std::hint::black_box;

use bptree_index::BPTree;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

const N: usize = 10_000;
const FANOUTS: [usize; 3] = [4, 32, 128];

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn filled_tree(keys: &[i64], keys_per_node: usize) -> BPTree<i64> {
    let mut tree = BPTree::new(keys_per_node);
    tree.extend(keys.iter().map(|&k| (k, k)));
    tree
}

// ─── Benchmarks ─────────────────────────────────────────────────────────────

fn bench_set(c: &mut Criterion) {
    for (name, keys) in [("ordered", ordered_keys(N)), ("random", random_keys(N))] {
        let mut group = c.benchmark_group(format!("set_{name}"));

        for keys_per_node in FANOUTS {
            group.bench_function(BenchmarkId::new("BPTree", keys_per_node), |b| {
                b.iter(|| filled_tree(&keys, keys_per_node));
            });
        }

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| keys.iter().map(|&k| (k, k)).collect::<BTreeMap<_, _>>());
        });

        group.finish();
    }
}

fn bench_get_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let mut group = c.benchmark_group("get_random");

    for keys_per_node in FANOUTS {
        let tree = filled_tree(&keys, keys_per_node);
        group.bench_function(BenchmarkId::new("BPTree", keys_per_node), |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for &k in &keys {
                    if let Some(&v) = tree.get(black_box(k)) {
                        sum = sum.wrapping_add(v);
                    }
                }
                sum
            });
        });
    }

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Some(&v) = bt_map.get(black_box(&k)) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.finish();
}

fn bench_delete_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("delete_random");

    for keys_per_node in FANOUTS {
        group.bench_function(BenchmarkId::new("BPTree", keys_per_node), |b| {
            b.iter_batched(
                || filled_tree(&keys, keys_per_node),
                |mut tree| {
                    for &k in &keys {
                        tree.delete(k);
                    }
                    tree
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let mut group = c.benchmark_group("scan_1000");

    for keys_per_node in FANOUTS {
        let tree = filled_tree(&keys, keys_per_node);
        group.bench_function(BenchmarkId::new("BPTree", keys_per_node), |b| {
            b.iter(|| tree.scan(black_box(4_000), black_box(4_999)).len());
        });
    }

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| bt_map.range(black_box(4_000)..=black_box(4_999)).count());
    });

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(set_benches, bench_set);

criterion_group!(read_benches, bench_get_random, bench_scan);

criterion_group!(delete_benches, bench_delete_random);

criterion_main!(set_benches, read_benches, delete_benches);
