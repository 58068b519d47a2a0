//! B+ tree benchmarks: bulk load, point lookup, range scan, and a mixed
//! insert/delete churn workload.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::seq::SliceRandom;
use rand::SeedableRng;

use blockindex::{BPlusTree, Key, RecordPtr};

const TREE_SIZE: usize = 10_000;

fn shuffled_keys(n: usize, seed: u64) -> Vec<Key> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut keys: Vec<Key> = (0..n as Key).collect();
    keys.shuffle(&mut rng);
    keys
}

fn loaded_tree(order: usize, keys: &[Key]) -> BPlusTree {
    let mut tree = BPlusTree::new(order).unwrap();
    for (i, &key) in keys.iter().enumerate() {
        tree.insert(key, RecordPtr::new((i / 512) as u32, i as u32));
    }
    tree
}

fn bench_bulk_insert(c: &mut Criterion) {
    let keys = shuffled_keys(TREE_SIZE, 1);
    let mut group = c.benchmark_group("bulk_insert");
    for order in [4, 32, 254] {
        group.bench_with_input(BenchmarkId::from_parameter(order), &order, |b, &order| {
            b.iter(|| loaded_tree(order, black_box(&keys)));
        });
    }
    group.finish();
}

fn bench_exact_search(c: &mut Criterion) {
    let keys = shuffled_keys(TREE_SIZE, 2);
    let mut group = c.benchmark_group("exact_search");
    for order in [4, 32, 254] {
        let tree = loaded_tree(order, &keys);
        group.bench_with_input(BenchmarkId::from_parameter(order), &tree, |b, tree| {
            let mut i = 0;
            b.iter(|| {
                let key = keys[i % keys.len()];
                i += 1;
                black_box(tree.exact_search(black_box(key)))
            });
        });
    }
    group.finish();
}

fn bench_range_search(c: &mut Criterion) {
    let keys = shuffled_keys(TREE_SIZE, 3);
    let tree = loaded_tree(32, &keys);
    let mut group = c.benchmark_group("range_search");
    for width in [10i64, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            let mut low = 0i64;
            b.iter(|| {
                low = (low + 7919) % (TREE_SIZE as i64 - width);
                black_box(tree.range_search(black_box(low), black_box(low + width + 1)))
            });
        });
    }
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let keys = shuffled_keys(TREE_SIZE, 4);
    let mut group = c.benchmark_group("churn");
    for order in [4, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(order), &order, |b, &order| {
            b.iter_batched(
                || loaded_tree(order, &keys),
                |mut tree| {
                    // Delete and reinsert a thousand keys, exercising
                    // the rebalance and split paths together.
                    for &key in keys.iter().take(1000) {
                        tree.delete(black_box(key));
                    }
                    for &key in keys.iter().take(1000) {
                        tree.insert(black_box(key), RecordPtr::new(9, key as u32));
                    }
                    tree
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_bulk_insert,
    bench_exact_search,
    bench_range_search,
    bench_churn
);
criterion_main!(benches);
