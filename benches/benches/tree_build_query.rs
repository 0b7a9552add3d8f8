// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bramble::{Aabb2D, Item, RTree};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn gen_grid_items(n: usize, cell: f64) -> Vec<Item<f64, u32>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Grid payloads stay well inside u32."
            )]
            out.push(Item::new(x0, y0, x0 + cell, y0 + cell, (y * n + x) as u32));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1_u64 << 53) as f64)
    }
}

fn gen_random_items(count: usize, world: f64, size: f64) -> Vec<Item<f64, u32>> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for i in 0..count {
        let x0 = rng.next_f64() * (world - size);
        let y0 = rng.next_f64() * (world - size);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Benchmark payloads stay well inside u32."
        )]
        out.push(Item::new(x0, y0, x0 + size, y0 + size, i as u32));
    }
    out
}

fn flatten(items: &[Item<f64, u32>]) -> (Vec<f64>, Vec<u32>) {
    let mut coords = Vec::with_capacity(items.len() * 4);
    let mut payloads = Vec::with_capacity(items.len());
    for item in items {
        coords.extend_from_slice(&[item.min_x, item.min_y, item.max_x, item.max_y]);
        payloads.push(item.payload);
    }
    (coords, payloads)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[64_usize, 128] {
        let items = gen_grid_items(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("insert_n{}", n), |b| {
            b.iter_batched(
                || items.clone(),
                |items| {
                    let mut tree = RTree::new();
                    for item in items {
                        tree.insert(item);
                    }
                    black_box(tree.len());
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("bulk_n{}", n), |b| {
            b.iter_batched(
                || items.clone(),
                |items| {
                    let mut tree = RTree::new();
                    tree.load(items);
                    black_box(tree.len());
                },
                BatchSize::SmallInput,
            )
        });

        let (coords, payloads) = flatten(&items);
        group.bench_function(format!("bulk_hybrid_n{}", n), |b| {
            b.iter_batched(
                || (coords.clone(), payloads.clone()),
                |(coords, payloads)| {
                    let mut tree = RTree::new();
                    tree.load_hybrid(&coords, payloads);
                    black_box(tree.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    for &count in &[10_000_usize, 100_000] {
        let items = gen_random_items(count, 10_000.0, 40.0);
        let mut tree = RTree::new();
        tree.load(items);

        let window = Aabb2D::new(1000.0, 1000.0, 2000.0, 2000.0);
        let needle = Aabb2D::new(5000.0, 5000.0, 5001.0, 5001.0);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("search_window_n{}", count), |b| {
            b.iter(|| black_box(tree.search(black_box(window)).len()))
        });
        group.bench_function(format!("collides_n{}", count), |b| {
            b.iter(|| black_box(tree.collides(black_box(needle))))
        });
        group.bench_function(format!("all_n{}", count), |b| {
            b.iter(|| black_box(tree.all().len()))
        });
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");
    let count = 10_000_usize;
    let items = gen_random_items(count, 10_000.0, 40.0);
    group.throughput(Throughput::Elements((count / 2) as u64));
    group.bench_function("remove_half_n10000", |b| {
        b.iter_batched(
            || {
                let mut tree = RTree::new();
                tree.load(items.clone());
                (tree, items.clone())
            },
            |(mut tree, items)| {
                for item in items.iter().take(count / 2) {
                    tree.remove(item);
                }
                black_box(tree.len());
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_query, bench_remove);
criterion_main!(benches);
