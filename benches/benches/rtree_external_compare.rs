// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use bramble::{Aabb2D, Item, RTree as BrambleTree};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

use rstar::primitives::Rectangle;
use rstar::{AABB, RTree};

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

fn to_rstar_rects(v: &[Item<f64, u32>]) -> Vec<Rectangle<[f64; 2]>> {
    v.iter()
        .map(|r| Rectangle::from_corners([r.min_x, r.min_y], [r.max_x, r.max_y]))
        .collect()
}

fn bench_rtree_external_compare_f64(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_external_compare_f64");
    for &n in &[64_usize, 128] {
        let items = gen_grid_items(n, 10.0);
        let query = Aabb2D::new(100.0, 100.0, 500.0, 500.0);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("bramble_build_query_n{}", n), |b| {
            b.iter_batched(
                || items.clone(),
                |items| {
                    let mut tree = BrambleTree::new();
                    for item in items {
                        tree.insert(item);
                    }
                    let hits = tree.search(query).len();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("bramble_build_query_bulk_n{}", n), |b| {
            b.iter_batched(
                || items.clone(),
                |items| {
                    let mut tree = BrambleTree::new();
                    tree.load(items);
                    let hits = tree.search(query).len();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_bulk_n{}", n), |b| {
            b.iter_batched(
                || to_rstar_rects(&items),
                |rectangles| {
                    let tree = RTree::bulk_load(rectangles);
                    let aabb = AABB::from_corners(
                        [query.min_x, query.min_y],
                        [query.max_x, query.max_y],
                    );
                    let hits: usize = tree.locate_in_envelope_intersecting(&aabb).count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rtree_external_compare_f64);
criterion_main!(benches);
