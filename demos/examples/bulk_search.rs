// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bulk loading and searching.
//!
//! Pack ten thousand rectangles in one pass, run a window query and a
//! collision probe, then remove a few items.
//!
//! Run:
//! - `cargo run -p bramble_demos --example bulk_search`

use bramble::{Aabb2D, Item, RTree};

fn main() {
    // A jittered grid of 100x100 boxes.
    let items: Vec<Item<f64, u32>> = (0..10_000_u32)
        .map(|i| {
            let x = f64::from(i % 100) * 10.0 + f64::from(i % 7) * 0.3;
            let y = f64::from(i / 100) * 10.0 + f64::from(i % 5) * 0.4;
            Item::new(x, y, x + 8.0, y + 8.0, i)
        })
        .collect();

    let mut tree = RTree::new();
    tree.load(items);
    println!("loaded: {:?}", tree);

    // Everything inside a 200x200 window.
    let window = Aabb2D::new(400.0, 400.0, 600.0, 600.0);
    let hits = tree.search(window);
    println!("window hits: {}", hits.len());

    // Probe a gap between boxes.
    let gap = Aabb2D::new(8.5, 8.5, 9.5, 9.5);
    println!("gap collides: {}", tree.collides(gap));

    // Remove the first row and count again.
    for i in 0..100_u32 {
        let x = f64::from(i) * 10.0 + f64::from(i % 7) * 0.3;
        let y = f64::from(i % 5) * 0.4;
        tree.remove(&Item::new(x, y, x + 8.0, y + 8.0, i));
    }
    println!("after removal: {} items", tree.len());
    assert_eq!(tree.len(), 9_900);
}
