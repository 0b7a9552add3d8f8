// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport culling with kurbo geometry.
//!
//! Upstream code that works in `kurbo::Rect` can feed the tree by spreading
//! corners; queries come back as payload handles for the visible set.
//!
//! Run:
//! - `cargo run -p bramble_demos --example viewport_cull`

use bramble::{Aabb2D, Item, RTree};
use kurbo::Rect;

fn to_item(rect: Rect, id: u32) -> Item<f64, u32> {
    Item::new(rect.x0, rect.y0, rect.x1, rect.y1, id)
}

fn to_query(rect: Rect) -> Aabb2D<f64> {
    Aabb2D::new(rect.x0, rect.y0, rect.x1, rect.y1)
}

fn main() {
    // Rows of 50x20 widgets in a tall scrollable canvas.
    let mut tree: RTree<f64, u32> = RTree::new();
    let mut id = 0_u32;
    for row in 0..400 {
        for col in 0..8 {
            let rect = Rect::new(
                f64::from(col) * 60.0,
                f64::from(row) * 25.0,
                f64::from(col) * 60.0 + 50.0,
                f64::from(row) * 25.0 + 20.0,
            );
            tree.insert(to_item(rect, id));
            id += 1;
        }
    }

    // The viewport scrolled partway down the canvas.
    let viewport = Rect::new(0.0, 2000.0, 480.0, 2600.0);
    let visible = tree.search(to_query(viewport));
    println!("visible widgets: {} of {}", visible.len(), tree.len());

    // Rows 80 through 104 intersect the viewport, edge-touching rows included.
    assert_eq!(visible.len(), 8 * 25);
}
