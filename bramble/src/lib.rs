// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bramble: a dynamic 2D R-tree over axis-aligned boxes.
//!
//! Bramble is a reusable building block for spatial queries over many
//! rectangles: viewport culling, broad-phase collision candidates, map
//! feature lookup.
//!
//! - Insert and remove [`Item`]s (a bounding box plus an opaque payload).
//! - Query by intersecting rectangle with [`RTree::search`], or probe with
//!   the short-circuiting [`RTree::collides`].
//! - Build from a large batch in one packed pass with [`RTree::load`] or
//!   the flat-buffer variant [`RTree::load_hybrid`].
//! - Snapshot and restore the exact tree shape with [`RTree::to_data`] /
//!   [`RTree::from_data`], or through serde.
//!
//! It is generic over the scalar type `T` and does not depend on any
//! geometry crate; higher layers compute world-space boxes and feed them
//! here. Insertion uses least-enlargement subtree choice with a
//! margin/overlap-minimising split; deletion condenses underfull nodes and
//! reinserts their entries at the height they came from; bulk loads pack
//! the tree bottom-up with sort-tile-recursive slicing.
//!
//! # Example
//!
//! ```rust
//! use bramble::{Aabb2D, Item, RTree};
//!
//! let mut tree: RTree<f64, &str> = RTree::new();
//! tree.insert(Item::new(0.0, 0.0, 10.0, 10.0, "a"))
//!     .insert(Item::new(20.0, 20.0, 30.0, 30.0, "b"));
//!
//! let hits = tree.search(Aabb2D::new(5.0, 5.0, 25.0, 25.0));
//! assert_eq!(hits.len(), 2);
//!
//! tree.remove(&Item::new(0.0, 0.0, 10.0, 10.0, "a"));
//! assert!(!tree.collides(Aabb2D::new(0.0, 0.0, 10.0, 10.0)));
//! ```
//!
//! Bulk loading replaces incremental insertion when the batch dominates the
//! tree:
//!
//! ```rust
//! use bramble::{Aabb2D, Item, RTree};
//!
//! let batch: Vec<Item<f64, u32>> = (0..1000)
//!     .map(|i| {
//!         let x = f64::from(i % 100);
//!         let y = f64::from(i / 100);
//!         Item::new(x, y, x + 0.5, y + 0.5, i)
//!     })
//!     .collect();
//!
//! let mut tree = RTree::new();
//! tree.load(batch);
//! assert_eq!(tree.len(), 1000);
//! assert_eq!(tree.search(Aabb2D::new(0.0, 0.0, 100.0, 10.0)).len(), 1000);
//! ```
//!
//! ## Ownership and lifetime
//!
//! The tree owns its node storage outright and stores payloads verbatim;
//! queries hand back references to the stored items. Dropping the tree (or
//! calling [`RTree::clear`]) releases everything — there is no separate
//! destroy step, and a freed tree cannot be used again by construction.
//!
//! ## Scalars and float semantics
//!
//! Coordinates may be `f32`, `f64`, or `i64` (the [`Scalar`] trait).
//! Heuristic metrics run in a widened accumulator type (`f32`→`f64`,
//! `i64`→`i128`) so area comparisons stay robust. Float coordinates are
//! assumed finite: no NaNs, and infinities only as the internal sentinel of
//! the empty box. Debug builds may assert.
//!
//! A degenerate box (zero width or height) is a valid item and still
//! intersects queries that touch it; intersection is edge-inclusive. An
//! inverted box is stored as-is and queried consistently with its stored
//! coordinates, but tree-quality heuristics treat its extent as zero.

#![no_std]

extern crate alloc;

mod bulk;
mod node;

pub mod data;
pub mod tree;
pub mod types;

pub use data::{ChildrenData, DataError, NodeData};
pub use tree::{DEFAULT_MAX_ENTRIES, RTree};
pub use types::{Aabb2D, Item, Scalar, area};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn readme_flow() {
        let mut tree: RTree<f64, u32> = RTree::new();
        for i in 0..20 {
            let x = f64::from(i) * 2.0;
            tree.insert(Item::new(x, 0.0, x + 1.0, 1.0, i));
        }
        let hits: Vec<u32> = tree
            .search(Aabb2D::new(0.0, 0.0, 10.0, 1.0))
            .iter()
            .map(|item| item.payload)
            .collect();
        assert_eq!(hits.len(), 6);

        let data = tree.to_data();
        let mut restored: RTree<f64, u32> = RTree::new();
        restored.from_data(data).unwrap();
        assert_eq!(restored.len(), 20);
    }
}
