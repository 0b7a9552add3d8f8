// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed bulk loading: overlap-minimising top-down tiling (OMT).
//!
//! Items are partitioned into vertical slices by `min_x`, each slice into
//! runs by `min_y`, using partial sorts (`select_nth_unstable_by`) so a full
//! sort is never paid. Each run packs into one subtree; interior levels are
//! emitted bottom-up with exact bounding boxes.

use alloc::vec;
use alloc::vec::Vec;

use crate::node::{Arena, Children, Node, NodeIdx};
use crate::types::{Aabb2D, Item, Scalar, cmp_t};

#[derive(Copy, Clone)]
enum Axis {
    X,
    Y,
}

/// Build a packed tree over `items` and return its root. The arena is
/// assumed empty; interior storage is reserved up front.
pub(crate) fn build<T: Scalar, P: Clone>(
    arena: &mut Arena<T, P>,
    items: &mut [Item<T, P>],
    max_entries: usize,
) -> NodeIdx {
    let n = items.len();
    debug_assert!(n > 0, "bulk build needs at least one item");
    arena.reserve(node_budget(n, max_entries));
    build_range(arena, items, 0, n - 1, 0, max_entries)
}

/// Pack `items[left..=right]` into a subtree. `height == 0` marks the root
/// call, which computes the target height and widens the root fan-out so
/// the lower levels come out full.
fn build_range<T: Scalar, P: Clone>(
    arena: &mut Arena<T, P>,
    items: &mut [Item<T, P>],
    left: usize,
    right: usize,
    height: usize,
    max_entries: usize,
) -> NodeIdx {
    let n = right - left + 1;

    if n <= max_entries {
        let children = items[left..=right].to_vec();
        let mut bbox = Aabb2D::empty();
        for item in &children {
            bbox.extend(&item.bbox());
        }
        return arena.alloc(Node {
            bbox,
            height: 1,
            children: Children::Items(children),
        });
    }

    let (target_height, fanout) = if height == 0 {
        let target = ceil_log(n, max_entries);
        let subtree_capacity = saturating_pow(max_entries, target - 1);
        (target, n.div_ceil(subtree_capacity))
    } else {
        (height, max_entries)
    };

    let group = n.div_ceil(fanout);
    let slice = group * ceil_sqrt(fanout);

    multi_select(items, left, right, slice, Axis::X);

    let mut children = Vec::with_capacity(fanout);
    let mut i = left;
    while i <= right {
        let slice_right = core::cmp::min(i + slice - 1, right);
        multi_select(items, i, slice_right, group, Axis::Y);

        let mut j = i;
        while j <= slice_right {
            let group_right = core::cmp::min(j + group - 1, slice_right);
            children.push(build_range(
                arena,
                items,
                j,
                group_right,
                target_height - 1,
                max_entries,
            ));
            j += group;
        }
        i += slice;
    }

    let mut bbox = Aabb2D::empty();
    for &child in &children {
        bbox.extend(&arena.node(child).bbox);
    }
    arena.alloc(Node {
        bbox,
        height: target_height,
        children: Children::Nodes(children),
    })
}

/// Partially sort `items[left..=right]` so that every `n`-aligned boundary
/// sits at its sorted position, leaving the runs between boundaries
/// unordered.
fn multi_select<T: Scalar, P>(
    items: &mut [Item<T, P>],
    left: usize,
    right: usize,
    n: usize,
    axis: Axis,
) {
    let mut stack = vec![(left, right)];
    while let Some((l, r)) = stack.pop() {
        if r - l <= n {
            continue;
        }
        let mid = l + (r - l).div_ceil(2 * n) * n;
        let slice = &mut items[l..=r];
        let target = mid - l;
        match axis {
            Axis::X => {
                let _ = slice.select_nth_unstable_by(target, |a, b| cmp_t(a.min_x, b.min_x));
            }
            Axis::Y => {
                let _ = slice.select_nth_unstable_by(target, |a, b| cmp_t(a.min_y, b.min_y));
            }
        }
        stack.push((l, mid));
        stack.push((mid, r));
    }
}

/// Smallest `h` with `base^h >= n`.
fn ceil_log(n: usize, base: usize) -> usize {
    let mut height = 1;
    let mut capacity = base;
    while capacity < n {
        capacity = capacity.saturating_mul(base);
        height += 1;
    }
    height
}

fn saturating_pow(base: usize, exp: usize) -> usize {
    let mut out = 1_usize;
    for _ in 0..exp {
        out = out.saturating_mul(base);
    }
    out
}

/// Smallest `s` with `s * s >= n`.
fn ceil_sqrt(n: usize) -> usize {
    let mut s = 1_usize;
    while s * s < n {
        s += 1;
    }
    s
}

/// Upper bound on the node count of a packed tree, for the arena reserve.
fn node_budget(n: usize, max_entries: usize) -> usize {
    let mut total = 1;
    let mut level = n.div_ceil(max_entries);
    while level > 1 {
        total += level;
        level = level.div_ceil(max_entries);
    }
    total + 1
}
