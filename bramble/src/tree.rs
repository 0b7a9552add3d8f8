// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The R-tree: insertion heuristics, removal with condensation, queries.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::bulk;
use crate::node::{Arena, Children, Node, NodeIdx};
use crate::types::{
    Aabb2D, Item, Scalar, area, cmp_t, enlarged_area, intersection_area, margin, union_aabb,
};

/// Default maximum number of entries per node.
pub const DEFAULT_MAX_ENTRIES: usize = 9;

/// A dynamic 2D R-tree over axis-aligned rectangles with opaque payloads.
///
/// Nodes live in an index-keyed arena owned by the tree; freed slots are
/// recycled across splits and condensations. The root node exists even when
/// the tree is empty (a leaf with no items).
pub struct RTree<T: Scalar, P> {
    pub(crate) arena: Arena<T, P>,
    pub(crate) root: NodeIdx,
    pub(crate) max_entries: usize,
    pub(crate) min_entries: usize,
    pub(crate) item_count: usize,
}

/// One thing on its way into the tree: a fresh (or orphaned) item, or an
/// orphaned subtree detached during condensation.
enum Entry<T, P> {
    Item(Item<T, P>),
    Node(NodeIdx),
}

impl<T: Scalar, P> Default for RTree<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar, P> Debug for RTree<T, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RTree")
            .field("max_entries", &self.max_entries)
            .field("min_entries", &self.min_entries)
            .field("len", &self.item_count)
            .field("height", &self.arena.node(self.root).height)
            .field("arena_nodes", &self.arena.alive())
            .finish_non_exhaustive()
    }
}

impl<T: Scalar, P> RTree<T, P> {
    /// Create an empty tree with the default branching factor (9).
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Create an empty tree with at most `max_entries` children per node.
    ///
    /// Values below 4 are clamped to 4; the split heuristic needs room for
    /// two groups of at least two. The minimum fill is `max(2, ceil(0.4 * max))`.
    pub fn with_max_entries(max_entries: usize) -> Self {
        let max_entries = max_entries.max(4);
        let min_entries = ((max_entries * 2).div_ceil(5)).max(2);
        let mut arena = Arena::new();
        let root = arena.alloc(Node::empty_leaf());
        Self {
            arena,
            root,
            max_entries,
            min_entries,
            item_count: 0,
        }
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.item_count
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    /// Insert one item. Bounding boxes on the path to the chosen leaf are
    /// extended, and an overflowing node splits, possibly cascading to a new
    /// root.
    pub fn insert(&mut self, item: Item<T, P>) -> &mut Self {
        self.insert_entry(Entry::Item(item));
        self.item_count += 1;
        self
    }

    /// Remove the item whose payload equals `item.payload`. Silent no-op if
    /// no such item is stored.
    ///
    /// The item's bounding box guides the descent, so it must match the
    /// coordinates the item was stored with. For a custom match rule use
    /// [`remove_with`](RTree::remove_with).
    pub fn remove(&mut self, item: &Item<T, P>) -> &mut Self
    where
        P: PartialEq,
    {
        let bbox = item.bbox();
        self.remove_with(bbox, |payload| *payload == item.payload)
    }

    /// Remove the first item within `bbox` whose payload matches `eq`.
    /// Silent no-op when nothing matches.
    pub fn remove_with<F>(&mut self, bbox: Aabb2D<T>, mut eq: F) -> &mut Self
    where
        F: FnMut(&P) -> bool,
    {
        let mut orphans = Vec::new();
        if self.remove_at(self.root, &bbox, &mut eq, &mut orphans) {
            self.item_count -= 1;
            // Orphans re-enter at the level their height dictates; leaves
            // keep a uniform depth.
            for orphan in orphans {
                self.insert_entry(orphan);
            }
            self.shrink_root();
        }
        self
    }

    /// Every stored item whose bounding box intersects `bbox`, in traversal
    /// order. Intersection is edge-inclusive.
    pub fn search(&self, bbox: Aabb2D<T>) -> Vec<&Item<T, P>> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = self.arena.node(idx);
            if !node.bbox.intersects(&bbox) {
                continue;
            }
            match &node.children {
                Children::Items(items) => {
                    for item in items {
                        if item.bbox().intersects(&bbox) {
                            out.push(item);
                        }
                    }
                }
                Children::Nodes(nodes) => {
                    for &child in nodes {
                        let child_bbox = &self.arena.node(child).bbox;
                        if !child_bbox.intersects(&bbox) {
                            continue;
                        }
                        if bbox.contains(child_bbox) {
                            // The whole subtree is inside the query; skip
                            // the per-rectangle tests below it.
                            self.collect_subtree(child, &mut out);
                        } else {
                            stack.push(child);
                        }
                    }
                }
            }
        }
        out
    }

    /// Whether any stored item's bounding box intersects `bbox`. Stops at
    /// the first hit.
    pub fn collides(&self, bbox: Aabb2D<T>) -> bool {
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = self.arena.node(idx);
            if !node.bbox.intersects(&bbox) {
                continue;
            }
            match &node.children {
                Children::Items(items) => {
                    if items.iter().any(|item| item.bbox().intersects(&bbox)) {
                        return true;
                    }
                }
                Children::Nodes(nodes) => {
                    for &child in nodes {
                        let child_bbox = &self.arena.node(child).bbox;
                        if child_bbox.intersects(&bbox) {
                            // A non-root node always covers at least one item.
                            if bbox.contains(child_bbox) {
                                return true;
                            }
                            stack.push(child);
                        }
                    }
                }
            }
        }
        false
    }

    /// Every stored item, in traversal order.
    pub fn all(&self) -> Vec<&Item<T, P>> {
        let mut out = Vec::new();
        self.collect_subtree(self.root, &mut out);
        out
    }

    /// Reset to the empty tree, releasing all node storage.
    pub fn clear(&mut self) -> &mut Self {
        self.arena.clear();
        self.root = self.arena.alloc(Node::empty_leaf());
        self.item_count = 0;
        self
    }

    /// Insert a batch of items.
    ///
    /// A batch at least as large as the current tree triggers a wholesale
    /// packed rebuild (existing items plus the batch) via the bulk loader;
    /// a smaller batch, or one below the minimum fill, falls back to
    /// one-by-one insertion. Either way every previously stored item is
    /// retained.
    pub fn load(&mut self, batch: Vec<Item<T, P>>) -> &mut Self
    where
        P: Clone,
    {
        if batch.is_empty() {
            return self;
        }
        if batch.len() < self.min_entries || self.item_count > batch.len() {
            for item in batch {
                self.insert(item);
            }
            return self;
        }
        let mut items = self.take_items();
        items.extend(batch);
        self.rebuild(items)
    }

    /// Insert a batch given as a flat coordinate buffer plus parallel
    /// payloads.
    ///
    /// `coords` is laid out `[min_x0, min_y0, max_x0, max_y0, min_x1, ...]`
    /// and must hold four values per payload. Sort keys during packing are
    /// read from the buffer copy, never through caller objects. The load
    /// policy is the same as [`load`](RTree::load).
    pub fn load_hybrid(&mut self, coords: &[T], payloads: Vec<P>) -> &mut Self
    where
        P: Clone,
    {
        debug_assert_eq!(
            coords.len(),
            payloads.len() * 4,
            "coordinate buffer must hold exactly four values per payload"
        );
        let batch: Vec<Item<T, P>> = coords
            .chunks_exact(4)
            .zip(payloads)
            .map(|(c, payload)| Item::new(c[0], c[1], c[2], c[3], payload))
            .collect();
        self.load(batch)
    }

    fn rebuild(&mut self, mut items: Vec<Item<T, P>>) -> &mut Self
    where
        P: Clone,
    {
        self.item_count = items.len();
        self.arena.clear();
        self.root = bulk::build(&mut self.arena, &mut items, self.max_entries);
        self
    }

    /// Drain every stored item, freeing all nodes along the way.
    fn take_items(&mut self) -> Vec<Item<T, P>> {
        let mut out = Vec::with_capacity(self.item_count);
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            match self.arena.free(idx).children {
                Children::Items(items) => out.extend(items),
                Children::Nodes(nodes) => stack.extend(nodes),
            }
        }
        out
    }

    fn collect_subtree<'a>(&'a self, idx: NodeIdx, out: &mut Vec<&'a Item<T, P>>) {
        let mut stack = vec![idx];
        while let Some(idx) = stack.pop() {
            match &self.arena.node(idx).children {
                Children::Items(items) => out.extend(items.iter()),
                Children::Nodes(nodes) => stack.extend(nodes.iter().copied()),
            }
        }
    }

    fn entry_bbox(&self, entry: &Entry<T, P>) -> Aabb2D<T> {
        match entry {
            Entry::Item(item) => item.bbox(),
            Entry::Node(idx) => self.arena.node(*idx).bbox,
        }
    }

    /// Height of the node that should receive this entry as a direct child.
    fn entry_parent_height(&self, entry: &Entry<T, P>) -> usize {
        match entry {
            Entry::Item(_) => 1,
            Entry::Node(idx) => self.arena.node(*idx).height + 1,
        }
    }

    fn insert_entry(&mut self, entry: Entry<T, P>) {
        let target = self.entry_parent_height(&entry);
        if let Some(sibling) = self.insert_at(self.root, entry, target) {
            self.grow_root(sibling);
        }
    }

    /// Descend to a node of height `target`, attach the entry there, and
    /// split on overflow. Returns the new right sibling when this node split.
    fn insert_at(&mut self, node_idx: NodeIdx, entry: Entry<T, P>, target: usize) -> Option<NodeIdx> {
        let bbox = self.entry_bbox(&entry);
        self.arena.node_mut(node_idx).bbox.extend(&bbox);

        if self.arena.node(node_idx).height == target {
            match (entry, &mut self.arena.node_mut(node_idx).children) {
                (Entry::Item(item), Children::Items(items)) => items.push(item),
                (Entry::Node(idx), Children::Nodes(nodes)) => nodes.push(idx),
                _ => unreachable!("entry height does not match node kind"),
            }
            if self.arena.node(node_idx).children.len() > self.max_entries {
                return Some(self.split(node_idx));
            }
            return None;
        }

        let best = self.choose_subtree(node_idx, &bbox);
        let child_idx = match &self.arena.node(node_idx).children {
            Children::Nodes(nodes) => nodes[best],
            Children::Items(_) => unreachable!("descent reached a leaf above the target height"),
        };
        if let Some(sibling) = self.insert_at(child_idx, entry, target) {
            match &mut self.arena.node_mut(node_idx).children {
                Children::Nodes(nodes) => nodes.push(sibling),
                Children::Items(_) => unreachable!("leaf cannot adopt a split sibling"),
            }
            if self.arena.node(node_idx).children.len() > self.max_entries {
                return Some(self.split(node_idx));
            }
        }
        None
    }

    /// Least-enlargement child, ties broken by least area.
    fn choose_subtree(&self, node_idx: NodeIdx, bbox: &Aabb2D<T>) -> usize {
        let Children::Nodes(children) = &self.arena.node(node_idx).children else {
            unreachable!("choose_subtree on a leaf")
        };
        let mut best_index = 0;
        let mut min_enlargement: Option<T::Acc> = None;
        let mut min_area: Option<T::Acc> = None;
        for (i, &child) in children.iter().enumerate() {
            let child_bbox = &self.arena.node(child).bbox;
            let child_area = area(child_bbox);
            let enlargement = enlarged_area(child_bbox, bbox) - child_area;
            match min_enlargement.map(|best| cmp_t(enlargement, best)) {
                None | Some(Ordering::Less) => {
                    min_enlargement = Some(enlargement);
                    min_area = Some(match min_area {
                        Some(best) if cmp_t(best, child_area) != Ordering::Greater => best,
                        _ => child_area,
                    });
                    best_index = i;
                }
                Some(Ordering::Equal) => {
                    if min_area
                        .map(|best| cmp_t(child_area, best) == Ordering::Less)
                        .unwrap_or(true)
                    {
                        min_area = Some(child_area);
                        best_index = i;
                    }
                }
                Some(Ordering::Greater) => {}
            }
        }
        best_index
    }

    /// Split an overflowing node in two; returns the new right sibling.
    fn split(&mut self, node_idx: NodeIdx) -> NodeIdx {
        let height = self.arena.node(node_idx).height;
        let children = core::mem::replace(
            &mut self.arena.node_mut(node_idx).children,
            Children::Items(Vec::new()),
        );
        match children {
            Children::Items(items) => {
                let (left, right, left_bbox, right_bbox) =
                    split_entries(items, self.min_entries, |item| item.bbox());
                let node = self.arena.node_mut(node_idx);
                node.children = Children::Items(left);
                node.bbox = left_bbox;
                self.arena.alloc(Node {
                    bbox: right_bbox,
                    height,
                    children: Children::Items(right),
                })
            }
            Children::Nodes(nodes) => {
                let pairs: Vec<(NodeIdx, Aabb2D<T>)> = nodes
                    .into_iter()
                    .map(|idx| (idx, self.arena.node(idx).bbox))
                    .collect();
                let (left, right, left_bbox, right_bbox) =
                    split_entries(pairs, self.min_entries, |(_, bbox)| *bbox);
                let node = self.arena.node_mut(node_idx);
                node.children = Children::Nodes(left.into_iter().map(|(idx, _)| idx).collect());
                node.bbox = left_bbox;
                self.arena.alloc(Node {
                    bbox: right_bbox,
                    height,
                    children: Children::Nodes(right.into_iter().map(|(idx, _)| idx).collect()),
                })
            }
        }
    }

    fn grow_root(&mut self, sibling: NodeIdx) {
        let old_root = self.root;
        let height = self.arena.node(old_root).height + 1;
        let bbox = union_aabb(
            self.arena.node(old_root).bbox,
            self.arena.node(sibling).bbox,
        );
        self.root = self.arena.alloc(Node {
            bbox,
            height,
            children: Children::Nodes(vec![old_root, sibling]),
        });
    }

    /// Descend into children that contain `bbox`, unlink the first matching
    /// item, and condense underfull nodes on the way back up.
    fn remove_at(
        &mut self,
        node_idx: NodeIdx,
        bbox: &Aabb2D<T>,
        eq: &mut impl FnMut(&P) -> bool,
        orphans: &mut Vec<Entry<T, P>>,
    ) -> bool {
        if self.arena.node(node_idx).is_leaf() {
            let node = self.arena.node_mut(node_idx);
            let Children::Items(items) = &mut node.children else {
                unreachable!("leaf without items")
            };
            let Some(pos) = items.iter().position(|item| eq(&item.payload)) else {
                return false;
            };
            items.remove(pos);
            self.recalc_bbox(node_idx);
            return true;
        }

        let children: Vec<NodeIdx> = match &self.arena.node(node_idx).children {
            Children::Nodes(nodes) => nodes.clone(),
            Children::Items(_) => unreachable!(),
        };
        for (pos, child) in children.into_iter().enumerate() {
            if !self.arena.node(child).bbox.contains(bbox) {
                continue;
            }
            if !self.remove_at(child, bbox, eq, orphans) {
                continue;
            }
            if self.arena.node(child).children.len() < self.min_entries {
                self.detach_child(node_idx, pos, orphans);
            }
            self.recalc_bbox(node_idx);
            return true;
        }
        false
    }

    /// Unlink the child at `pos` and hand its children over for reinsertion.
    fn detach_child(&mut self, parent: NodeIdx, pos: usize, orphans: &mut Vec<Entry<T, P>>) {
        let child = {
            let Children::Nodes(nodes) = &mut self.arena.node_mut(parent).children else {
                unreachable!("detach from a leaf")
            };
            nodes.remove(pos)
        };
        match self.arena.free(child).children {
            Children::Items(items) => orphans.extend(items.into_iter().map(Entry::Item)),
            Children::Nodes(nodes) => orphans.extend(nodes.into_iter().map(Entry::Node)),
        }
    }

    /// An interior root with a single child hands the root role down.
    fn shrink_root(&mut self) {
        let promote = match &self.arena.node(self.root).children {
            Children::Nodes(nodes) if nodes.len() == 1 => Some(nodes[0]),
            _ => None,
        };
        if let Some(child) = promote {
            self.arena.free(self.root);
            self.root = child;
        }
    }

    pub(crate) fn recalc_bbox(&mut self, node_idx: NodeIdx) {
        let mut bbox = Aabb2D::empty();
        match &self.arena.node(node_idx).children {
            Children::Items(items) => {
                for item in items {
                    bbox.extend(&item.bbox());
                }
            }
            Children::Nodes(nodes) => {
                for &child in nodes {
                    bbox.extend(&self.arena.node(child).bbox);
                }
            }
        }
        self.arena.node_mut(node_idx).bbox = bbox;
    }
}

/// Split an overfull child list into two groups.
///
/// Axis choice minimises the total margin over every candidate distribution;
/// the split index then minimises overlap area, ties broken by total area.
/// Candidate group boxes come from prefix/suffix union arrays, evaluated in
/// O(n) per axis.
fn split_entries<T: Scalar, E>(
    mut entries: Vec<E>,
    min_entries: usize,
    bbox_of: impl Fn(&E) -> Aabb2D<T>,
) -> (Vec<E>, Vec<E>, Aabb2D<T>, Aabb2D<T>) {
    let count = entries.len();
    debug_assert!(count >= 2 * min_entries, "split needs two full groups");

    entries.sort_by(|a, b| cmp_t(bbox_of(a).min_x, bbox_of(b).min_x));
    let (prefix, suffix) = union_arrays(&entries, &bbox_of);
    let margin_x = dist_margin_sum::<T>(&prefix, &suffix, min_entries);

    entries.sort_by(|a, b| cmp_t(bbox_of(a).min_y, bbox_of(b).min_y));
    let (prefix, suffix) = union_arrays(&entries, &bbox_of);
    let margin_y = dist_margin_sum::<T>(&prefix, &suffix, min_entries);

    let (prefix, suffix) = if cmp_t(margin_x, margin_y) == Ordering::Less {
        entries.sort_by(|a, b| cmp_t(bbox_of(a).min_x, bbox_of(b).min_x));
        union_arrays(&entries, &bbox_of)
    } else {
        (prefix, suffix)
    };

    let split_index = choose_split_index::<T>(&prefix, &suffix, min_entries);
    let right = entries.split_off(split_index);
    let left_bbox = prefix[split_index - 1];
    let right_bbox = suffix[split_index];
    (entries, right, left_bbox, right_bbox)
}

/// Running unions from the front and from the back. `prefix[i]` covers
/// entries `0..=i`, `suffix[i]` covers `i..`.
fn union_arrays<T: Scalar, E>(
    entries: &[E],
    bbox_of: impl Fn(&E) -> Aabb2D<T>,
) -> (Vec<Aabb2D<T>>, Vec<Aabb2D<T>>) {
    let count = entries.len();
    let mut prefix = Vec::with_capacity(count);
    let mut acc = Aabb2D::empty();
    for entry in entries {
        acc.extend(&bbox_of(entry));
        prefix.push(acc);
    }
    let mut suffix = Vec::with_capacity(count);
    let mut acc = Aabb2D::empty();
    for entry in entries.iter().rev() {
        acc.extend(&bbox_of(entry));
        suffix.push(acc);
    }
    suffix.reverse();
    (prefix, suffix)
}

/// Total margin of both groups across every candidate split point.
fn dist_margin_sum<T: Scalar>(
    prefix: &[Aabb2D<T>],
    suffix: &[Aabb2D<T>],
    min_entries: usize,
) -> T::Acc {
    let count = prefix.len();
    let mut total = margin(&prefix[min_entries - 1]);
    for group in &prefix[min_entries..count - min_entries] {
        total = total + margin(group);
    }
    total = total + margin(&suffix[count - min_entries]);
    for group in &suffix[min_entries..count - min_entries] {
        total = total + margin(group);
    }
    total
}

/// Split point with least overlap between the groups, ties broken by least
/// total area.
fn choose_split_index<T: Scalar>(
    prefix: &[Aabb2D<T>],
    suffix: &[Aabb2D<T>],
    min_entries: usize,
) -> usize {
    let count = prefix.len();
    let mut best_index = count - min_entries;
    let mut min_overlap: Option<T::Acc> = None;
    let mut min_area: Option<T::Acc> = None;
    for k in min_entries..=count - min_entries {
        let left = &prefix[k - 1];
        let right = &suffix[k];
        let overlap = intersection_area(left, right);
        let total_area = area(left) + area(right);
        match min_overlap.map(|best| cmp_t(overlap, best)) {
            None | Some(Ordering::Less) => {
                min_overlap = Some(overlap);
                min_area = Some(match min_area {
                    Some(best) if cmp_t(best, total_area) != Ordering::Greater => best,
                    _ => total_area,
                });
                best_index = k;
            }
            Some(Ordering::Equal) => {
                if min_area
                    .map(|best| cmp_t(total_area, best) == Ordering::Less)
                    .unwrap_or(true)
                {
                    min_area = Some(total_area);
                    best_index = k;
                }
            }
            Some(Ordering::Greater) => {}
        }
    }
    best_index
}
