// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node arena: slotted storage with a free list for recycling.

use alloc::vec::Vec;

use crate::types::{Aabb2D, Item, Scalar};

/// Index of a node slot in the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeIdx(usize);

impl NodeIdx {
    pub(crate) const fn new(i: usize) -> Self {
        Self(i)
    }

    pub(crate) const fn get(self) -> usize {
        self.0
    }
}

/// A tree node. Leaves (height 1) hold items; interior nodes hold child
/// node indices. The bounding box is cached and kept exactly equal to the
/// union of the children's boxes.
pub(crate) struct Node<T, P> {
    pub(crate) bbox: Aabb2D<T>,
    pub(crate) height: usize,
    pub(crate) children: Children<T, P>,
}

/// Tagged child list; the traversals branch on it on every hop.
pub(crate) enum Children<T, P> {
    Nodes(Vec<NodeIdx>),
    Items(Vec<Item<T, P>>),
}

impl<T, P> Children<T, P> {
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Nodes(nodes) => nodes.len(),
            Self::Items(items) => items.len(),
        }
    }
}

impl<T, P> Node<T, P> {
    pub(crate) fn is_leaf(&self) -> bool {
        self.height == 1
    }
}

impl<T: Scalar, P> Node<T, P> {
    /// A leaf with no items, the shape of an empty tree's root.
    pub(crate) fn empty_leaf() -> Self {
        Self {
            bbox: Aabb2D::empty(),
            height: 1,
            children: Children::Items(Vec::new()),
        }
    }
}

/// Owns every node of one tree. Freed slots are recycled across splits and
/// condensations rather than returned to the allocator.
pub(crate) struct Arena<T, P> {
    slots: Vec<Option<Node<T, P>>>,
    free_list: Vec<usize>,
}

impl<T, P> Arena<T, P> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<T, P>) -> NodeIdx {
        if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = Some(node);
            NodeIdx::new(idx)
        } else {
            self.slots.push(Some(node));
            NodeIdx::new(self.slots.len() - 1)
        }
    }

    /// Release a slot and return the node that occupied it.
    pub(crate) fn free(&mut self, idx: NodeIdx) -> Node<T, P> {
        let node = self.slots[idx.get()].take().expect("double free of a node slot");
        self.free_list.push(idx.get());
        node
    }

    pub(crate) fn node(&self, idx: NodeIdx) -> &Node<T, P> {
        self.slots[idx.get()].as_ref().expect("stale node index")
    }

    pub(crate) fn node_mut(&mut self, idx: NodeIdx) -> &mut Node<T, P> {
        self.slots[idx.get()].as_mut().expect("stale node index")
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Number of live nodes.
    pub(crate) fn alive(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_free_recycles_slots() {
        let mut arena: Arena<f64, u32> = Arena::new();
        let a = arena.alloc(Node::empty_leaf());
        let b = arena.alloc(Node::empty_leaf());
        assert_ne!(a, b);
        assert_eq!(arena.alive(), 2);

        arena.free(a);
        assert_eq!(arena.alive(), 1);

        let c = arena.alloc(Node::empty_leaf());
        assert_eq!(c, a);
        assert_eq!(arena.alive(), 2);
    }

    #[test]
    fn freed_node_is_returned_intact() {
        let mut arena: Arena<f64, u32> = Arena::new();
        let idx = arena.alloc(Node {
            bbox: Aabb2D::new(1.0, 2.0, 3.0, 4.0),
            height: 1,
            children: Children::Items(alloc::vec![Item::new(1.0, 2.0, 3.0, 4.0, 7_u32)]),
        });
        let node = arena.free(idx);
        assert_eq!(node.bbox, Aabb2D::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(node.children.len(), 1);
    }
}
