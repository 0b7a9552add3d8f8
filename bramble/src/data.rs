// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plain-data form of a tree: a recursive node record, round-trippable
//! through serde.
//!
//! [`RTree::to_data`] snapshots the exact shape — cached bounding boxes,
//! heights, and per-leaf item order — and [`RTree::from_data`] rebuilds it
//! verbatim after a shape check. The tree also implements `Serialize` and
//! `Deserialize` through this record.
//!
//! An empty tree's root carries the inverted sentinel box, which for float
//! scalars means infinities; formats without an infinity encoding (JSON)
//! only round-trip non-empty trees for `f32`/`f64`. Integer scalars always
//! round-trip.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::node::{Arena, Children, Node, NodeIdx};
use crate::tree::RTree;
use crate::types::{Aabb2D, Item, Scalar};

/// One node of the serialised tree shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeData<T, P> {
    /// Minimum x of the node's cached bounding box.
    #[serde(rename = "minX")]
    pub min_x: T,
    /// Minimum y of the node's cached bounding box.
    #[serde(rename = "minY")]
    pub min_y: T,
    /// Maximum x of the node's cached bounding box.
    #[serde(rename = "maxX")]
    pub max_x: T,
    /// Maximum y of the node's cached bounding box.
    #[serde(rename = "maxY")]
    pub max_y: T,
    /// Node height; 1 is a leaf.
    pub height: usize,
    /// True iff `height == 1`.
    pub leaf: bool,
    /// Items at a leaf, node records otherwise.
    pub children: ChildrenData<T, P>,
}

/// Children of a serialised node: items under leaves, records elsewhere.
///
/// Serialised untagged; the two shapes are distinguished by their fields
/// (an item has a `payload`, a node record has `height` and `children`).
/// An empty sequence parses as `Nodes` and is normalised by the leaf flag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildrenData<T, P> {
    /// Child node records of an interior node.
    Nodes(Vec<NodeData<T, P>>),
    /// Items of a leaf.
    Items(Vec<Item<T, P>>),
}

/// Structural error raised when a [`NodeData`] record does not describe a
/// well-formed tree shape.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// A node claimed height zero; heights start at 1.
    #[error("node height must be at least 1")]
    ZeroHeight,
    /// The leaf flag disagrees with the node's height.
    #[error("leaf flag `{leaf}` does not match height {height}")]
    LeafFlag {
        /// The node's height.
        height: usize,
        /// The node's leaf flag.
        leaf: bool,
    },
    /// A leaf carried node records, or an interior node carried items.
    #[error("node at height {height} carries the wrong kind of children")]
    ChildKind {
        /// The offending node's height.
        height: usize,
    },
    /// A child's height is not exactly one below its parent's.
    #[error("child of height {child} under a node of height {parent}")]
    HeightStep {
        /// The parent's height.
        parent: usize,
        /// The child's height.
        child: usize,
    },
}

impl<T: Scalar, P> RTree<T, P> {
    /// Snapshot the tree shape as a plain-data record.
    pub fn to_data(&self) -> NodeData<T, P>
    where
        P: Clone,
    {
        self.node_data(self.root)
    }

    fn node_data(&self, idx: NodeIdx) -> NodeData<T, P>
    where
        P: Clone,
    {
        let node = self.arena.node(idx);
        let children = match &node.children {
            Children::Items(items) => ChildrenData::Items(items.clone()),
            Children::Nodes(nodes) => {
                ChildrenData::Nodes(nodes.iter().map(|&child| self.node_data(child)).collect())
            }
        };
        NodeData {
            min_x: node.bbox.min_x,
            min_y: node.bbox.min_y,
            max_x: node.bbox.max_x,
            max_y: node.bbox.max_y,
            height: node.height,
            leaf: node.height == 1,
            children,
        }
    }

    /// Replace this tree's contents with the given shape.
    ///
    /// Only the shape is checked (heights, leaf flags, child kinds); the
    /// record is otherwise trusted to satisfy the tree invariants, exactly
    /// as [`to_data`](RTree::to_data) emits them. On error the tree is left
    /// untouched.
    pub fn from_data(&mut self, data: NodeData<T, P>) -> Result<&mut Self, DataError> {
        validate(&data)?;
        let mut arena = Arena::new();
        let mut item_count = 0;
        let root = build_node(&mut arena, data, &mut item_count);
        self.arena = arena;
        self.root = root;
        self.item_count = item_count;
        Ok(self)
    }
}

fn validate<T, P>(data: &NodeData<T, P>) -> Result<(), DataError> {
    if data.height == 0 {
        return Err(DataError::ZeroHeight);
    }
    if data.leaf != (data.height == 1) {
        return Err(DataError::LeafFlag {
            height: data.height,
            leaf: data.leaf,
        });
    }
    match &data.children {
        ChildrenData::Items(_) if data.height == 1 => Ok(()),
        ChildrenData::Nodes(nodes) if nodes.is_empty() && data.height == 1 => Ok(()),
        ChildrenData::Nodes(nodes) if data.height > 1 => {
            for child in nodes {
                if child.height + 1 != data.height {
                    return Err(DataError::HeightStep {
                        parent: data.height,
                        child: child.height,
                    });
                }
                validate(child)?;
            }
            Ok(())
        }
        _ => Err(DataError::ChildKind {
            height: data.height,
        }),
    }
}

fn build_node<T: Scalar, P>(
    arena: &mut Arena<T, P>,
    data: NodeData<T, P>,
    item_count: &mut usize,
) -> NodeIdx {
    let bbox = Aabb2D::new(data.min_x, data.min_y, data.max_x, data.max_y);
    let children = match data.children {
        ChildrenData::Items(items) => {
            *item_count += items.len();
            Children::Items(items)
        }
        // An empty child list deserialises as `Nodes`; a validated leaf
        // normalises it back to items.
        ChildrenData::Nodes(nodes) if data.height == 1 => {
            debug_assert!(nodes.is_empty());
            Children::Items(Vec::new())
        }
        ChildrenData::Nodes(nodes) => Children::Nodes(
            nodes
                .into_iter()
                .map(|child| build_node(arena, child, item_count))
                .collect(),
        ),
    };
    arena.alloc(Node {
        bbox,
        height: data.height,
        children,
    })
}

impl<T, P> Serialize for RTree<T, P>
where
    T: Scalar + Serialize,
    P: Clone + Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_data().serialize(serializer)
    }
}

impl<'de, T, P> Deserialize<'de> for RTree<T, P>
where
    T: Scalar + Deserialize<'de>,
    P: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = NodeData::deserialize(deserializer)?;
        let mut tree = Self::new();
        tree.from_data(data).map_err(serde::de::Error::custom)?;
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec;

    fn sample_tree() -> RTree<f64, u32> {
        let mut tree = RTree::with_max_entries(4);
        for i in 0..50_u32 {
            let x = f64::from(i % 10) * 3.0;
            let y = f64::from(i / 10) * 3.0;
            tree.insert(Item::new(x, y, x + 2.0, y + 2.0, i));
        }
        tree
    }

    #[test]
    fn data_roundtrip_preserves_shape() {
        let tree = sample_tree();
        let data = tree.to_data();

        let mut restored: RTree<f64, u32> = RTree::with_max_entries(4);
        restored.from_data(data.clone()).unwrap();

        assert_eq!(restored.len(), tree.len());
        assert_eq!(restored.to_data(), data);

        let mut before: Vec<u32> = tree.all().iter().map(|item| item.payload).collect();
        let mut after: Vec<u32> = restored.all().iter().map(|item| item.payload).collect();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }

    #[test]
    fn json_roundtrip() {
        let tree = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let restored: RTree<f64, u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.to_data(), tree.to_data());
    }

    #[test]
    fn item_serialises_flat() {
        let item: Item<f64, String> = Item::new(1.0, 2.0, 3.0, 4.0, "x".into());
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(
            json,
            r#"{"minX":1.0,"minY":2.0,"maxX":3.0,"maxY":4.0,"payload":"x"}"#
        );
    }

    #[test]
    fn empty_tree_data_roundtrip() {
        let tree: RTree<i64, u32> = RTree::new();
        let data = tree.to_data();
        assert!(data.leaf);
        assert_eq!(data.height, 1);

        let mut restored: RTree<i64, u32> = RTree::new();
        restored.from_data(data.clone()).unwrap();
        assert!(restored.is_empty());
        assert_eq!(restored.to_data(), data);
    }

    #[test]
    fn rejects_zero_height() {
        let data: NodeData<f64, u32> = NodeData {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 1.0,
            max_y: 1.0,
            height: 0,
            leaf: true,
            children: ChildrenData::Items(vec![]),
        };
        let mut tree = RTree::new();
        assert_eq!(tree.from_data(data).unwrap_err(), DataError::ZeroHeight);
    }

    #[test]
    fn rejects_leaf_flag_mismatch() {
        let data: NodeData<f64, u32> = NodeData {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 1.0,
            max_y: 1.0,
            height: 2,
            leaf: true,
            children: ChildrenData::Nodes(vec![]),
        };
        let mut tree = RTree::new();
        assert!(matches!(
            tree.from_data(data).unwrap_err(),
            DataError::LeafFlag { height: 2, leaf: true }
        ));
    }

    #[test]
    fn rejects_bad_height_step() {
        let leaf = NodeData::<f64, u32> {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 1.0,
            max_y: 1.0,
            height: 1,
            leaf: true,
            children: ChildrenData::Items(vec![Item::new(0.0, 0.0, 1.0, 1.0, 1)]),
        };
        let data = NodeData {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 1.0,
            max_y: 1.0,
            height: 3,
            leaf: false,
            children: ChildrenData::Nodes(vec![leaf]),
        };
        let mut tree = RTree::new();
        assert!(matches!(
            tree.from_data(data).unwrap_err(),
            DataError::HeightStep { parent: 3, child: 1 }
        ));
    }

    #[test]
    fn failed_from_data_leaves_tree_untouched() {
        let mut tree = sample_tree();
        let before = tree.to_data();
        let bad: NodeData<f64, u32> = NodeData {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 1.0,
            max_y: 1.0,
            height: 0,
            leaf: true,
            children: ChildrenData::Items(vec![]),
        };
        assert!(tree.from_data(bad).is_err());
        assert_eq!(tree.to_data(), before);
        assert_eq!(tree.len(), 50);
    }

    #[test]
    fn restored_tree_is_mutable() {
        let tree = sample_tree();
        let mut restored: RTree<f64, u32> = RTree::with_max_entries(4);
        restored.from_data(tree.to_data()).unwrap();

        restored.insert(Item::new(100.0, 100.0, 101.0, 101.0, 999));
        assert_eq!(restored.len(), 51);
        restored.remove(&Item::new(0.0, 0.0, 2.0, 2.0, 0));
        assert_eq!(restored.len(), 50);
        assert!(restored.collides(Aabb2D::new(100.5, 100.5, 100.6, 100.6)));
    }
}
