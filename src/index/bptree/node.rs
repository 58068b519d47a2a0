//! Node representation for the B+ tree.
//!
//! A node is either a [`LeafNode`] (sorted entries plus the sibling
//! chain link) or an [`InternalNode`] (routing keys plus child
//! references). Both keep their occupancy as an explicit count — the
//! length of the backing vector — rather than scanning for a reserved
//! "empty" key value that could collide with a legitimate key.

use std::fmt;

use crate::common::{Key, RecordPtr};

/// Identifies a node slot in the [`NodeArena`](super::arena::NodeArena).
///
/// Using `usize` because:
/// 1. Nodes are stored in a `Vec` inside the arena
/// 2. Direct indexing without casting: `slots[node_id.0]`
/// 3. Matches Rust idioms for array/vector indexing
///
/// A `NodeId` is a structural reference, never an owner: the arena owns
/// every node, and parent→child edges and the leaf chain are plain ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Create a new NodeId.
    #[inline]
    pub fn new(id: usize) -> Self {
        NodeId(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// One key occurrence: the key plus the locator of its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub key: Key,
    pub ptr: RecordPtr,
}

impl Entry {
    #[inline]
    pub fn new(key: Key, ptr: RecordPtr) -> Self {
        Entry { key, ptr }
    }
}

/// A leaf node: up to `order` entries sorted non-decreasing by key, plus
/// a non-owning link to the next leaf in key order.
///
/// The vector is allocated with one slot of headroom so that building the
/// temporary `order + 1` sequence during a split never reallocates.
#[derive(Debug)]
pub struct LeafNode {
    /// Sorted entries; `entries.len()` is the occupancy.
    pub entries: Vec<Entry>,
    /// Next leaf in left-to-right key order, or `None` if rightmost.
    pub next: Option<NodeId>,
}

impl LeafNode {
    /// Create an empty leaf with capacity for `order + 1` entries.
    pub fn new(order: usize) -> Self {
        LeafNode {
            entries: Vec::with_capacity(order + 1),
            next: None,
        }
    }

    /// First key in the leaf, if any.
    #[inline]
    pub fn first_key(&self) -> Option<Key> {
        self.entries.first().map(|e| e.key)
    }
}

/// An internal (routing) node: up to `order` sorted routing keys and
/// `keys + 1` child references. Duplicate entry keys straddling a split
/// can leave equal adjacent routing keys; ordering is non-decreasing.
///
/// Child `i` routes keys strictly less than `keys[i]`; the last child
/// routes keys greater than or equal to the last routing key. Keys equal
/// to a routing key route left (see the descent logic in
/// [`BPlusTree`](super::BPlusTree)).
#[derive(Debug)]
pub struct InternalNode {
    /// Routing keys; `keys.len()` is the occupancy.
    pub keys: Vec<Key>,
    /// Child node ids; always exactly `keys.len() + 1` between operations.
    pub children: Vec<NodeId>,
}

impl InternalNode {
    /// Create an empty internal node with split headroom.
    pub fn new(order: usize) -> Self {
        InternalNode {
            keys: Vec::with_capacity(order + 1),
            children: Vec::with_capacity(order + 2),
        }
    }
}

/// A tree node: leaf or internal, matched exhaustively at every use site.
#[derive(Debug)]
pub enum Node {
    Leaf(LeafNode),
    Internal(InternalNode),
}

impl Node {
    /// Occupancy: entry count for a leaf, routing-key count for an
    /// internal node.
    #[inline]
    pub fn occupancy(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.entries.len(),
            Node::Internal(internal) => internal.keys.len(),
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Borrow as a leaf.
    ///
    /// # Panics
    /// Panics if the node is internal; callers only reach this through
    /// descent, which terminates at leaves.
    #[inline]
    pub fn as_leaf(&self) -> &LeafNode {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Borrow mutably as a leaf.
    ///
    /// # Panics
    /// Panics if the node is internal.
    #[inline]
    pub fn as_leaf_mut(&mut self) -> &mut LeafNode {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Borrow as an internal node.
    ///
    /// # Panics
    /// Panics if the node is a leaf.
    #[inline]
    pub fn as_internal(&self) -> &InternalNode {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Borrow mutably as an internal node.
    ///
    /// # Panics
    /// Panics if the node is a leaf.
    #[inline]
    pub fn as_internal_mut(&mut self) -> &mut InternalNode {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }
}
