//! Arena allocation for tree nodes.
//!
//! The arena is the exclusive owner of every node in a tree. All other
//! links — the root handle, parent→child edges, the leaf sibling chain —
//! are plain [`NodeId`] indices into it. This sidesteps shared ownership
//! entirely: there are no reference-counted nodes and no back-pointers,
//! and borrowing two nodes mutably at once (parent plus sibling during a
//! borrow/merge) is an index-disjointness question rather than an
//! ownership one.

use super::node::{Node, NodeId};

/// Slab of nodes with a free list for slot reuse.
///
/// Nodes are created on split or root creation and destroyed on merge or
/// root collapse; freed slots are recycled before the slab grows.
#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    /// Node slots; `None` marks a freed slot awaiting reuse.
    slots: Vec<Option<Node>>,
    /// Freed slot ids (LIFO for locality).
    free_list: Vec<NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Store a node, reusing a freed slot when one is available.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        match self.free_list.pop() {
            Some(id) => {
                debug_assert!(self.slots[id.0].is_none());
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId::new(self.slots.len() - 1)
            }
        }
    }

    /// Release a node's slot back to the free list.
    ///
    /// # Panics
    /// Panics if the slot is already free; double-free of a node id is a
    /// structural bug.
    pub fn free(&mut self, id: NodeId) {
        let slot = self.slots[id.0].take();
        assert!(slot.is_some(), "double free of {id}");
        self.free_list.push(id);
    }

    /// Borrow a node.
    ///
    /// # Panics
    /// Panics on a dangling id; every id handed out by [`alloc`] stays
    /// valid until [`free`].
    ///
    /// [`alloc`]: NodeArena::alloc
    /// [`free`]: NodeArena::free
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        self.slots[id.0].as_ref().expect("dangling node id")
    }

    /// Borrow a node mutably.
    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots[id.0].as_mut().expect("dangling node id")
    }

    /// Borrow two distinct nodes mutably at once.
    ///
    /// Needed by borrow/merge rebalancing, which moves entries between a
    /// node and its sibling in one step.
    ///
    /// # Panics
    /// Panics if `a == b` or either slot is free.
    pub fn pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut Node, &mut Node) {
        assert_ne!(a, b, "pair_mut requires distinct nodes");
        if a.0 < b.0 {
            let (lo, hi) = self.slots.split_at_mut(b.0);
            (
                lo[a.0].as_mut().expect("dangling node id"),
                hi[0].as_mut().expect("dangling node id"),
            )
        } else {
            let (lo, hi) = self.slots.split_at_mut(a.0);
            let (fst, snd) = (
                hi[0].as_mut().expect("dangling node id"),
                lo[b.0].as_mut().expect("dangling node id"),
            );
            (fst, snd)
        }
    }

    /// Whether `id` currently refers to a live node.
    #[inline]
    pub fn is_live(&self, id: NodeId) -> bool {
        id.0 < self.slots.len() && self.slots[id.0].is_some()
    }

    /// Number of live nodes.
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }
}
