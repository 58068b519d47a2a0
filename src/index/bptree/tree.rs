//! The B+ tree proper: construction, descent, searches, and diagnostics.
//!
//! Insertion lives in [`insert`](super::insert) and deletion in
//! [`delete`](super::delete); both are `impl BPlusTree` blocks over the
//! state defined here.

use crate::common::config::MIN_ORDER;
use crate::common::{Error, Key, RecordPtr, Result};

use super::arena::NodeArena;
use super::node::{Node, NodeId};

/// One step of a root-to-leaf descent: the internal node visited and the
/// child index taken out of it.
///
/// Insertion uses the path to propagate separators upward; deletion uses
/// it for borrow/merge/root-collapse bookkeeping. No parent back-links
/// are stored in nodes — the path is re-derived on every call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PathStep {
    pub node: NodeId,
    pub child_idx: usize,
}

/// An ordered index mapping integer keys to record locators.
///
/// The tree is a single-threaded, purely in-memory structure: no locks,
/// no I/O, no suspension points. Every operation runs to completion and
/// leaves the balance, order, and occupancy invariants intact. Callers
/// needing concurrent access wrap the tree in their own concurrency
/// control.
///
/// # Structure
/// ```text
///                 ┌────────────┐
///                 │  Internal  │            routing keys
///                 └─┬───┬────┬─┘
///            ┌──────┘   │    └──────┐
///        ┌───▼──┐   ┌───▼──┐   ┌────▼─┐
///        │ Leaf ├──▶│ Leaf ├──▶│ Leaf │     sibling chain
///        └──────┘   └──────┘   └──────┘
/// ```
/// All leaves sit at the same depth; the sibling chain, read left to
/// right, is the authoritative sorted order of the index.
///
/// # Example
/// ```
/// use blockindex::{BPlusTree, RecordPtr};
///
/// let mut tree = BPlusTree::new(4).unwrap();
/// tree.insert(10, RecordPtr::new(1, 0));
/// tree.insert(20, RecordPtr::new(1, 1));
///
/// assert_eq!(tree.exact_search(10), vec![RecordPtr::new(1, 0)]);
/// assert!(tree.exact_search(15).is_empty());
/// ```
#[derive(Debug)]
pub struct BPlusTree {
    /// Owner of every node.
    pub(crate) arena: NodeArena,
    /// Root node, or `None` for an empty tree.
    pub(crate) root: Option<NodeId>,
    /// Maximum keys/entries per node, fixed at construction.
    order: usize,
    /// Live entry count across all leaves.
    len: usize,
}

impl BPlusTree {
    /// Create an empty tree of the given order.
    ///
    /// The order is the maximum number of keys a node may hold. It is
    /// typically derived from the enclosing engine's page budget via
    /// [`order_for_page_size`](crate::common::config::order_for_page_size)
    /// and is fixed for the tree's lifetime.
    ///
    /// # Errors
    /// [`Error::InvalidOrder`] if `order` is below
    /// [`MIN_ORDER`](crate::common::config::MIN_ORDER).
    pub fn new(order: usize) -> Result<Self> {
        if order < MIN_ORDER {
            return Err(Error::InvalidOrder(order));
        }
        Ok(BPlusTree {
            arena: NodeArena::new(),
            root: None,
            order,
            len: 0,
        })
    }

    /// The tree order supplied at construction.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of entries currently indexed.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // ========================================================================
    // Occupancy minimums
    // ========================================================================

    /// Minimum entries per non-root leaf.
    ///
    /// Matches the leaf split point: splitting `order + 1` entries leaves
    /// `(order + 1) / 2` in the original leaf.
    #[inline]
    pub(crate) fn min_leaf_entries(&self) -> usize {
        (self.order + 1) / 2
    }

    /// Minimum routing keys per non-root internal node.
    ///
    /// Matches the internal split point: the right sibling of a split
    /// receives `order / 2` keys after the middle key moves up.
    #[inline]
    pub(crate) fn min_internal_keys(&self) -> usize {
        self.order / 2
    }

    // ========================================================================
    // Descent
    // ========================================================================

    /// Child index for `key` within a routing-key slice: the count of
    /// keys strictly less than `key`. Keys equal to a separator route to
    /// the left child — the canonical rule for every operation.
    #[inline]
    pub(crate) fn route(keys: &[Key], key: Key) -> usize {
        keys.partition_point(|k| *k < key)
    }

    /// Routing variant that sends keys equal to a separator right.
    ///
    /// Only deletion uses this, as a second descent: a key equal to a
    /// separator may live solely at the front of the separator's right
    /// subtree, which the equal-routes-left descent cannot reach.
    #[inline]
    pub(crate) fn route_after_equal(keys: &[Key], key: Key) -> usize {
        keys.partition_point(|k| *k <= key)
    }

    /// Descend from the root to the leaf responsible for `key`.
    ///
    /// Returns `None` for an empty tree. This is the single reusable
    /// primitive behind exact search, range search, and insertion's
    /// split target.
    pub(crate) fn locate_leaf(&self, key: Key) -> Option<NodeId> {
        let mut cur = self.root?;
        loop {
            match self.arena.node(cur) {
                Node::Leaf(_) => return Some(cur),
                Node::Internal(internal) => {
                    cur = internal.children[Self::route(&internal.keys, key)];
                }
            }
        }
    }

    /// Descend to the leaf for `key`, recording every internal node
    /// visited and the branch taken.
    ///
    /// `route` picks the child index from a node's routing keys; callers
    /// pass [`Self::route`] or [`Self::route_after_equal`].
    pub(crate) fn locate_leaf_with_path(
        &self,
        key: Key,
        route: fn(&[Key], Key) -> usize,
    ) -> Option<(NodeId, Vec<PathStep>)> {
        let mut cur = self.root?;
        let mut path = Vec::new();
        loop {
            match self.arena.node(cur) {
                Node::Leaf(_) => return Some((cur, path)),
                Node::Internal(internal) => {
                    let child_idx = route(&internal.keys, key);
                    path.push(PathStep {
                        node: cur,
                        child_idx,
                    });
                    cur = internal.children[child_idx];
                }
            }
        }
    }

    /// Leftmost leaf of the tree, or `None` if empty.
    pub(crate) fn leftmost_leaf(&self) -> Option<NodeId> {
        let mut cur = self.root?;
        loop {
            match self.arena.node(cur) {
                Node::Leaf(_) => return Some(cur),
                Node::Internal(internal) => cur = internal.children[0],
            }
        }
    }

    // ========================================================================
    // Public API: Search
    // ========================================================================

    /// Collect the locators of every entry whose key equals `key`.
    ///
    /// Locates the responsible leaf, then walks the sibling chain
    /// forward: duplicates may spill across leaf boundaries, and a key
    /// equal to a separator sits at the front of the next leaf. The walk
    /// stops at the first entry greater than `key` — everything beyond it
    /// is larger, since the chain is sorted.
    ///
    /// Cost is O(depth + matches); the result is a fresh vector of
    /// copies, valid across later mutations.
    pub fn exact_search(&self, key: Key) -> Vec<RecordPtr> {
        let mut results = Vec::new();
        let mut cur = self.locate_leaf(key);

        'chain: while let Some(leaf_id) = cur {
            let leaf = self.arena.node(leaf_id).as_leaf();
            for entry in &leaf.entries {
                if entry.key == key {
                    results.push(entry.ptr);
                } else if entry.key > key {
                    break 'chain;
                }
            }
            cur = leaf.next;
        }

        results
    }

    /// Collect the locators of every entry with `low < key < high`.
    ///
    /// Bounds are exclusive on both sides. Same chain walk as
    /// [`exact_search`](Self::exact_search), stopping at the first entry
    /// whose key is not less than `high`.
    pub fn range_search(&self, low: Key, high: Key) -> Vec<RecordPtr> {
        let mut results = Vec::new();
        let mut cur = self.locate_leaf(low);

        'chain: while let Some(leaf_id) = cur {
            let leaf = self.arena.node(leaf_id).as_leaf();
            for entry in &leaf.entries {
                if entry.key >= high {
                    break 'chain;
                }
                if entry.key > low {
                    results.push(entry.ptr);
                }
            }
            cur = leaf.next;
        }

        results
    }

    // ========================================================================
    // Public API: Diagnostics
    // ========================================================================

    /// Height of the tree: 0 when empty, 1 for a lone root leaf, one more
    /// for each internal level above the leaves.
    ///
    /// All leaves sit at the same depth, so descending through the first
    /// child at every level measures the whole tree.
    pub fn height(&self) -> usize {
        let mut cur = match self.root {
            Some(id) => id,
            None => return 0,
        };

        let mut height = 1;
        while let Node::Internal(internal) = self.arena.node(cur) {
            cur = internal.children[0];
            height += 1;
        }
        height
    }

    /// Total number of nodes, leaves and internal alike.
    ///
    /// Traverses with an explicit pending stack instead of recursion, so
    /// stack depth stays bounded for deep trees.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = Vec::new();
        if let Some(root) = self.root {
            pending.push(root);
        }

        while let Some(id) = pending.pop() {
            count += 1;
            if let Node::Internal(internal) = self.arena.node(id) {
                pending.extend(internal.children.iter().copied());
            }
        }

        count
    }

    // ========================================================================
    // Public API: Invariant validation
    // ========================================================================

    /// Verify every structural invariant, reporting the first violation.
    ///
    /// Checked per node: capacity, non-root occupancy minimums, the
    /// key/child count relationship, sorted routing keys (non-decreasing:
    /// duplicate entry keys can legitimately produce equal adjacent
    /// separators), sorted leaf entries, and live arena references.
    /// Checked globally:
    /// uniform leaf depth, subtree key bounds around each separator, a
    /// sibling chain that matches the in-order leaf sequence with
    /// non-decreasing keys throughout, and an arena with no leaked nodes.
    ///
    /// Violations are unreachable through the public API; this exists so
    /// a test suite can assert as much after every mutation.
    pub fn check_invariants(&self) -> Result<()> {
        let root = match self.root {
            Some(id) => id,
            None => {
                let live = self.arena.live_count();
                if live != 0 {
                    return Err(Error::LeakedNodes { live, reachable: 0 });
                }
                return Ok(());
            }
        };

        let leaf_depth = self.height();
        let mut chain_order = Vec::new();
        self.check_subtree(root, 1, leaf_depth, None, None, &mut chain_order)?;
        self.check_leaf_chain(&chain_order)?;

        // Merges and collapses must free every node they orphan.
        let live = self.arena.live_count();
        let reachable = self.node_count();
        if live != reachable {
            return Err(Error::LeakedNodes { live, reachable });
        }
        Ok(())
    }

    /// Recursive structural check of one subtree.
    ///
    /// `lower`/`upper` are the key bounds inherited from ancestor
    /// separators. The left side of a separator is bounded inclusively:
    /// duplicate inserts under equal-routes-left routing legitimately
    /// leave keys equal to the separator in the left subtree.
    fn check_subtree(
        &self,
        id: NodeId,
        depth: usize,
        leaf_depth: usize,
        lower: Option<Key>,
        upper: Option<Key>,
        chain_order: &mut Vec<NodeId>,
    ) -> Result<()> {
        if !self.arena.is_live(id) {
            return Err(Error::DanglingNodeRef(id.0));
        }

        let node = self.arena.node(id);
        let occupancy = node.occupancy();
        let is_root = depth == 1;

        if occupancy > self.order {
            return Err(Error::NodeOverflow {
                node: id.0,
                occupancy,
                capacity: self.order,
            });
        }

        match node {
            Node::Leaf(leaf) => {
                if depth != leaf_depth {
                    return Err(Error::DepthMismatch {
                        expected: leaf_depth,
                        found: depth,
                    });
                }
                let minimum = if is_root { 1 } else { self.min_leaf_entries() };
                if occupancy < minimum {
                    return Err(Error::NodeUnderflow {
                        node: id.0,
                        occupancy,
                        minimum,
                    });
                }
                for pair in leaf.entries.windows(2) {
                    if pair[0].key > pair[1].key {
                        return Err(Error::KeyOrderViolation { node: id.0 });
                    }
                }
                for entry in &leaf.entries {
                    let below = lower.is_some_and(|b| entry.key < b);
                    let above = upper.is_some_and(|b| entry.key > b);
                    if below || above {
                        return Err(Error::KeyOrderViolation { node: id.0 });
                    }
                }
                chain_order.push(id);
            }
            Node::Internal(internal) => {
                if internal.children.len() != internal.keys.len() + 1 {
                    return Err(Error::ChildCountMismatch {
                        node: id.0,
                        keys: internal.keys.len(),
                        children: internal.children.len(),
                    });
                }
                let minimum = if is_root { 1 } else { self.min_internal_keys() };
                if occupancy < minimum {
                    return Err(Error::NodeUnderflow {
                        node: id.0,
                        occupancy,
                        minimum,
                    });
                }
                for pair in internal.keys.windows(2) {
                    if pair[0] > pair[1] {
                        return Err(Error::KeyOrderViolation { node: id.0 });
                    }
                }
                for (i, &child) in internal.children.iter().enumerate() {
                    // Child i is bounded above by key i, below by key i-1.
                    let child_upper = internal.keys.get(i).copied().or(upper);
                    let child_lower = if i == 0 {
                        lower
                    } else {
                        Some(internal.keys[i - 1])
                    };
                    self.check_subtree(
                        child,
                        depth + 1,
                        leaf_depth,
                        child_lower,
                        child_upper,
                        chain_order,
                    )?;
                }
            }
        }

        Ok(())
    }

    /// Verify the sibling chain visits exactly the in-order leaves, left
    /// to right, with keys non-decreasing across the whole chain.
    fn check_leaf_chain(&self, chain_order: &[NodeId]) -> Result<()> {
        let mut cur = self.leftmost_leaf();
        let mut last_key: Option<Key> = None;

        for &expected in chain_order {
            let leaf_id = match cur {
                Some(id) => id,
                None => return Err(Error::BrokenLeafChain { node: expected.0 }),
            };
            if leaf_id != expected {
                return Err(Error::BrokenLeafChain { node: leaf_id.0 });
            }

            let leaf = self.arena.node(leaf_id).as_leaf();
            for entry in &leaf.entries {
                if last_key.is_some_and(|k| k > entry.key) {
                    return Err(Error::KeyOrderViolation { node: leaf_id.0 });
                }
                last_key = Some(entry.key);
            }
            cur = leaf.next;
        }

        // The rightmost leaf must terminate the chain.
        match cur {
            None => Ok(()),
            Some(extra) => Err(Error::BrokenLeafChain { node: extra.0 }),
        }
    }

    // ========================================================================
    // Internal: shared mutation bookkeeping
    // ========================================================================

    /// Record that an entry was added or removed.
    #[inline]
    pub(crate) fn adjust_len(&mut self, delta: isize) {
        self.len = (self.len as isize + delta) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ptr(offset: u32) -> RecordPtr {
        RecordPtr::new(1, offset)
    }

    #[test]
    fn test_new_rejects_small_order() {
        assert_eq!(BPlusTree::new(0).unwrap_err(), Error::InvalidOrder(0));
        assert_eq!(BPlusTree::new(2).unwrap_err(), Error::InvalidOrder(2));
        assert!(BPlusTree::new(3).is_ok());
    }

    #[test]
    fn test_empty_tree_diagnostics() {
        let tree = BPlusTree::new(4).unwrap();
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.node_count(), 0);
        assert!(tree.is_empty());
        assert!(tree.exact_search(5).is_empty());
        assert!(tree.range_search(0, 100).is_empty());
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_route_equal_goes_left() {
        let keys = vec![10, 20, 30];
        assert_eq!(BPlusTree::route(&keys, 5), 0);
        assert_eq!(BPlusTree::route(&keys, 10), 0);
        assert_eq!(BPlusTree::route(&keys, 15), 1);
        assert_eq!(BPlusTree::route(&keys, 20), 1);
        assert_eq!(BPlusTree::route(&keys, 35), 3);
    }

    #[test]
    fn test_route_after_equal_goes_right() {
        let keys = vec![10, 20, 30];
        assert_eq!(BPlusTree::route_after_equal(&keys, 10), 1);
        assert_eq!(BPlusTree::route_after_equal(&keys, 30), 3);
        assert_eq!(BPlusTree::route_after_equal(&keys, 5), 0);
    }

    #[test]
    fn test_exact_search_single_leaf() {
        let mut tree = BPlusTree::new(4).unwrap();
        tree.insert(10, ptr(0));
        tree.insert(20, ptr(1));
        tree.insert(10, ptr(2));

        assert_eq!(tree.exact_search(10), vec![ptr(0), ptr(2)]);
        assert_eq!(tree.exact_search(20), vec![ptr(1)]);
        assert!(tree.exact_search(15).is_empty());
    }

    #[test]
    fn test_range_search_exclusive_bounds() {
        let mut tree = BPlusTree::new(4).unwrap();
        for (i, key) in [10, 20, 30, 40].into_iter().enumerate() {
            tree.insert(key, ptr(i as u32));
        }

        // Endpoints excluded on both sides.
        assert_eq!(tree.range_search(10, 40), vec![ptr(1), ptr(2)]);
        assert_eq!(tree.range_search(5, 15), vec![ptr(0)]);
        assert!(tree.range_search(20, 21).is_empty());
    }

    #[test]
    fn test_diagnostics_unaffected_by_reads() {
        let mut tree = BPlusTree::new(3).unwrap();
        for i in 0..20 {
            tree.insert(i, ptr(i as u32));
        }

        let height = tree.height();
        let nodes = tree.node_count();

        let _ = tree.exact_search(7);
        let _ = tree.range_search(2, 15);
        let _ = tree.display_leaves();
        tree.check_invariants().unwrap();

        assert_eq!(tree.height(), height);
        assert_eq!(tree.node_count(), nodes);
    }
}
