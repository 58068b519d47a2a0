//! Insertion: leaf placement, node splits, and upward separator
//! propagation.
//!
//! Both split points sit at `(order + 1) / 2` of the temporary
//! over-full sequence. The two levels differ in one detail: a leaf split
//! *copies* the separator up (the key keeps living in the right leaf's
//! first slot, so the chain stays complete), while an internal split
//! *moves* the middle key up.

use crate::common::{Key, RecordPtr};

use super::node::{Entry, InternalNode, LeafNode, Node, NodeId};
use super::tree::{BPlusTree, PathStep};

impl BPlusTree {
    /// Insert one occurrence of `key` with its record locator.
    ///
    /// Duplicates are kept: inserting an already-present key adds a new
    /// occurrence after the existing equal keys and never overwrites. Any
    /// node overflow is resolved by splitting before this returns, so the
    /// balance and occupancy invariants hold at every observable point.
    ///
    /// # Example
    /// ```
    /// use blockindex::{BPlusTree, RecordPtr};
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// tree.insert(7, RecordPtr::new(2, 0));
    /// tree.insert(7, RecordPtr::new(2, 1));
    /// assert_eq!(tree.exact_search(7).len(), 2);
    /// ```
    pub fn insert(&mut self, key: Key, ptr: RecordPtr) {
        if self.root.is_none() {
            let mut leaf = LeafNode::new(self.order());
            leaf.entries.push(Entry::new(key, ptr));
            let id = self.arena.alloc(Node::Leaf(leaf));
            self.root = Some(id);
            self.adjust_len(1);
            return;
        }

        let (leaf_id, mut path) = self
            .locate_leaf_with_path(key, Self::route)
            .expect("tree is non-empty");

        // Place the entry; the slot after existing equal keys keeps
        // duplicate occurrences in insertion order.
        let order = self.order();
        let overflow = {
            let leaf = self.arena.node_mut(leaf_id).as_leaf_mut();
            let pos = leaf.entries.partition_point(|e| e.key <= key);
            leaf.entries.insert(pos, Entry::new(key, ptr));
            leaf.entries.len() > order
        };
        self.adjust_len(1);

        if overflow {
            self.split_leaf(leaf_id, &mut path);
        }
    }

    // ========================================================================
    // Internal: splitting
    // ========================================================================

    /// Split an over-full leaf (`order + 1` entries) and propagate the
    /// separator to the parent chain.
    fn split_leaf(&mut self, leaf_id: NodeId, path: &mut Vec<PathStep>) {
        let order = self.order();
        let middle = (order + 1) / 2;

        let (separator, right) = {
            let leaf = self.arena.node_mut(leaf_id).as_leaf_mut();
            debug_assert_eq!(leaf.entries.len(), order + 1);

            let mut right = LeafNode::new(order);
            right.entries.extend(leaf.entries.drain(middle..));
            right.next = leaf.next;

            // Copied up, not removed: the separator stays as the right
            // leaf's first entry.
            let separator = right.entries[0].key;
            (separator, right)
        };

        // Splice the new leaf into the sibling chain after the original.
        let right_id = self.arena.alloc(Node::Leaf(right));
        self.arena.node_mut(leaf_id).as_leaf_mut().next = Some(right_id);

        self.insert_separator(leaf_id, separator, right_id, path);
    }

    /// Insert `separator` (with `right` as its right child) into the
    /// nearest ancestor on the path, splitting recursively on overflow.
    ///
    /// When the path is exhausted, the split node was the root: a new
    /// internal root is created with `left` and `right` as its two
    /// children and `separator` as its single key, growing the tree by
    /// one level.
    fn insert_separator(
        &mut self,
        left: NodeId,
        separator: Key,
        right: NodeId,
        path: &mut Vec<PathStep>,
    ) {
        let step = match path.pop() {
            Some(step) => step,
            None => {
                let mut root = InternalNode::new(self.order());
                root.keys.push(separator);
                root.children.push(left);
                root.children.push(right);
                let id = self.arena.alloc(Node::Internal(root));
                self.root = Some(id);
                return;
            }
        };

        let order = self.order();
        let overflow = {
            let node = self.arena.node_mut(step.node).as_internal_mut();
            debug_assert_eq!(node.children[step.child_idx], left);

            // The child pointer goes immediately to the right of its key.
            node.keys.insert(step.child_idx, separator);
            node.children.insert(step.child_idx + 1, right);
            node.keys.len() > order
        };
        if !overflow {
            return;
        }

        // Split the over-full internal node. Keys before the middle stay,
        // the middle key is promoted (removed from this level), keys after
        // it move to the new right sibling.
        let middle = (order + 1) / 2;
        let (promoted, right_node) = {
            let node = self.arena.node_mut(step.node).as_internal_mut();
            debug_assert_eq!(node.keys.len(), order + 1);

            let mut right_node = InternalNode::new(order);
            right_node.keys.extend(node.keys.drain(middle + 1..));
            right_node.children.extend(node.children.drain(middle + 1..));
            let promoted = node.keys.pop().expect("middle key present");
            (promoted, right_node)
        };

        let right_id = self.arena.alloc(Node::Internal(right_node));
        self.insert_separator(step.node, promoted, right_id, path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ptr(offset: u32) -> RecordPtr {
        RecordPtr::new(1, offset)
    }

    #[test]
    fn test_insert_into_empty_tree_creates_root_leaf() {
        let mut tree = BPlusTree::new(4).unwrap();
        tree.insert(42, ptr(0));

        assert_eq!(tree.height(), 1);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.exact_search(42), vec![ptr(0)]);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_leaf_split_grows_a_root() {
        let mut tree = BPlusTree::new(4).unwrap();
        for (i, key) in [10, 20, 30, 40].into_iter().enumerate() {
            tree.insert(key, ptr(i as u32));
        }
        assert_eq!(tree.height(), 1);

        // Fifth entry overflows the lone leaf.
        tree.insert(25, ptr(4));
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.node_count(), 3);
        tree.check_invariants().unwrap();

        // The separator is copied up: the key is still found in a leaf.
        for key in [10, 20, 25, 30, 40] {
            assert_eq!(tree.exact_search(key).len(), 1, "key {key} lost");
        }
    }

    #[test]
    fn test_ascending_inserts_cascade_splits() {
        let mut tree = BPlusTree::new(3).unwrap();
        for i in 0..100 {
            tree.insert(i, ptr(i as u32));
            tree.check_invariants().unwrap();
        }

        assert_eq!(tree.len(), 100);
        assert!(tree.height() >= 4);
        for i in 0..100 {
            assert_eq!(tree.exact_search(i), vec![ptr(i as u32)]);
        }
    }

    #[test]
    fn test_descending_inserts_cascade_splits() {
        let mut tree = BPlusTree::new(3).unwrap();
        for i in (0..100).rev() {
            tree.insert(i, ptr(i as u32));
            tree.check_invariants().unwrap();
        }

        let keys: Vec<_> = tree.leaves().flatten().collect();
        let expected: Vec<i64> = (0..100).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_duplicate_keys_keep_every_occurrence() {
        let mut tree = BPlusTree::new(3).unwrap();
        for i in 0..10 {
            tree.insert(5, ptr(i));
            tree.check_invariants().unwrap();
        }

        // All ten occurrences survive; chain order among duplicates is
        // unspecified once they straddle leaves, so compare as a set.
        let mut results = tree.exact_search(5);
        results.sort_unstable();
        assert_eq!(results, (0..10).map(ptr).collect::<Vec<_>>());
    }

    #[test]
    fn test_leaf_chain_stays_sorted_under_mixed_inserts() {
        let mut tree = BPlusTree::new(4).unwrap();
        for (i, key) in [50, 10, 90, 30, 70, 20, 80, 40, 60, 15, 35, 55]
            .into_iter()
            .enumerate()
        {
            tree.insert(key, ptr(i as u32));
            tree.check_invariants().unwrap();
        }

        let keys: Vec<_> = tree.leaves().flatten().collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }
}
