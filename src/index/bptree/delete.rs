//! Deletion: leaf removal, sibling borrow/merge, separator fix-up, and
//! the recursive underflow cascade.
//!
//! Removing an entry may drop its leaf below the occupancy minimum. The
//! repair order is fixed: borrow from the left sibling, else borrow from
//! the right sibling, else merge (into the left sibling when one exists,
//! otherwise absorbing the right). A merge deletes a separator/child
//! pair from the parent, which may underflow in turn — the same
//! borrow/merge decision repeats level by level until a node satisfies
//! its minimum or the root is reached. An internal root left with a
//! single child hands that child the root role; a root leaf that empties
//! leaves the tree empty.

use std::fmt;

use crate::common::Key;

use super::node::{Node, NodeId};
use super::tree::{BPlusTree, PathStep};

/// Outcome of a delete call.
///
/// Not-found and empty-tree are ordinary results of normal operation,
/// not errors: the caller decides whether either is worth reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteResult {
    /// One occurrence of the key was removed.
    Deleted,
    /// The key is not present in the tree.
    KeyNotFound,
    /// The tree holds no entries at all.
    EmptyTree,
}

impl fmt::Display for DeleteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteResult::Deleted => write!(f, "deleted"),
            DeleteResult::KeyNotFound => write!(f, "key not found"),
            DeleteResult::EmptyTree => write!(f, "empty tree"),
        }
    }
}

impl BPlusTree {
    /// Remove one occurrence of `key`, rebalancing as needed.
    ///
    /// The first occurrence along the leaf chain is removed. A key equal
    /// to a separator may live at the front of the separator's right
    /// subtree, one leaf past where the equal-routes-left descent lands;
    /// the chain walk finds it there and the ancestor path is re-derived
    /// for the leaf actually holding it.
    ///
    /// # Example
    /// ```
    /// use blockindex::{BPlusTree, DeleteResult, RecordPtr};
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// assert_eq!(tree.delete(5), DeleteResult::EmptyTree);
    ///
    /// tree.insert(5, RecordPtr::new(1, 0));
    /// assert_eq!(tree.delete(5), DeleteResult::Deleted);
    /// assert_eq!(tree.delete(5), DeleteResult::EmptyTree);
    /// ```
    pub fn delete(&mut self, key: Key) -> DeleteResult {
        if self.root.is_none() {
            return DeleteResult::EmptyTree;
        }

        let (routed, path) = self
            .locate_leaf_with_path(key, Self::route)
            .expect("tree is non-empty");

        let target = match self.first_leaf_containing(routed, key) {
            Some(id) => id,
            None => return DeleteResult::KeyNotFound,
        };
        let path = if target == routed {
            path
        } else {
            self.path_to_leaf(target, key)
                .expect("chain leaf is reachable from the root")
        };

        self.remove_from_leaf(target, path, key);
        DeleteResult::Deleted
    }

    // ========================================================================
    // Internal: locating the occurrence
    // ========================================================================

    /// Walk the sibling chain from `start` to the first leaf holding an
    /// occurrence of `key`, mirroring the exact-search walk.
    fn first_leaf_containing(&self, start: NodeId, key: Key) -> Option<NodeId> {
        let mut cur = Some(start);
        while let Some(leaf_id) = cur {
            let leaf = self.arena.node(leaf_id).as_leaf();
            for entry in &leaf.entries {
                if entry.key == key {
                    return Some(leaf_id);
                }
                if entry.key > key {
                    return None;
                }
            }
            cur = leaf.next;
        }
        None
    }

    /// Derive the ancestor path for a specific leaf known to hold `key`.
    ///
    /// Every ancestor branch for that leaf lies in the window of child
    /// indices whose key range admits `key` (separators equal to `key`
    /// widen the window beyond one child), so a bounded search over that
    /// window finds the leaf by identity.
    fn path_to_leaf(&self, target: NodeId, key: Key) -> Option<Vec<PathStep>> {
        let mut path = Vec::new();
        if self.descend_to_leaf(self.root?, target, key, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn descend_to_leaf(
        &self,
        cur: NodeId,
        target: NodeId,
        key: Key,
        path: &mut Vec<PathStep>,
    ) -> bool {
        let internal = match self.arena.node(cur) {
            Node::Leaf(_) => return cur == target,
            Node::Internal(internal) => internal,
        };

        let lo = Self::route(&internal.keys, key);
        let hi = Self::route_after_equal(&internal.keys, key);
        for child_idx in lo..=hi {
            path.push(PathStep {
                node: cur,
                child_idx,
            });
            if self.descend_to_leaf(internal.children[child_idx], target, key, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    // ========================================================================
    // Internal: leaf-level removal
    // ========================================================================

    /// Remove the first matching entry from `leaf_id` and repair the
    /// structure: separator fix-up when the leftmost key went away,
    /// borrow/merge when the leaf underflowed, root handling when the
    /// leaf has no ancestors.
    fn remove_from_leaf(&mut self, leaf_id: NodeId, path: Vec<PathStep>, key: Key) {
        let min_leaf = self.min_leaf_entries();

        let (occupancy, removed_leftmost, new_first) = {
            let leaf = self.arena.node_mut(leaf_id).as_leaf_mut();
            let pos = leaf
                .entries
                .iter()
                .position(|e| e.key == key)
                .expect("occurrence located by caller");
            leaf.entries.remove(pos);
            (leaf.entries.len(), pos == 0, leaf.first_key())
        };
        self.adjust_len(-1);

        if path.is_empty() {
            // The leaf is the root; it may hold any occupancy, and an
            // empty root leaves the tree empty.
            if occupancy == 0 {
                self.arena.free(leaf_id);
                self.root = None;
            }
            return;
        }

        if occupancy >= min_leaf {
            if removed_leftmost {
                let first = new_first.expect("occupancy is above zero");
                self.fix_separator_upward(&path, first);
            }
            return;
        }

        self.rebalance_leaf(leaf_id, path, removed_leftmost);
    }

    /// Repoint the ancestor separator that named this leaf's old first
    /// key at the new one.
    ///
    /// Ancestors entered through branch 0 do not reference the leaf's
    /// key range and are skipped; the nearest ancestor entered through a
    /// non-zero branch holds the separator in slot `branch - 1`. When
    /// every branch was 0 the leaf is the global leftmost and no
    /// separator names it.
    fn fix_separator_upward(&mut self, path: &[PathStep], new_first: Key) {
        for step in path.iter().rev() {
            if step.child_idx > 0 {
                let node = self.arena.node_mut(step.node).as_internal_mut();
                node.keys[step.child_idx - 1] = new_first;
                return;
            }
        }
    }

    // ========================================================================
    // Internal: leaf rebalancing
    // ========================================================================

    /// Restore the occupancy minimum of an underflowed, non-root leaf.
    fn rebalance_leaf(&mut self, leaf_id: NodeId, mut path: Vec<PathStep>, removed_leftmost: bool) {
        let min_leaf = self.min_leaf_entries();
        let step = path.pop().expect("leaf is not the root");
        let (parent_id, idx) = (step.node, step.child_idx);

        // a. Borrow from the left sibling: its last entry becomes our
        //    first, and the separator between us follows it.
        if idx > 0 {
            let left_id = self.arena.node(parent_id).as_internal().children[idx - 1];
            if self.arena.node(left_id).occupancy() > min_leaf {
                let (left, leaf) = self.arena.pair_mut(left_id, leaf_id);
                let borrowed = left.as_leaf_mut().entries.pop().expect("left above minimum");
                leaf.as_leaf_mut().entries.insert(0, borrowed);

                let parent = self.arena.node_mut(parent_id).as_internal_mut();
                parent.keys[idx - 1] = borrowed.key;
                return;
            }
        }

        // b. Borrow from the right sibling: its first entry becomes our
        //    last, the separator follows the right sibling's new first
        //    key, and a removed leftmost key still needs its own fix-up.
        let child_count = self.arena.node(parent_id).as_internal().children.len();
        if idx + 1 < child_count {
            let right_id = self.arena.node(parent_id).as_internal().children[idx + 1];
            if self.arena.node(right_id).occupancy() > min_leaf {
                let (right, leaf) = self.arena.pair_mut(right_id, leaf_id);
                let moved = right.as_leaf_mut().entries.remove(0);
                leaf.as_leaf_mut().entries.push(moved);

                let right_first = self
                    .arena
                    .node(right_id)
                    .as_leaf()
                    .first_key()
                    .expect("right above minimum");
                self.arena.node_mut(parent_id).as_internal_mut().keys[idx] = right_first;

                if removed_leftmost {
                    path.push(step);
                    let first = self
                        .arena
                        .node(leaf_id)
                        .as_leaf()
                        .first_key()
                        .expect("leaf was refilled");
                    self.fix_separator_upward(&path, first);
                }
                return;
            }
        }

        // c. Merge. Preferred direction: fold this leaf into its left
        //    sibling; only the global-leftmost child of a parent absorbs
        //    its right sibling instead. Either way one leaf dies and the
        //    parent loses a separator/child pair.
        if idx > 0 {
            let left_id = self.arena.node(parent_id).as_internal().children[idx - 1];
            let (left, leaf) = self.arena.pair_mut(left_id, leaf_id);
            let (left, leaf) = (left.as_leaf_mut(), leaf.as_leaf_mut());
            left.entries.extend(leaf.entries.drain(..));
            left.next = leaf.next;

            self.arena.free(leaf_id);
            self.remove_internal_entry(parent_id, idx - 1, idx, path);
        } else {
            let right_id = self.arena.node(parent_id).as_internal().children[idx + 1];
            let (right, leaf) = self.arena.pair_mut(right_id, leaf_id);
            let (right, leaf) = (right.as_leaf_mut(), leaf.as_leaf_mut());
            leaf.entries.extend(right.entries.drain(..));
            leaf.next = right.next;

            self.arena.free(right_id);
            if removed_leftmost {
                // The parent's branch here is 0, so the fix-up lands on a
                // higher ancestor if any references this subtree.
                let first = self
                    .arena
                    .node(leaf_id)
                    .as_leaf()
                    .first_key()
                    .expect("merge refilled the leaf");
                self.fix_separator_upward(&path, first);
            }
            self.remove_internal_entry(parent_id, idx, idx + 1, path);
        }
    }

    // ========================================================================
    // Internal: the underflow cascade
    // ========================================================================

    /// Drop the separator at `sep_idx` and the child pointer at
    /// `child_pos` from an internal node after a merge one level below,
    /// then repair this level: collapse the root when its last separator
    /// is gone, or rebalance on underflow.
    fn remove_internal_entry(
        &mut self,
        node_id: NodeId,
        sep_idx: usize,
        child_pos: usize,
        path: Vec<PathStep>,
    ) {
        let min_internal = self.min_internal_keys();
        let occupancy = {
            let node = self.arena.node_mut(node_id).as_internal_mut();
            node.keys.remove(sep_idx);
            node.children.remove(child_pos);
            node.keys.len()
        };

        if path.is_empty() {
            // The node is the root. With its last separator gone it has a
            // single child left, which becomes the new root and shrinks
            // the tree by one level.
            if occupancy == 0 {
                let only_child = self.arena.node(node_id).as_internal().children[0];
                self.arena.free(node_id);
                self.root = Some(only_child);
            }
            return;
        }

        if occupancy < min_internal {
            self.rebalance_internal(node_id, path);
        }
    }

    /// Restore the occupancy minimum of an underflowed, non-root
    /// internal node: borrow left, else borrow right, else merge —
    /// recursing into the parent when a merge removes its separator.
    ///
    /// Internal borrows rotate through the parent: the separator comes
    /// down into the underflowed node and the sibling's edge key goes up
    /// to replace it, with the sibling's edge child moving across.
    fn rebalance_internal(&mut self, node_id: NodeId, mut path: Vec<PathStep>) {
        let min_internal = self.min_internal_keys();
        let step = path.pop().expect("node is not the root");
        let (parent_id, idx) = (step.node, step.child_idx);

        // Borrow from the left sibling (rotate right).
        if idx > 0 {
            let left_id = self.arena.node(parent_id).as_internal().children[idx - 1];
            if self.arena.node(left_id).occupancy() > min_internal {
                let separator = self.arena.node(parent_id).as_internal().keys[idx - 1];

                let (left, node) = self.arena.pair_mut(left_id, node_id);
                let (left, node) = (left.as_internal_mut(), node.as_internal_mut());
                let up = left.keys.pop().expect("left above minimum");
                let child = left.children.pop().expect("left above minimum");
                node.keys.insert(0, separator);
                node.children.insert(0, child);

                self.arena.node_mut(parent_id).as_internal_mut().keys[idx - 1] = up;
                return;
            }
        }

        // Borrow from the right sibling (rotate left).
        let child_count = self.arena.node(parent_id).as_internal().children.len();
        if idx + 1 < child_count {
            let right_id = self.arena.node(parent_id).as_internal().children[idx + 1];
            if self.arena.node(right_id).occupancy() > min_internal {
                let separator = self.arena.node(parent_id).as_internal().keys[idx];

                let (right, node) = self.arena.pair_mut(right_id, node_id);
                let (right, node) = (right.as_internal_mut(), node.as_internal_mut());
                let up = right.keys.remove(0);
                let child = right.children.remove(0);
                node.keys.push(separator);
                node.children.push(child);

                self.arena.node_mut(parent_id).as_internal_mut().keys[idx] = up;
                return;
            }
        }

        // Merge, pulling the separator between the two nodes down into
        // the survivor so the child count stays one ahead of the keys.
        if idx > 0 {
            let left_id = self.arena.node(parent_id).as_internal().children[idx - 1];
            let separator = self.arena.node(parent_id).as_internal().keys[idx - 1];

            let (left, node) = self.arena.pair_mut(left_id, node_id);
            let (left, node) = (left.as_internal_mut(), node.as_internal_mut());
            left.keys.push(separator);
            left.keys.extend(node.keys.drain(..));
            left.children.extend(node.children.drain(..));

            self.arena.free(node_id);
            self.remove_internal_entry(parent_id, idx - 1, idx, path);
        } else {
            let right_id = self.arena.node(parent_id).as_internal().children[idx + 1];
            let separator = self.arena.node(parent_id).as_internal().keys[idx];

            let (right, node) = self.arena.pair_mut(right_id, node_id);
            let (right, node) = (right.as_internal_mut(), node.as_internal_mut());
            node.keys.push(separator);
            node.keys.extend(right.keys.drain(..));
            node.children.extend(right.children.drain(..));

            self.arena.free(right_id);
            self.remove_internal_entry(parent_id, idx, idx + 1, path);
        }
    }
}
