//! Leaf-chain iteration and the textual leaf dump.

use crate::common::Key;

use super::node::NodeId;
use super::tree::BPlusTree;

/// Lazy left-to-right walk over the leaf chain, yielding each leaf's
/// keys as one list.
///
/// The iterator is finite and restartable: it borrows the tree, produces
/// one `Vec<Key>` per leaf, and a fresh call to
/// [`BPlusTree::leaves`] starts over from the leftmost leaf.
#[derive(Debug)]
pub struct Leaves<'a> {
    tree: &'a BPlusTree,
    cur: Option<NodeId>,
}

impl Iterator for Leaves<'_> {
    type Item = Vec<Key>;

    fn next(&mut self) -> Option<Self::Item> {
        let leaf_id = self.cur?;
        let leaf = self.tree.arena.node(leaf_id).as_leaf();
        self.cur = leaf.next;
        Some(leaf.entries.iter().map(|e| e.key).collect())
    }
}

impl BPlusTree {
    /// Iterate the leaf chain left to right, one key list per leaf.
    ///
    /// A debugging aid: the chain read this way is the authoritative
    /// sorted order of the index.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            tree: self,
            cur: self.leftmost_leaf(),
        }
    }

    /// Render the leaf chain as text, e.g. `(5,6,7) -> (10,12)`.
    ///
    /// Diagnostic only; the empty tree renders as an empty string. The
    /// crate never prints — the caller decides where the dump goes.
    pub fn display_leaves(&self) -> String {
        let mut out = String::new();
        for (i, keys) in self.leaves().enumerate() {
            if i > 0 {
                out.push_str(" -> ");
            }
            out.push('(');
            for (j, key) in keys.iter().enumerate() {
                if j > 0 {
                    out.push(',');
                }
                out.push_str(&key.to_string());
            }
            out.push(')');
        }
        out
    }
}
