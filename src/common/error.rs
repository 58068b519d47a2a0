//! Error types for blockindex.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write
/// `Result<T>`. This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in blockindex.
///
/// Recoverable outcomes of normal operation (key not found on delete,
/// deleting from an empty tree) are *not* errors; they are reported
/// through [`DeleteResult`](crate::index::bptree::DeleteResult). This
/// enum covers construction-time validation and the structural
/// violations reported by
/// [`check_invariants`](crate::index::bptree::BPlusTree::check_invariants),
/// none of which should be reachable through the public API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The requested order is too small for the split/merge arithmetic.
    #[error("order {0} is below the minimum supported order")]
    InvalidOrder(usize),

    /// A node holds more keys/entries than the tree order allows.
    #[error("node {node} holds {occupancy} keys, exceeding capacity {capacity}")]
    NodeOverflow {
        node: usize,
        occupancy: usize,
        capacity: usize,
    },

    /// A non-root node dropped below its occupancy minimum.
    #[error("node {node} holds {occupancy} keys, below the minimum of {minimum}")]
    NodeUnderflow {
        node: usize,
        occupancy: usize,
        minimum: usize,
    },

    /// An internal node's child count does not match its key count.
    #[error("node {node} has {keys} keys but {children} children")]
    ChildCountMismatch {
        node: usize,
        keys: usize,
        children: usize,
    },

    /// Keys within a node, or across the leaf chain, are out of order.
    #[error("key ordering violated at node {node}")]
    KeyOrderViolation { node: usize },

    /// Not all leaves sit at the same depth.
    #[error("leaf at depth {found}, expected depth {expected}")]
    DepthMismatch { expected: usize, found: usize },

    /// The leaf sibling chain disagrees with the tree's left-to-right
    /// leaf order.
    #[error("leaf chain broken at node {node}")]
    BrokenLeafChain { node: usize },

    /// A node reference points at a freed or out-of-range arena slot.
    #[error("dangling node reference {0}")]
    DanglingNodeRef(usize),

    /// The arena holds live nodes the tree can no longer reach.
    #[error("{live} live nodes but only {reachable} reachable from the root")]
    LeakedNodes { live: usize, reachable: usize },
}
