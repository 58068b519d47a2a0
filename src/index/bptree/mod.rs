//! B+ tree index implementation.
//!
//! An order-`n` B+ tree mapping integer keys to record locators, with
//! duplicate keys allowed. The tree's responsibilities split across the
//! submodules:
//! - `node` - node variants and their occupancy bookkeeping
//! - `arena` - slab ownership of nodes, addressed by id
//! - `tree` - descent, exact/range search, diagnostics, validation
//! - `insert` - leaf/internal splits and separator propagation
//! - `delete` - borrow/merge rebalancing and the underflow cascade
//! - `iter` - leaf-chain iteration and the textual dump

mod arena;
mod delete;
mod insert;
mod iter;
mod node;
mod tree;

pub use delete::DeleteResult;
pub use iter::Leaves;
pub use tree::BPlusTree;
