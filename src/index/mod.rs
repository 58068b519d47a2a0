//! Index structures.
//!
//! Currently implements:
//! - [`bptree`] - An in-memory B+ tree over integer keys

pub mod bptree;

pub use bptree::{BPlusTree, DeleteResult, Leaves};
