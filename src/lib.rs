//! blockindex - An in-memory B+ tree index mapping integer keys to disk
//! record locators.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Enclosing storage engine                   │
//! │   record parser ──▶ (key, blockId, blockOffset) triples     │
//! └───────────────────────────┬─────────────────────────────────┘
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      blockindex                             │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │           Index Layer (index/bptree)                  │  │
//! │  │   descent/search · insert+split · delete+rebalance    │  │
//! │  │   ┌─────────────────────────────────────────────┐     │  │
//! │  │   │  NodeArena: exclusive owner of all nodes    │     │  │
//! │  │   │  Internal ──▶ children     Leaf ──▶ Leaf    │     │  │
//! │  │   └─────────────────────────────────────────────┘     │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │    Common (common/)  config · error · RecordPtr       │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The index keeps integer keys in a self-balancing B+ tree so the
//! enclosing engine can answer point and range queries without full
//! scans. Record locators (block id + offset) are opaque: the tree
//! stores and returns them verbatim, performs no I/O, and holds no
//! locks — concurrency control, durability, and the meaning of a block
//! belong to the layers around it.
//!
//! # Modules
//! - [`common`] - Shared primitives (config, Error, RecordPtr)
//! - [`index`] - Index structures (B+ tree)
//!
//! # Quick Start
//! ```
//! use blockindex::{BPlusTree, DeleteResult, RecordPtr};
//!
//! let mut index = BPlusTree::new(4).unwrap();
//!
//! index.insert(10, RecordPtr::new(1, 0));
//! index.insert(20, RecordPtr::new(1, 1));
//! index.insert(15, RecordPtr::new(2, 0));
//!
//! assert_eq!(index.exact_search(15), vec![RecordPtr::new(2, 0)]);
//! assert_eq!(index.range_search(10, 20), vec![RecordPtr::new(2, 0)]);
//! assert_eq!(index.delete(20), DeleteResult::Deleted);
//! ```

pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::config::{order_for_page_size, MIN_ORDER, PAGE_SIZE};
pub use common::{Error, Key, RecordPtr, Result};
pub use index::{BPlusTree, DeleteResult, Leaves};
