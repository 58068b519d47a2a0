//! Common types and utilities shared across blockindex.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and the order-from-page-size derivation
//! - Error types
//! - The record locator ([`RecordPtr`])

pub mod config;
pub mod error;
mod record_ptr;

pub use error::{Error, Result};
pub use record_ptr::RecordPtr;

/// The key type indexed by the tree.
///
/// Keys are plain 64-bit integers supplied by the record parser upstream.
/// Duplicates are permitted; each occurrence owns its own locator.
pub type Key = i64;
