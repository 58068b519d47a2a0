//! Record locator type.

use std::fmt;

/// Locates one record inside the storage engine: a disk block plus an
/// offset within that block.
///
/// Both halves are opaque to the index. They are produced by the record
/// parser upstream, stored verbatim, and handed back verbatim by
/// searches; the tree never interprets or validates them. Searches return
/// copies, so a locator stays valid across later tree mutations.
///
/// # Example
/// ```
/// use blockindex::RecordPtr;
///
/// let ptr = RecordPtr::new(7, 120);
/// assert_eq!(ptr.block_id, 7);
/// assert_eq!(ptr.block_offset, 120);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordPtr {
    /// Identifier of the disk block holding the record.
    pub block_id: u32,
    /// Offset of the record within its block.
    pub block_offset: u32,
}

impl RecordPtr {
    /// Create a new record locator.
    #[inline]
    pub fn new(block_id: u32, block_offset: u32) -> Self {
        RecordPtr {
            block_id,
            block_offset,
        }
    }
}

impl fmt::Display for RecordPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record({}:{})", self.block_id, self.block_offset)
    }
}
