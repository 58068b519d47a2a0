//! Configuration constants for blockindex.

/// Size of a storage page in bytes (4KB).
///
/// The tree itself never performs I/O, but its order is conventionally
/// derived from the page budget of the enclosing storage engine so that
/// one node maps onto one page:
/// - OS page size on most systems (4096 bytes)
/// - Common database page sizes (PostgreSQL uses 8KB, but 4KB is also standard)
pub const PAGE_SIZE: usize = 4096;

/// Byte cost of one key slot (a 64-bit integer key).
pub const KEY_SIZE: usize = 8;

/// Byte cost of one record locator (block id + block offset, 4 bytes each).
pub const RECORD_PTR_SIZE: usize = 8;

/// Byte cost of one child reference in an internal node.
pub const CHILD_REF_SIZE: usize = 8;

/// Bytes reserved per node for bookkeeping (occupancy count, node kind,
/// sibling link).
pub const NODE_HEADER_SIZE: usize = 24;

/// Smallest order for which the split/merge arithmetic is well-defined.
///
/// With fewer than 3 keys per node a split cannot leave both halves at or
/// above the occupancy minimum.
pub const MIN_ORDER: usize = 3;

/// Derive the largest tree order whose node fits in `page_size` bytes.
///
/// A leaf of order `n` holds `n` entries (key + record locator); an
/// internal node holds `n` keys and `n + 1` child references. Key plus
/// child reference and key plus locator cost the same per slot, so the
/// internal layout's extra child reference sets the bound:
///
/// ```text
/// header + n * KEY_SIZE + (n + 1) * CHILD_REF_SIZE <= page_size
/// ```
///
/// The result is clamped to [`MIN_ORDER`] so a tiny budget still yields a
/// usable tree.
///
/// # Example
/// ```
/// use blockindex::common::config::{order_for_page_size, PAGE_SIZE};
///
/// let order = order_for_page_size(PAGE_SIZE);
/// assert!(order >= 3);
/// ```
pub fn order_for_page_size(page_size: usize) -> usize {
    let budget = page_size.saturating_sub(NODE_HEADER_SIZE + CHILD_REF_SIZE);
    let per_slot = KEY_SIZE + CHILD_REF_SIZE;
    (budget / per_slot).max(MIN_ORDER)
}
