//! Error taxonomy for the heap engine.
//!
//! The public malloc-family operations (`alloc`, `free`, `realloc`,
//! `calloc`) keep the C-shaped "null on failure" contract required by
//! callers that treat this crate as a drop-in allocator backend. Internally
//! every fallible step returns a [`AllocError`] so the failure reason can be
//! logged before it is collapsed to a null pointer at the public boundary.

use thiserror::Error;

/// Failure modes the heap engine can encounter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocError {
  /// The page provider declined to grant additional bytes.
  #[error("page provider refused to grant {requested} additional bytes")]
  PageProviderFailed {
    /// The byte count that was requested and refused.
    requested: usize,
  },

  /// `nmemb * size` overflowed while computing a `calloc` request.
  #[error("calloc size overflow: {nmemb} * {size}")]
  SizeOverflow {
    /// Requested element count.
    nmemb: usize,
    /// Requested element size.
    size: usize,
  },
}
