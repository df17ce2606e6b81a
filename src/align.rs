//! Alignment helpers.
//!
//! Every payload handed back to a caller must sit on an 8-byte boundary
//! (`DWORD`), independent of the host's native pointer width, so the
//! rounding here is pinned to a fixed constant rather than
//! `mem::size_of::<usize>()`.

/// Rounds `value` up to the next multiple of `DWORD` (8 bytes).
///
/// # Examples
///
/// ```rust
/// use explist_alloc::align_up_8;
///
/// assert_eq!(align_up_8!(1), 8);
/// assert_eq!(align_up_8!(8), 8);
/// assert_eq!(align_up_8!(9), 16);
/// ```
#[macro_export]
macro_rules! align_up_8 {
  ($value:expr) => {
    (($value) + $crate::block::DWORD - 1) & !($crate::block::DWORD - 1)
  };
}
