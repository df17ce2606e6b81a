//! A fixed-capacity, non-relocating [`PageProvider`](crate::page::PageProvider)
//! backed by a single boxed byte slice.
//!
//! Unlike `sbrk`-backed growth this never touches process-global state, so
//! multiple independent heaps can coexist in one process (essential for
//! running the engine's test suite), and a reasonable standalone backing for
//! an embedded deployment that has no `sbrk`.

use crate::error::AllocError;
use crate::page::PageProvider;

/// A page provider that hands out successive slices of a single
/// pre-reserved buffer. The buffer is never reallocated, so pointers handed
/// out remain valid for the provider's lifetime.
pub struct ArenaPageProvider {
  storage: Box<[u8]>,
  base: *mut u8,
  used: usize,
}

impl ArenaPageProvider {
  /// Reserves `capacity` bytes up front. `extend` calls beyond this
  /// capacity fail as if the page provider had been exhausted.
  pub fn with_capacity(capacity: usize) -> Self {
    let mut storage = vec![0u8; capacity].into_boxed_slice();
    let base = storage.as_mut_ptr();
    Self { storage, base, used: 0 }
  }
}

impl PageProvider for ArenaPageProvider {
  fn extend(&mut self, bytes: usize) -> Result<*mut u8, AllocError> {
    if self.used.saturating_add(bytes) > self.storage.len() {
      log::error!(
        "arena exhausted: requested {bytes} bytes with {} remaining",
        self.storage.len() - self.used
      );
      return Err(AllocError::PageProviderFailed { requested: bytes });
    }
    let start = unsafe { self.base.add(self.used) };
    self.used += bytes;
    Ok(start)
  }

  fn high_watermark(&self) -> *mut u8 {
    unsafe { self.base.add(self.used) }
  }
}
