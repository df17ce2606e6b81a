//! The page-provider contract: the engine's sole external collaborator.
//!
//! A page provider grants additional contiguous bytes immediately following
//! the prior high watermark, or reports failure. It never moves or revokes
//! memory it has already granted.

use crate::error::AllocError;

/// A source of contiguous, growable heap memory.
pub trait PageProvider {
  /// Requests `bytes` additional contiguous bytes, returning a pointer to
  /// the start of the new region (immediately following the prior high
  /// watermark) or an error if the request was refused.
  fn extend(&mut self, bytes: usize) -> Result<*mut u8, AllocError>;

  /// The current high watermark, one past the last byte ever granted.
  fn high_watermark(&self) -> *mut u8;
}

/// A [`PageProvider`] backed by the host process's program break via
/// `sbrk(2)`.
///
/// This mirrors the classic malloc-lab memory model: the heap is the tail
/// of the process data segment, grown monotonically and never returned to
/// the operating system for the engine's lifetime.
pub struct SbrkPageProvider {
  high_watermark: *mut u8,
}

impl SbrkPageProvider {
  /// Creates a provider anchored at the current program break.
  pub fn new() -> Self {
    let high_watermark = unsafe { libc::sbrk(0) as *mut u8 };
    Self { high_watermark }
  }
}

impl Default for SbrkPageProvider {
  fn default() -> Self {
    Self::new()
  }
}

impl PageProvider for SbrkPageProvider {
  fn extend(&mut self, bytes: usize) -> Result<*mut u8, AllocError> {
    let raw = unsafe { libc::sbrk(bytes as libc::intptr_t) };
    if raw == usize::MAX as *mut libc::c_void {
      log::error!("sbrk refused to grant {bytes} bytes");
      return Err(AllocError::PageProviderFailed { requested: bytes });
    }
    let start = raw as *mut u8;
    self.high_watermark = unsafe { start.add(bytes) };
    log::trace!("sbrk granted {bytes} bytes at {start:p}, break now {:p}", self.high_watermark);
    Ok(start)
  }

  fn high_watermark(&self) -> *mut u8 {
    self.high_watermark
  }
}
