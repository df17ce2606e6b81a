//! The public heap engine: composes block layout, free list, coalescing,
//! and placement into `init`/`alloc`/`free`/`realloc`/`calloc`/`check`.
//!
//! A [`HeapEngine`] owns every piece of process-wide state the classic
//! malloc-lab implementation keeps as static globals (the heap's low/high
//! watermarks, via its [`PageProvider`], and the free-list head), so a
//! driver can hold more than one heap, and tests can run independent heaps
//! side by side.

use std::ptr;

use crate::align_up_8;
use crate::block::{
  DWORD, WORD, block_size, footer_ptr, is_allocated, next_blkp, read_header, set_pred, set_succ,
  tag_alloc, tag_size, write_block, write_epilogue,
};
use crate::coalesce::coalesce;
use crate::config::HeapConfig;
use crate::error::AllocError;
use crate::page::{PageProvider, SbrkPageProvider};
use crate::placement::{first_fit, place};

/// Snapshot of the heap's size and occupancy, for introspection by a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
  /// Total bytes granted by the page provider so far (excluding the initial
  /// padding/prologue/epilogue layout).
  pub heap_bytes: usize,
  /// Bytes currently held by allocated blocks (including their own
  /// header/footer overhead).
  pub allocated_bytes: usize,
  /// Bytes currently held by free blocks (including header/footer overhead).
  pub free_bytes: usize,
  /// Number of blocks reachable by address-order traversal, excluding the
  /// prologue and epilogue sentinels.
  pub block_count: usize,
}

/// An explicit free-list heap allocator over memory supplied by `P`.
pub struct HeapEngine<P: PageProvider> {
  provider: P,
  config: HeapConfig,
  prologue: *mut u8,
  free_list_head: *mut u8,
}

impl HeapEngine<SbrkPageProvider> {
  /// Convenience constructor backed by the host process's program break.
  pub fn with_sbrk() -> Result<Self, AllocError> {
    Self::new(SbrkPageProvider::new(), HeapConfig::default())
  }
}

impl<P: PageProvider> HeapEngine<P> {
  /// Initializes the heap: lays down the padding/prologue/epilogue and
  /// performs the first heap extension.
  ///
  /// Fails if either page request is refused, leaving no partial state
  /// behind (the provider itself is dropped with `self`).
  pub fn new(mut provider: P, config: HeapConfig) -> Result<Self, AllocError> {
    // Padding (WORD) + prologue (minimum_block) + epilogue header (WORD).
    let layout_bytes = WORD + config.minimum_block + WORD;
    let base = provider.extend(layout_bytes)?;

    let prologue = unsafe { base.add(WORD + WORD) };
    unsafe {
      write_block(prologue, config.minimum_block, true);
      set_pred(prologue, ptr::null_mut());
      set_succ(prologue, ptr::null_mut());
      write_epilogue(prologue.add(config.minimum_block));
    }

    let mut engine = Self { provider, config, prologue, free_list_head: prologue };
    unsafe {
      engine.extend_heap_bytes(config.initial_bytes)?;
    }
    log::debug!("heap initialized, prologue at {prologue:p}");
    Ok(engine)
  }

  /// Rounds `size` up to the nearest adjusted block size: payload rounded
  /// to 8 bytes plus header/footer overhead, floored at the minimum block.
  fn adjusted_size(&self, size: usize) -> usize {
    let with_overhead = align_up_8!(size) + DWORD;
    std::cmp::max(with_overhead, self.config.minimum_block)
  }

  /// Grows the heap by at least `words` machine words (rounded up to an
  /// even word count, and further up to the minimum block size), merging
  /// the new block with the previous tail if it was free.
  unsafe fn extend_heap_words(&mut self, words: usize) -> Result<*mut u8, AllocError> {
    let words = if words % 2 != 0 { words + 1 } else { words };
    let bytes = std::cmp::max(words * WORD, self.config.minimum_block);

    let bp = self.provider.extend(bytes)?;
    unsafe {
      write_block(bp, bytes, false);
      write_epilogue(bp.add(bytes));
    }
    log::trace!("heap extended by {bytes} bytes at {bp:p}");
    Ok(unsafe { coalesce(&mut self.free_list_head, bp) })
  }

  /// Byte-count wrapper over [`Self::extend_heap_words`]; `bytes` must
  /// already be a multiple of `WORD`, which every caller in this module
  /// guarantees by construction.
  unsafe fn extend_heap_bytes(&mut self, bytes: usize) -> Result<*mut u8, AllocError> {
    unsafe { self.extend_heap_words(bytes / WORD) }
  }

  /// Allocates `size` bytes and returns an 8-byte-aligned payload pointer,
  /// or null on a zero-size request or out-of-memory condition.
  pub fn alloc(&mut self, size: usize) -> *mut u8 {
    if size == 0 {
      return ptr::null_mut();
    }
    let asize = self.adjusted_size(size);

    unsafe {
      let hit = first_fit(self.free_list_head, asize);
      if !hit.is_null() {
        return place(&mut self.free_list_head, self.config.minimum_block, hit, asize);
      }

      let grow = std::cmp::max(asize, self.config.chunk_size);
      match self.extend_heap_bytes(grow) {
        Ok(bp) => place(&mut self.free_list_head, self.config.minimum_block, bp, asize),
        Err(err) => {
          log::warn!("alloc({size}) failed: {err}");
          ptr::null_mut()
        }
      }
    }
  }

  /// Frees a pointer previously returned by `alloc`/`realloc`/`calloc`.
  /// A null pointer is a no-op.
  ///
  /// # Safety
  /// `p` must have been returned by this engine and not already freed.
  /// Double-free or an invalid pointer is undefined behavior; it is not
  /// detected here.
  pub fn free(&mut self, p: *mut u8) {
    if p.is_null() {
      return;
    }
    unsafe {
      let size = block_size(p);
      write_block(p, size, false);
      coalesce(&mut self.free_list_head, p);
    }
  }

  /// Resizes a previous allocation, preserving its contents up to the
  /// smaller of the old and new sizes. `p == null` behaves as `alloc`;
  /// `size == 0` behaves as `free` and returns null.
  pub fn realloc(&mut self, p: *mut u8, size: usize) -> *mut u8 {
    if p.is_null() {
      return self.alloc(size);
    }
    if size == 0 {
      self.free(p);
      return ptr::null_mut();
    }

    unsafe {
      let old = block_size(p);
      let asize = self.adjusted_size(size);

      if old == asize {
        return p;
      }

      if asize < old {
        if old - asize <= self.config.minimum_block {
          // Remainder too small to form a valid block; leave it as slack.
          return p;
        }
        write_block(p, asize, true);
        let remainder = p.add(asize);
        write_block(remainder, old - asize, true);
        self.free(remainder);
        return p;
      }

      let new_p = self.alloc(size);
      if new_p.is_null() {
        return ptr::null_mut();
      }
      let copy_len = std::cmp::min(size, old - DWORD);
      ptr::copy_nonoverlapping(p, new_p, copy_len);
      self.free(p);
      new_p
    }
  }

  /// Allocates space for `nmemb` elements of `size` bytes each, zeroed.
  /// Returns null on multiplication overflow or out-of-memory.
  pub fn calloc(&mut self, nmemb: usize, size: usize) -> *mut u8 {
    let total = match nmemb.checked_mul(size) {
      Some(total) => total,
      None => {
        log::error!("{}", AllocError::SizeOverflow { nmemb, size });
        return ptr::null_mut();
      }
    };

    let p = self.alloc(total);
    if p.is_null() {
      return ptr::null_mut();
    }
    unsafe {
      ptr::write_bytes(p, 0, total);
    }
    p
  }

  /// Walks the heap in address order, checking header/footer consistency
  /// (I1), block sizing (I2), payload alignment (I3), and that no two
  /// adjacent blocks are both free (I4). Returns whether the heap is
  /// consistent; logs each violation found, and when `verbose` is set, also
  /// logs every block's tag plus a summary of the live block count and
  /// total free bytes.
  pub fn check(&self, verbose: bool) -> bool {
    let mut ok = true;
    let mut bp = self.prologue;
    let mut prev_free = false;
    let mut blocks = 0usize;
    let mut free_bytes = 0usize;

    unsafe {
      if !is_allocated(self.prologue) || block_size(self.prologue) != self.config.minimum_block {
        log::error!("prologue sentinel corrupted at {:p}", self.prologue);
        ok = false;
      }

      loop {
        let header = read_header(bp);
        let size = tag_size(header);
        let alloc = tag_alloc(header);

        if size == 0 {
          if !alloc {
            log::error!("epilogue at {bp:p} must be allocated");
            ok = false;
          }
          break;
        }

        let footer = ptr::read(footer_ptr(bp, size));
        if footer != header {
          log::error!("header/footer mismatch at {bp:p}: {header:#x} != {footer:#x}");
          ok = false;
        }
        if size % DWORD != 0 || size < self.config.minimum_block {
          log::error!("block at {bp:p} has invalid size {size}");
          ok = false;
        }
        if (bp as usize) % DWORD != 0 {
          log::error!("payload at {bp:p} is not {DWORD}-byte aligned");
          ok = false;
        }
        if prev_free && !alloc {
          log::error!("two adjacent free blocks meet at {bp:p}");
          ok = false;
        }

        if verbose {
          log::debug!("block {bp:p}: size={size} alloc={alloc}");
        }

        if !alloc {
          free_bytes += size;
        }
        prev_free = !alloc;
        blocks += 1;
        bp = next_blkp(bp);
      }
    }

    if verbose {
      log::debug!("check: {blocks} live blocks, {free_bytes} free bytes, consistent={ok}");
    }
    ok
  }

  /// Summarizes current heap occupancy by walking it in address order.
  pub fn stats(&self) -> HeapStats {
    let mut allocated_bytes = 0;
    let mut free_bytes = 0;
    let mut block_count = 0;
    let mut bp = self.prologue;

    unsafe {
      loop {
        let size = block_size(bp);
        if size == 0 {
          break;
        }
        if bp != self.prologue {
          block_count += 1;
          if is_allocated(bp) {
            allocated_bytes += size;
          } else {
            free_bytes += size;
          }
        }
        bp = next_blkp(bp);
      }
    }

    HeapStats {
      heap_bytes: allocated_bytes + free_bytes,
      allocated_bytes,
      free_bytes,
      block_count,
    }
  }
}
