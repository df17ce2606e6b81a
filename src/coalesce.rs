//! Coalescing: merges a freed block with physically adjacent free
//! neighbors, using boundary-tag lookups to find them in O(1).

use crate::block::{block_size, is_allocated, next_blkp, prev_blkp, write_block};
use crate::free_list::{insert_at_head, remove};

/// Coalesces `bp` (already marked free) with its physical neighbors and
/// splices the result into the free list.
///
/// Returns the payload pointer of the block that ends up holding the
/// (possibly merged) free region; this may not be `bp` itself when the
/// previous neighbor absorbs it.
///
/// # Safety
/// `bp` must be a just-freed or newly-extended block with a valid header
/// and footer; its physical neighbors (one word below and at `bp + size`)
/// must have valid headers.
pub unsafe fn coalesce(head: &mut *mut u8, bp: *mut u8) -> *mut u8 {
  unsafe {
    let prev = prev_blkp(bp);
    // A block abutting the prologue can have its PREV_BLKP computation
    // alias back onto itself at the heap's low edge; treat that
    // pathological case as "previous is allocated" rather than dereferencing
    // a block's own header as if it belonged to a neighbor.
    let prev_alloc = prev == bp || is_allocated(prev);
    let next = next_blkp(bp);
    let next_alloc = is_allocated(next);
    let size = block_size(bp);

    match (prev_alloc, next_alloc) {
      (true, true) => {
        insert_at_head(head, bp);
        bp
      }
      (true, false) => {
        let merged = size + block_size(next);
        remove(head, next);
        write_block(bp, merged, false);
        insert_at_head(head, bp);
        bp
      }
      (false, true) => {
        let merged = size + block_size(prev);
        remove(head, prev);
        write_block(prev, merged, false);
        insert_at_head(head, prev);
        prev
      }
      (false, false) => {
        let merged = size + block_size(prev) + block_size(next);
        remove(head, prev);
        remove(head, next);
        write_block(prev, merged, false);
        insert_at_head(head, prev);
        prev
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::block::{MINIMUM, WORD, pred, succ};
  use std::ptr;

  /// A flat test heap: `[pad(4) | prologue | block... | epilogue]`, mirroring
  /// the real layout closely enough to exercise coalescing in isolation.
  struct TestHeap {
    _buf: Vec<u8>,
    prologue: *mut u8,
  }

  impl TestHeap {
    fn new(free_block_count: usize, block_size: usize) -> Self {
      let total = WORD + MINIMUM + free_block_count * block_size + WORD;
      let mut buf = vec![0u8; total];
      let base = buf.as_mut_ptr();
      unsafe {
        let prologue = base.add(WORD + WORD);
        write_block(prologue, MINIMUM, true);
        set_succ_pred_terminal(prologue);

        let mut cursor = prologue.add(MINIMUM);
        for _ in 0..free_block_count {
          write_block(cursor, block_size, false);
          cursor = cursor.add(block_size);
        }
        // Epilogue: zero-size allocated header immediately after the last block.
        crate::block::write_epilogue(cursor);

        Self { _buf: buf, prologue }
      }
    }

    unsafe fn block_at(&self, index: usize, block_size: usize) -> *mut u8 {
      unsafe { self.prologue.add(MINIMUM + index * block_size) }
    }
  }

  unsafe fn set_succ_pred_terminal(prologue: *mut u8) {
    unsafe {
      crate::block::set_succ(prologue, prologue);
      crate::block::set_pred(prologue, ptr::null_mut());
    }
  }

  #[test]
  fn both_neighbors_allocated_just_inserts() {
    let heap = TestHeap::new(1, 32);
    let mut head = heap.prologue;
    let bp = unsafe { heap.block_at(0, 32) };

    unsafe {
      // Mark neighbors allocated: prologue already is; force the synthetic
      // epilogue/next check by marking the block itself allocated first,
      // then freeing to exercise the "both allocated" path explicitly.
      write_block(bp, 32, true);
      write_block(bp, 32, false);
      let result = coalesce(&mut head, bp);
      assert_eq!(result, bp);
      assert_eq!(head, bp);
    }
  }

  #[test]
  fn free_next_neighbor_merges_forward() {
    let heap = TestHeap::new(2, 32);
    let mut head = heap.prologue;
    let a = unsafe { heap.block_at(0, 32) };
    let b = unsafe { heap.block_at(1, 32) };

    unsafe {
      insert_at_head(&mut head, b);
      write_block(a, 32, true);
      write_block(a, 32, false);
      let result = coalesce(&mut head, a);
      assert_eq!(result, a);
      assert_eq!(block_size(a), 64);
      assert_eq!(head, a);
    }
  }

  #[test]
  fn free_prev_neighbor_merges_backward() {
    let heap = TestHeap::new(2, 32);
    let mut head = heap.prologue;
    let a = unsafe { heap.block_at(0, 32) };
    let b = unsafe { heap.block_at(1, 32) };

    unsafe {
      insert_at_head(&mut head, a);
      write_block(b, 32, true);
      write_block(b, 32, false);
      let result = coalesce(&mut head, b);
      assert_eq!(result, a);
      assert_eq!(block_size(a), 64);
      assert_eq!(head, a);
    }
  }

  #[test]
  fn both_neighbors_free_merges_three_way() {
    let heap = TestHeap::new(3, 32);
    let mut head = heap.prologue;
    let a = unsafe { heap.block_at(0, 32) };
    let b = unsafe { heap.block_at(1, 32) };
    let c = unsafe { heap.block_at(2, 32) };

    unsafe {
      insert_at_head(&mut head, a);
      insert_at_head(&mut head, c);
      write_block(b, 32, true);
      write_block(b, 32, false);
      let result = coalesce(&mut head, b);
      assert_eq!(result, a);
      assert_eq!(block_size(a), 96);
      assert_eq!(head, a);
      // The list should now contain exactly one node.
      assert_eq!(pred(heap.prologue), a);
      assert_eq!(succ(a), heap.prologue);
    }
  }
}
