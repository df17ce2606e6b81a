//! First-fit placement policy, with mandatory splitting when the surplus
//! admits a new minimum-sized block.

use crate::block::{block_size, is_allocated, succ, write_block};
use crate::coalesce::coalesce;
use crate::free_list::remove;

/// Searches the free list rooted at `head` for the first block whose size
/// is at least `asize`. Returns null on a miss.
///
/// Termination is guaranteed by the permanently-allocated prologue, which
/// eventually terminates every free-list walk.
///
/// # Safety
/// `head` must be a valid free-list node (the prologue when the list is empty).
pub unsafe fn first_fit(head: *mut u8, asize: usize) -> *mut u8 {
  unsafe {
    let mut current = head;
    while !is_allocated(current) {
      if block_size(current) >= asize {
        return current;
      }
      current = succ(current);
    }
    std::ptr::null_mut()
  }
}

/// Claims `bp` (a free block of size `>= asize` found by [`first_fit`]) for
/// an allocation of `asize` bytes, splitting off and reinserting the
/// remainder when it would itself be a valid minimum-sized block.
///
/// Returns `bp`, now marked allocated at exactly `asize` bytes.
///
/// # Safety
/// `bp` must currently be a member of the free list rooted at `head` with
/// `block_size(bp) >= asize`.
pub unsafe fn place(head: &mut *mut u8, minimum: usize, bp: *mut u8, asize: usize) -> *mut u8 {
  unsafe {
    let csize = block_size(bp);
    remove(head, bp);

    if csize - asize >= minimum {
      write_block(bp, asize, true);
      let remainder = bp.add(asize);
      write_block(remainder, csize - asize, false);
      coalesce(head, remainder);
    } else {
      write_block(bp, csize, true);
    }

    bp
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::block::{MINIMUM, WORD, write_epilogue};
  use crate::free_list::insert_at_head;
  use std::ptr;

  fn flat_heap(free_sizes: &[usize]) -> (Vec<u8>, *mut u8) {
    let total: usize = WORD + MINIMUM + free_sizes.iter().sum::<usize>() + WORD;
    let mut buf = vec![0u8; total];
    let base = buf.as_mut_ptr();
    unsafe {
      let prologue = base.add(WORD + WORD);
      write_block(prologue, MINIMUM, true);
      crate::block::set_succ(prologue, prologue);
      crate::block::set_pred(prologue, ptr::null_mut());

      let mut cursor = prologue.add(MINIMUM);
      for &size in free_sizes {
        write_block(cursor, size, false);
        cursor = cursor.add(size);
      }
      write_epilogue(cursor);
      (buf, prologue)
    }
  }

  #[test]
  fn first_fit_skips_too_small_blocks() {
    let (_buf, prologue) = flat_heap(&[32, 64, 128]);
    unsafe {
      let small = prologue.add(MINIMUM);
      let mid = small.add(32);
      let big = mid.add(64);

      let mut head = prologue;
      insert_at_head(&mut head, big);
      insert_at_head(&mut head, mid);
      insert_at_head(&mut head, small);

      let found = first_fit(head, 64);
      assert_eq!(found, mid);
    }
  }

  #[test]
  fn first_fit_miss_returns_null() {
    let (_buf, prologue) = flat_heap(&[32]);
    unsafe {
      let only = prologue.add(MINIMUM);
      let mut head = prologue;
      insert_at_head(&mut head, only);

      assert!(first_fit(head, 64).is_null());
    }
  }

  #[test]
  fn place_splits_when_surplus_allows_minimum_block() {
    let (_buf, prologue) = flat_heap(&[128]);
    unsafe {
      let bp = prologue.add(MINIMUM);
      let mut head = prologue;
      insert_at_head(&mut head, bp);

      let result = place(&mut head, MINIMUM, bp, 32);
      assert_eq!(result, bp);
      assert_eq!(block_size(bp), 32);
      assert!(is_allocated(bp));

      // Remainder (128 - 32 = 96 >= MINIMUM) was split off and reinserted.
      assert_eq!(head, bp.add(32));
      assert_eq!(block_size(head), 96);
      assert!(!is_allocated(head));
    }
  }

  #[test]
  fn place_consumes_whole_block_when_surplus_too_small() {
    // 32 requested, block is 40: surplus is 8, below MINIMUM (24), so the
    // whole block must be consumed rather than split into an invalid remainder.
    let (_buf, prologue) = flat_heap(&[40]);
    unsafe {
      let bp = prologue.add(MINIMUM);
      let mut head = prologue;
      insert_at_head(&mut head, bp);

      let result = place(&mut head, MINIMUM, bp, 32);
      assert_eq!(result, bp);
      assert_eq!(block_size(bp), 40);
      assert!(is_allocated(bp));
    }
  }
}
