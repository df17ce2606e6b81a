//! The explicit free list: a doubly-linked overlay threaded through the
//! payload of every free block, LIFO at a single head pointer.
//!
//! The list has no separate sentinel node; the permanently-allocated
//! prologue block plays that role. [`remove`] relies on every free block's
//! successor eventually resolving to a valid address (the prologue) so the
//! unconditional `pred` write on the successor never targets garbage.

use crate::block::{pred, set_pred, set_succ, succ};

/// Inserts `bp` at the head of the free list rooted at `*head`.
///
/// # Safety
/// `bp` must be a free block not already in the list; `*head` must be a
/// valid free-list node (possibly the prologue).
pub unsafe fn insert_at_head(head: &mut *mut u8, bp: *mut u8) {
  unsafe {
    set_succ(bp, *head);
    set_pred(*head, bp);
    set_pred(bp, std::ptr::null_mut());
    *head = bp;
  }
}

/// Unlinks `bp` from the free list rooted at `*head`.
///
/// # Safety
/// `bp` must currently be a member of the list.
pub unsafe fn remove(head: &mut *mut u8, bp: *mut u8) {
  unsafe {
    let p = pred(bp);
    if !p.is_null() {
      set_succ(p, succ(bp));
    } else {
      *head = succ(bp);
    }
    // The prologue is a permanent non-null terminal successor, so this
    // write always lands on a valid free-list node even when `bp` was the
    // last real entry before it.
    set_pred(succ(bp), p);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::block::{MINIMUM, write_block};
  use std::ptr;

  /// Lays down three adjacent minimum-sized free blocks in a flat buffer
  /// and returns their payload pointers, plus a stand-in "prologue" block
  /// acting as the permanent list terminus.
  fn three_blocks() -> (Vec<u8>, *mut u8, *mut u8, *mut u8, *mut u8) {
    let mut buf = vec![0u8; 4 * MINIMUM];
    let base = buf.as_mut_ptr();
    unsafe {
      let prologue = base.add(4);
      let a = prologue.add(MINIMUM);
      let b = a.add(MINIMUM);
      let c = b.add(MINIMUM);
      write_block(prologue, MINIMUM, true);
      write_block(a, MINIMUM, false);
      write_block(b, MINIMUM, false);
      write_block(c, MINIMUM, false);
      // prologue never participates as a normal node's pred/succ target
      // except as the terminal successor.
      set_succ(prologue, prologue);
      set_pred(prologue, ptr::null_mut());
      (buf, prologue, a, b, c)
    }
  }

  #[test]
  fn insert_then_remove_restores_single_node_list() {
    let (_buf, prologue, a, _b, _c) = three_blocks();
    let mut head = prologue;

    unsafe {
      insert_at_head(&mut head, a);
      assert_eq!(head, a);
      assert_eq!(succ(a), prologue);
      assert!(pred(a).is_null());
      assert_eq!(pred(prologue), a);

      remove(&mut head, a);
      assert_eq!(head, prologue);
      assert_eq!(pred(prologue), ptr::null_mut());
    }
  }

  #[test]
  fn lifo_ordering_and_symmetric_links() {
    let (_buf, prologue, a, b, c) = three_blocks();
    let mut head = prologue;

    unsafe {
      insert_at_head(&mut head, a);
      insert_at_head(&mut head, b);
      insert_at_head(&mut head, c);

      // Most recently inserted is first.
      assert_eq!(head, c);
      assert_eq!(succ(c), b);
      assert_eq!(succ(b), a);
      assert_eq!(succ(a), prologue);

      // Symmetric in the other direction too.
      assert_eq!(pred(prologue), a);
      assert_eq!(pred(a), b);
      assert_eq!(pred(b), c);
      assert!(pred(c).is_null());
    }
  }

  #[test]
  fn remove_from_middle_splices_neighbors() {
    let (_buf, prologue, a, b, c) = three_blocks();
    let mut head = prologue;

    unsafe {
      insert_at_head(&mut head, a);
      insert_at_head(&mut head, b);
      insert_at_head(&mut head, c);

      remove(&mut head, b);

      assert_eq!(head, c);
      assert_eq!(succ(c), a);
      assert_eq!(pred(a), c);
    }
  }
}
