//! Block layout: boundary tags and the free-block pointer overlay.
//!
//! Every block is addressed by its *payload pointer* `bp` (the address
//! handed to callers, one word past the header). All offsets below are
//! relative to `bp`:
//!
//! ```text
//!  bp-WORD        bp                                   bp+size-DWORD  bp+size-WORD
//!     │           │                                          │              │
//!     ▼           ▼                                          ▼              ▼
//!     ┌───────────┬──────────────────────────────────────────┬──────────────┐
//!     │  header   │                 payload                  │    footer    │
//!     └───────────┴──────────────────────────────────────────┴──────────────┘
//! ```
//!
//! While a block is free, its payload carries the free-list overlay instead
//! of caller data: `pred` at offset 0, `succ` at offset `DWORD`. This
//! assumes a 64-bit host, where a pointer is exactly `DWORD` (8) bytes wide,
//! the same assumption that sizes `MINIMUM` as header + pred + succ +
//! footer.

use std::ptr;

/// Machine word size used for header/footer tags.
pub const WORD: usize = 4;
/// Pointer width; also the granularity of the alignment guarantee.
pub const DWORD: usize = 8;
/// Smallest permitted block size: header(4) + pred(8) + succ(8) + footer(4).
pub const MINIMUM: usize = 24;
/// Minimum increment by which the heap is grown on an extension miss.
pub const CHUNKSIZE: usize = 4096;

/// The allocated-bit mask within a packed header/footer word.
const ALLOC_BIT: u32 = 0x1;

/// Packs a block size and allocation flag into a single boundary-tag word.
#[inline]
pub const fn pack(size: usize, alloc: bool) -> u32 {
  (size as u32) | (alloc as u32 & ALLOC_BIT)
}

/// Extracts the block size from a packed tag.
#[inline]
pub const fn tag_size(tag: u32) -> usize {
  (tag & !(ALLOC_BIT)) as usize
}

/// Extracts the allocation flag from a packed tag.
#[inline]
pub const fn tag_alloc(tag: u32) -> bool {
  tag & ALLOC_BIT != 0
}

/// Address of the header word for the block whose payload starts at `bp`.
///
/// # Safety
/// `bp` must point one word past a valid header.
#[inline]
pub unsafe fn header_ptr(bp: *mut u8) -> *mut u32 {
  unsafe { bp.sub(WORD) as *mut u32 }
}

/// Address of the footer word for a block of size `size` whose payload
/// starts at `bp`.
///
/// # Safety
/// `[bp, bp + size)` must be a valid block.
#[inline]
pub unsafe fn footer_ptr(bp: *mut u8, size: usize) -> *mut u32 {
  unsafe { bp.add(size - DWORD) as *mut u32 }
}

/// Reads the header tag.
///
/// # Safety
/// Same as [`header_ptr`].
#[inline]
pub unsafe fn read_header(bp: *mut u8) -> u32 {
  unsafe { ptr::read(header_ptr(bp)) }
}

/// Size of the block addressed by `bp`, read from its header.
///
/// # Safety
/// Same as [`header_ptr`].
#[inline]
pub unsafe fn block_size(bp: *mut u8) -> usize {
  unsafe { tag_size(read_header(bp)) }
}

/// Whether the block addressed by `bp` is currently allocated.
///
/// # Safety
/// Same as [`header_ptr`].
#[inline]
pub unsafe fn is_allocated(bp: *mut u8) -> bool {
  unsafe { tag_alloc(read_header(bp)) }
}

/// Writes matching header and footer tags for a block of `size` bytes.
///
/// # Safety
/// `[bp - WORD, bp + size - WORD)` must be writable and part of the heap.
pub unsafe fn write_block(bp: *mut u8, size: usize, alloc: bool) {
  unsafe {
    let tag = pack(size, alloc);
    ptr::write(header_ptr(bp), tag);
    ptr::write(footer_ptr(bp, size), tag);
  }
}

/// Writes the zero-sized epilogue header at `bp`. Unlike a real block the
/// epilogue has no footer: there is no previous-block lookup across it, so
/// nothing ever reads one.
///
/// # Safety
/// `bp - WORD` must be a writable word at the heap's current high watermark.
pub unsafe fn write_epilogue(bp: *mut u8) {
  unsafe {
    ptr::write(header_ptr(bp), pack(0, true));
  }
}

/// Payload pointer of the block physically following `bp`.
///
/// # Safety
/// `bp`'s header must be valid and the next block must lie within the heap
/// (true for every block up to and including the epilogue).
#[inline]
pub unsafe fn next_blkp(bp: *mut u8) -> *mut u8 {
  unsafe { bp.add(block_size(bp)) }
}

/// Address of the previous block's footer, one word below `bp`'s header.
///
/// # Safety
/// There must be a valid block footer immediately below `bp`'s header.
#[inline]
unsafe fn prev_footer_ptr(bp: *mut u8) -> *mut u32 {
  unsafe { bp.sub(DWORD) as *mut u32 }
}

/// Payload pointer of the block physically preceding `bp`, computed by
/// reading the previous block's footer.
///
/// # Safety
/// `bp` must not be the very first payload in the heap (the prologue);
/// callers at the heap's low edge must special-case that instead of calling
/// this (see the coalescing engine's prologue-adjacency handling).
#[inline]
pub unsafe fn prev_blkp(bp: *mut u8) -> *mut u8 {
  unsafe {
    let prev_size = tag_size(ptr::read(prev_footer_ptr(bp)));
    bp.sub(prev_size)
  }
}

/// Reads the predecessor free-list link stored in a free block's payload.
///
/// # Safety
/// `bp` must address a free block (or the prologue, which seeds the list).
#[inline]
pub unsafe fn pred(bp: *mut u8) -> *mut u8 {
  unsafe { ptr::read(bp as *mut *mut u8) }
}

/// Writes the predecessor free-list link.
///
/// # Safety
/// Same as [`pred`].
#[inline]
pub unsafe fn set_pred(bp: *mut u8, p: *mut u8) {
  unsafe { ptr::write(bp as *mut *mut u8, p) }
}

/// Reads the successor free-list link stored in a free block's payload.
///
/// # Safety
/// Same as [`pred`].
#[inline]
pub unsafe fn succ(bp: *mut u8) -> *mut u8 {
  unsafe { ptr::read(bp.add(DWORD) as *mut *mut u8) }
}

/// Writes the successor free-list link.
///
/// # Safety
/// Same as [`pred`].
#[inline]
pub unsafe fn set_succ(bp: *mut u8, s: *mut u8) {
  unsafe { ptr::write(bp.add(DWORD) as *mut *mut u8, s) }
}
