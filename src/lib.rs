//! # explist-alloc: an explicit free-list heap allocator
//!
//! A general-purpose dynamic memory allocator over a single, monotonically
//! growable heap region. It is the classic "malloc lab" design: boundary
//! tags for O(1) coalescing, an explicit doubly-linked free list threaded
//! through free payloads, first-fit placement with mandatory splitting, and
//! immediate coalescing on every free.
//!
//! ## Crate structure
//!
//! ```text
//!   explist_alloc
//!   ├── block       - boundary-tag layout and free-list pointer overlay
//!   ├── free_list    - insert/remove splice operations on the free list
//!   ├── coalesce     - the four-case boundary-tag coalescing engine
//!   ├── placement    - first-fit search and split-on-place
//!   ├── page         - the PageProvider contract + an sbrk(2)-backed impl
//!   ├── arena        - a fixed-capacity, non-relocating PageProvider
//!   ├── config       - tunable constants (HeapConfig)
//!   ├── error        - the AllocError taxonomy
//!   └── heap         - HeapEngine, composing all of the above
//! ```
//!
//! ## Heap layout
//!
//! ```text
//!  pad  prologue (permanently allocated, MINIMUM bytes)      epilogue
//!   │   ┌──────┬─────────┬─────────┬────────┐                 │
//!   └──►│ hdr  │  pred   │  succ   │ footer │ ... blocks ... ┌─┘
//!       └──────┴─────────┴─────────┴────────┘               │ hdr=0, alloc
//! ```
//!
//! Every block carries a 4-byte header and footer encoding `size | alloc`;
//! while free, its payload doubles as a doubly-linked free-list node
//! (`pred` at offset 0, `succ` at offset `DWORD`). The prologue is a
//! permanently allocated sentinel that seeds the free list and terminates
//! every forward search; the epilogue is a zero-sized allocated header that
//! terminates address-order traversal at the current high watermark.
//!
//! ## Quick start
//!
//! ```rust
//! use explist_alloc::HeapEngine;
//! use explist_alloc::arena::ArenaPageProvider;
//! use explist_alloc::config::HeapConfig;
//!
//! let mut heap = HeapEngine::new(ArenaPageProvider::with_capacity(1 << 20), HeapConfig::default())
//!     .expect("heap init should succeed");
//!
//! let p = heap.alloc(64);
//! assert!(!p.is_null());
//! assert_eq!(p as usize % 8, 0);
//! heap.free(p);
//! assert!(heap.check(false));
//! ```
//!
//! ## Safety
//!
//! Every public allocation operation is a thin, safe wrapper; the engine's
//! internals do raw pointer arithmetic over the heap region and are
//! unavoidably `unsafe`. The engine is single-threaded: callers must not
//! invoke it concurrently from multiple threads, and must not dereference,
//! write past, or introspect a pointer after freeing it.

pub mod align;
pub mod arena;
pub mod block;
pub mod coalesce;
pub mod config;
pub mod error;
pub mod free_list;
pub mod heap;
pub mod page;
pub mod placement;

pub use error::AllocError;
pub use heap::{HeapEngine, HeapStats};
pub use page::{PageProvider, SbrkPageProvider};
