//! A segregated-fit heap allocator with boundary tags, running on top of a
//! single arena that can only grow.
//!
//! A [`Heap`] hands out [`Payload`] handles (byte offsets into its arena)
//! from blocks it carves out of the arena. Every block carries a header and a
//! footer word with its size and allocated flag, which lets a freed block find
//! both of its physical neighbours and merge with them right away. Free
//! blocks are indexed by 32 power-of-two size classes whose list heads, like
//! the list links themselves, live inside the arena bytes.
//! ```rust
//! use segfit::Heap;
//!
//! let mut heap = Heap::new().unwrap();
//! let ptr = heap.allocate(11).unwrap();
//!
//! heap.payload_mut(ptr).unwrap()[..11].copy_from_slice(b"Hello Alloc");
//! assert_eq!(&heap.payload(ptr).unwrap()[..11], b"Hello Alloc");
//!
//! heap.release(ptr).unwrap();
//! assert!(heap.check());
//! ```
//!
//! Reallocation always moves: a new block is allocated, the payload copied,
//! and the old block released.
//! ```rust
//! use segfit::Heap;
//!
//! let mut heap = Heap::new().unwrap();
//! let ptr = heap.allocate(4).unwrap();
//!
//! heap.payload_mut(ptr).unwrap()[..4].copy_from_slice(&[1, 2, 3, 4]);
//!
//! let bigger = heap.reallocate(Some(ptr), 400).unwrap();
//! assert_eq!(&heap.payload(bigger).unwrap()[..4], &[1, 2, 3, 4]);
//! ```
//!
//! The heap is single threaded. Any [`Arena`] can back it; [`VecArena`] is a
//! capped, zero filled byte vector.
mod allocator;
mod config;
mod error;
mod logging;
mod metrics;
mod trace;

pub use allocator::constants::{BUCKETS_COUNT, CHUNK_SIZE, MIN_BLOCK_SIZE, PREFIX_SIZE};
pub use allocator::{Arena, BlockInfo, Heap, Payload, VecArena};
pub use config::HeapConfig;
pub use error::{AllocError, HeapViolation, TraceError};
pub use metrics::HeapMetrics;
pub use trace::{ReplayStats, Trace, TraceOp};
