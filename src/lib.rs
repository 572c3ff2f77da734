//! A segregated-fit free-list heap allocator over a page-extensible
//! segment.
//!
//! Requests are rounded and classified into one of `CLASS_COUNT`
//! power-of-two size-class buckets, each backed by an intrusive
//! singly-linked free list; a first-fit search splits remainders either
//! back into the same class (once that class is "hot") or into the
//! class matching the remainder's own size; and a dedicated
//! reallocation class, pre-saturated into the hot state at `init`,
//! isolates blocks produced by `reallocate` from ordinary allocation
//! traffic.
//!
//! The page-granular heap segment itself is out of scope — see the
//! [`Segment`] trait — as is thread safety: every operation takes
//! `&mut self` and callers must externally serialize concurrent access.

#![no_std]

extern crate alloc;

mod allocator;
mod error;
mod free_list;
mod header;
mod hit_counter;
mod segment;
mod size_class;
mod trace;
mod validate;

pub use allocator::SegregatedFitAllocator;
pub use error::AllocError;
pub use segment::Segment;
pub use trace::{NullTracer, Tracer};

#[cfg(feature = "std")]
pub use trace::StderrTracer;

#[cfg(test)]
pub use segment::VecSegment;

/// Bytes occupied by a block header.
pub const HEADER_SIZE: usize = 8;
/// Required alignment of every block footprint.
pub const ALIGNMENT: usize = 8;
/// Minimum block footprint (header + payload).
pub const MIN_BLOCK_SIZE: usize = 16;
/// Number of size-class free lists.
pub const CLASS_COUNT: usize = 28;
/// Index of the dedicated reallocation class.
pub const REALLOC_CLASS: usize = CLASS_COUNT - 1;
/// Smallest size-class exponent: class 0 covers `[2^MIN_EXPONENT, 2^(MIN_EXPONENT+1))`.
pub const MIN_EXPONENT: u32 = 4;
/// Hit-counter threshold past which a class's adaptive policy engages.
pub const HIT_SENSOR: u32 = 150_000;
/// Largest request size accepted by `allocate`/`reallocate`.
pub const INT_MAX: usize = i32::MAX as usize;

static_assertions::const_assert_eq!(REALLOC_CLASS, 27);
