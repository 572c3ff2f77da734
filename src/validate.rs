//! Heap validator.
//!
//! Walks every size-class free list and checks the structural invariants
//! the allocator depends on but never verifies on the hot path: no
//! allocated block reachable from a free list, no cycles, every block
//! within the segment's extended bounds.

use crate::free_list::{next_free, FreeLists};
use crate::{CLASS_COUNT, HEADER_SIZE, MIN_BLOCK_SIZE};

/// Returns `true` iff every free list contains only blocks with
/// `alloc = 0`, every block's recorded `class_index` is in range, every
/// list terminates within a bounded number of hops (catching cycles),
/// and every free block lies within the segment's extended bounds.
pub fn validate(lists: &FreeLists, segment_base: *mut u8, segment_len: usize) -> bool {
    if segment_len == 0 {
        return (0..CLASS_COUNT).all(|class| lists.head(class).is_null());
    }

    let base = segment_base as usize;
    let end = base + segment_len;
    // A cycle can never produce more distinct hops than the heap could
    // possibly hold blocks; exceeding this is conclusive evidence of one.
    let max_hops = segment_len / MIN_BLOCK_SIZE + 1;

    for class in 0..CLASS_COUNT {
        let mut cur = lists.head(class);
        let mut hops = 0usize;

        while !cur.is_null() {
            hops += 1;
            if hops > max_hops {
                return false;
            }

            let addr = cur as usize;
            if addr < base || addr >= end {
                return false;
            }

            let header = unsafe { &*cur };
            if header.is_allocated() {
                return false;
            }
            if header.class_index() >= CLASS_COUNT {
                return false;
            }

            let footprint = HEADER_SIZE + header.payload_sz();
            if addr + footprint > end {
                return false;
            }

            cur = unsafe { next_free(cur) };
        }
    }

    true
}
