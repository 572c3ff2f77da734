//! Internal error type for the allocator's fallible inner operations.
//!
//! The public facade (`allocate`/`free`/`reallocate`) collapses every
//! variant here to a null pointer or no-op per the external contract;
//! this type exists so `trace.rs` can report *why* a request was
//! rejected.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Requested payload size was zero.
    ZeroSize,
    /// Requested payload size exceeded `i32::MAX`.
    RequestTooLarge,
    /// The segment collaborator could not extend the heap.
    SegmentExhausted,
}

impl AllocError {
    /// Static description, used by `Display` and by the zero-allocation
    /// tracer hook.
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocError::ZeroSize => "requested allocation size is zero",
            AllocError::RequestTooLarge => "requested allocation size exceeds INT_MAX",
            AllocError::SegmentExhausted => "segment collaborator could not extend the heap",
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
