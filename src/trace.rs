//! Diagnostic seam.
//!
//! `heavenos-kernel` logs through a `serial_println!` macro wired to a
//! UART; this crate has no hardware to hang that on, so the equivalent
//! hook is a trait a caller can implement. The default build costs
//! nothing — `NullTracer` inlines away to nothing.

use crate::error::AllocError;

pub trait Tracer {
    fn event(&self, msg: &str);

    /// Report a rejected request. Default impl routes through `event`
    /// using `AllocError`'s static description, so no implementor pays
    /// for string formatting it doesn't want.
    fn error(&self, err: AllocError) {
        self.event(err.as_str());
    }
}

pub struct NullTracer;

impl Tracer for NullTracer {
    #[inline(always)]
    fn event(&self, _msg: &str) {}
}

#[cfg(feature = "std")]
pub struct StderrTracer;

#[cfg(feature = "std")]
impl Tracer for StderrTracer {
    fn event(&self, msg: &str) {
        extern crate std;
        std::eprintln!("[segfit-alloc] {}", msg);
    }
}
