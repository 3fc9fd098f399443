//! Small-buffer collection primitives backing `radix-router`'s parameter list.
//!
//! Everything here exists to let a match produce its parameter bindings without
//! touching the allocator, as long as the route stays within the inline bound. None
//! of it is unsafe by necessity; it exists because the const-generic, fixed-capacity
//! ring buffer it implements has no equivalent in `core` or `alloc`.

#![no_std]

extern crate alloc;

pub mod bound_queue;
pub mod uninit;

#[cfg(feature = "bytes-str")]
pub mod bytes;
