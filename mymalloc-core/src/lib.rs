#![no_std]

#![deny(missing_docs)]

//! Building blocks for a fixed-arena allocator.
//!
//! mymalloc-core manages a fixed-capacity byte arena as if it were a process heap. It contains:
//! -   A `Configuration` trait, used to tune the split policy at compile-time.
//! -   A `Heap` type, owning its arena storage and exposing allocate, zero-allocate, reallocate and free.
//!
//! Block headers live within the arena itself, and link to their neighbours by offset rather than by pointer, so that
//! the whole heap can be inspected and validated without a single line of pointer arithmetic.

#[cfg(test)]
extern crate std;

mod api;
mod internals;
mod utils;

pub use api::*;
