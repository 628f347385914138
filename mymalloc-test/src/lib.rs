#![deny(missing_docs)]

//! A collection of utilities for testing heaps.
//!
//! -   `Pattern` fills allocations with a recognizable byte sequence, and checks it is still intact later on.
//! -   `Workload` generates a reproducible stream of allocate, free, and reallocate operations.

mod pattern;
mod workload;

pub use pattern::Pattern;
pub use workload::{Operation, Workload};
