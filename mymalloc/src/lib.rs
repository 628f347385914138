#![no_std]
#![deny(missing_docs)]

//! A Fixed-Arena Memory Allocator library.
//!
//! The type `MyAllocator` provides a memory allocator carving its allocations out of a single, process-wide, arena of
//! `ARENA_SIZE` bytes.
//!
//! #   Warning
//!
//! This allocator is not suitable for general use:
//!
//! -   The arena is tiny, and never grows.
//! -   All operations are serialized by a single spin lock.
//! -   Allocations are only aligned on 4 bytes.
//!
//! It may nonetheless be installed as `#[global_allocator]`, as long as the installed logger, if any, does not itself
//! allocate when `mymalloc` logs.

mod allocator;
mod storage;

pub use allocator::MyAllocator;
pub use storage::{ARENA_SIZE, MAX_ALIGNMENT};

use storage::{ArenaHandle, MyConfiguration};
