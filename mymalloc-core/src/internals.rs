//! The internals of mymalloc-core.
//!
//! The internals provide all the heavy-lifting.

pub mod arena;
pub mod block;
pub mod directory;
