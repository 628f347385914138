//! Errors reported by the heap.

use core::fmt;

/// AllocError
///
/// The reasons for which a heap operation may fail.
///
/// None of those failures leave the heap in an inconsistent state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum AllocError {
    /// The arena capacity is exhausted.
    OutOfMemory,
    /// The address was not produced by this heap, or was already freed.
    InvalidAddress,
    /// The computation of the requested size overflowed.
    Overflow,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::OutOfMemory => f.write_str("out of memory: arena capacity exhausted"),
            AllocError::InvalidAddress => f.write_str("invalid address: not a live allocation of this heap"),
            AllocError::Overflow => f.write_str("overflow: requested size is not representable"),
        }
    }
}

impl core::error::Error for AllocError {}
