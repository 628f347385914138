//! Description of various properties of the allocations.

use crate::utils::PowerOf2;

use super::AllocError;

/// The size, in bytes, of the header preceding every data region.
///
/// The header holds 5 fields of 4 bytes each: size, previous, next, free, and marker.
pub const HEADER_SIZE: usize = 20;

/// Rounds `x` up to the next multiple of 4.
///
/// Identity if `x` is already a multiple of 4, None if the rounded value overflows a `usize`.
pub const fn align4(x: usize) -> Option<usize> { ALIGNMENT.checked_round_up(x) }

/// Address
///
/// The address of a data region, expressed as an offset from the start of the arena.
///
/// An `Address` is only meaningful for the `Heap` which produced it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Address(usize);

impl Address {
    /// Creates a new instance with a specific offset.
    pub const fn new(offset: usize) -> Self { Self(offset) }

    /// Returns the underlying offset.
    pub const fn value(&self) -> usize { self.0 }
}

/// AllocationSize
///
/// The effective size of a given allocation: the requested size, rounded up to a multiple of 4.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct AllocationSize(usize);

impl AllocationSize {
    /// Creates an instance from a requested size.
    ///
    /// A request for 0 bytes is served with the minimum allocation size, so that the returned address always lies
    /// strictly within the carved region of the arena.
    ///
    /// Returns an error if rounding up overflows.
    pub fn from_request(size: usize) -> Result<Self, AllocError> {
        let size = size.max(MIN_ALLOCATION_SIZE);

        align4(size).map(Self).ok_or(AllocError::Overflow)
    }

    /// Returns the minimum allocation size.
    pub const fn minimum() -> Self { Self(MIN_ALLOCATION_SIZE) }

    /// Returns the underlying value.
    pub const fn value(&self) -> usize { self.0 }
}

/// BlockInfo
///
/// A snapshot of a block of the heap, as reported by `Heap::blocks`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct BlockInfo {
    /// The address of the data region.
    pub address: Address,
    /// The usable size of the data region, excluding the header.
    pub size: usize,
    /// Whether the block is currently unallocated.
    pub free: bool,
}

//
//  Implementation Details.
//

//  All sizes, and therefore all addresses, are multiples of 4.
pub(crate) const ALIGNMENT: PowerOf2 = unsafe { PowerOf2::new_unchecked(4) };

const MIN_ALLOCATION_SIZE: usize = 4;

// mod tests
