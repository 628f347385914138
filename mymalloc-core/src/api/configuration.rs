//! The configuration of mymalloc-core.
//!
//! A heap is tuned at compile-time by a Configuration. The only tunable, at the moment, is the split threshold: the
//! slack which must remain, beyond a new header, for an oversized block to be split in two.
//!
//! Splitting is skipped when the remainder would be too small to be useful, trading a bit of wasted space for fewer,
//! larger, free fragments.

use core::marker::PhantomData;

use super::{AllocationSize, HEADER_SIZE};

/// Configuration
///
/// The Configuration instance allows adjusting the split policy of a heap.
pub trait Configuration {
    /// The minimum number of usable bytes a split-off remainder must have.
    ///
    /// Should be a multiple of 4, so that split-off blocks keep a 4-bytes aligned size.
    const SPLIT_THRESHOLD: usize;
}

/// DefaultConfiguration
///
/// A split threshold of 512 bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConfiguration;

impl Configuration for DefaultConfiguration {
    const SPLIT_THRESHOLD: usize = 512;
}

/// Properties
///
/// Properties of a given Configuration.
///
/// Work-around for the inability to implement static methods directly on a trait.
pub struct Properties<C>(PhantomData<C>);

impl<C> Properties<C>
    where
        C: Configuration
{
    /// Returns the size of a block header.
    pub const fn header_size() -> usize { HEADER_SIZE }

    /// Returns the split threshold.
    pub const fn split_threshold() -> usize { C::SPLIT_THRESHOLD }

    /// Returns the minimum surplus, in bytes, for a block to be split.
    ///
    /// The surplus must accommodate the header of the new block, in addition to the threshold.
    pub const fn minimum_split_surplus() -> usize { HEADER_SIZE + C::SPLIT_THRESHOLD }

    /// Returns whether a block of `block_size` bytes should be split to serve `size` bytes.
    pub fn should_split(block_size: usize, size: AllocationSize) -> bool {
        block_size
            .checked_sub(size.value())
            .map(|surplus| surplus >= Self::minimum_split_surplus())
            .unwrap_or(false)
    }
}

// mod tests
