//! Block Header.
//!
//! A Block is a header, directly followed by its data region. The header is stored within the arena itself:
//!
//! ```text
//!   offset   field      content
//!        0   size       usable bytes of the data region, excluding the header
//!        4   previous   offset of the previous block header, or NIL
//!        8   next       offset of the next block header, or NIL
//!       12   free       1 if the block is unallocated, 0 otherwise
//!       16   marker     offset of the data region, used to authenticate addresses
//!       20   data...
//! ```
//!
//! A `Block` is merely the offset of such a header; it is `Copy`, and all accesses go through the `Arena`.

use core::ops::Range;

use crate::{api::ALIGNMENT, Address, Storage, HEADER_SIZE};

use super::arena::Arena;

/// Block.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub(crate) struct Block(u32);

impl Block {
    /// Creates a Block for the header at `offset`.
    pub(crate) fn from_offset(offset: usize) -> Self {
        debug_assert!(offset < NIL as usize);

        Self(offset as u32)
    }

    /// Creates a Block for the data region at `address`, if the header would not start before the arena.
    ///
    /// No check is performed that the header is actually valid.
    pub(crate) fn from_address(address: Address) -> Option<Self> {
        address.value()
            .checked_sub(HEADER_SIZE)
            .filter(|offset| *offset < NIL as usize)
            .map(Self::from_offset)
    }

    /// Returns the offset of the header.
    pub(crate) fn offset(self) -> usize { self.0 as usize }

    /// Returns the address of the data region.
    pub(crate) fn address(self) -> Address { Address::new(self.offset() + HEADER_SIZE) }

    /// Returns the offset one past the end of the data region.
    pub(crate) fn end<S: Storage>(self, arena: &Arena<S>) -> usize { self.address().value() + self.size(arena) }

    /// Returns the range of the data region.
    pub(crate) fn data<S: Storage>(self, arena: &Arena<S>) -> Range<usize> {
        self.address().value()..self.end(arena)
    }

    /// Writes a complete header, including its marker.
    pub(crate) fn initialize<S>(
        self,
        arena: &mut Arena<S>,
        size: usize,
        previous: Option<Block>,
        next: Option<Block>,
        free: bool,
    )
        where
            S: Storage
    {
        self.set_size(arena, size);
        self.set_previous(arena, previous);
        self.set_next(arena, next);
        self.set_free(arena, free);
        arena.write_u32(self.offset() + MARKER, self.address().value() as u32);
    }

    /// Returns the usable size of the data region.
    pub(crate) fn size<S: Storage>(self, arena: &Arena<S>) -> usize {
        arena.read_u32(self.offset() + SIZE) as usize
    }

    /// Sets the usable size of the data region.
    pub(crate) fn set_size<S>(self, arena: &mut Arena<S>, size: usize)
        where
            S: Storage
    {
        debug_assert!(size < NIL as usize);
        debug_assert!(ALIGNMENT.is_multiple(size));

        arena.write_u32(self.offset() + SIZE, size as u32);
    }

    /// Returns the previous block, if any.
    pub(crate) fn previous<S: Storage>(self, arena: &Arena<S>) -> Option<Block> {
        Self::link(arena.read_u32(self.offset() + PREVIOUS))
    }

    /// Sets the previous block.
    pub(crate) fn set_previous<S>(self, arena: &mut Arena<S>, previous: Option<Block>)
        where
            S: Storage
    {
        arena.write_u32(self.offset() + PREVIOUS, previous.map(|b| b.0).unwrap_or(NIL));
    }

    /// Returns the next block, if any.
    pub(crate) fn next<S: Storage>(self, arena: &Arena<S>) -> Option<Block> {
        Self::link(arena.read_u32(self.offset() + NEXT))
    }

    /// Sets the next block.
    pub(crate) fn set_next<S>(self, arena: &mut Arena<S>, next: Option<Block>)
        where
            S: Storage
    {
        arena.write_u32(self.offset() + NEXT, next.map(|b| b.0).unwrap_or(NIL));
    }

    /// Returns whether the block is free.
    pub(crate) fn is_free<S: Storage>(self, arena: &Arena<S>) -> bool { arena.read_u32(self.offset() + FREE) != 0 }

    /// Sets whether the block is free.
    pub(crate) fn set_free<S>(self, arena: &mut Arena<S>, free: bool)
        where
            S: Storage
    {
        arena.write_u32(self.offset() + FREE, free as u32);
    }

    /// Returns whether the marker matches the address of the data region.
    pub(crate) fn has_marker<S: Storage>(self, arena: &Arena<S>) -> bool {
        arena.read_u32(self.offset() + MARKER) as usize == self.address().value()
    }

    /// Erases the marker, once the header ceases to describe a distinct block.
    pub(crate) fn clear_marker<S>(self, arena: &mut Arena<S>)
        where
            S: Storage
    {
        arena.write_u32(self.offset() + MARKER, NIL);
    }

    fn link(raw: u32) -> Option<Block> { if raw == NIL { None } else { Some(Block(raw)) } }
}

//
//  Implementation Details.
//

const NIL: u32 = u32::MAX;

const SIZE: usize = 0;
const PREVIOUS: usize = 4;
const NEXT: usize = 8;
const FREE: usize = 12;
const MARKER: usize = 16;

// mod tests
