//! Block Directory.
//!
//! The Directory maintains the chain of all the blocks carved out of the arena, free or not. The chain is sorted by
//! address, and the links of each block mirror physical adjacency: the `next` block starts right where the data of its
//! predecessor ends.
//!
//! The Directory only offers the structural primitives (search, growth, split, merge, release); the policies
//! combining them live in the `Heap`.

use crate::{AllocError, AllocationSize, Configuration, Properties, Storage, HEADER_SIZE};

use super::{arena::Arena, block::Block};

/// Directory.
pub(crate) struct Directory {
    head: Option<Block>,
}

/// The result of a first-fit search.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct FirstFit {
    /// The first free block large enough, if any.
    pub(crate) found: Option<Block>,
    /// The last block visited without success, from which the chain may be extended.
    pub(crate) last: Option<Block>,
}

impl Directory {
    /// Creates an empty instance.
    pub(crate) const fn new() -> Self { Self { head: None } }

    /// Returns the first block of the chain, if any.
    pub(crate) fn head(&self) -> Option<Block> { self.head }

    /// Returns whether no block has been carved.
    pub(crate) fn is_empty(&self) -> bool { self.head.is_none() }

    /// Searches for the first free block of at least `size` bytes, in address order.
    pub(crate) fn find_first_fit<S>(&self, arena: &Arena<S>, size: AllocationSize) -> FirstFit
        where
            S: Storage
    {
        let mut last = None;
        let mut current = self.head;

        while let Some(block) = current {
            if block.is_free(arena) && block.size(arena) >= size.value() {
                return FirstFit { found: Some(block), last };
            }

            last = Some(block);
            current = block.next(arena);
        }

        FirstFit { found: None, last }
    }

    /// Carves a new, in use, block of `size` bytes at the break, and links it after `after`.
    ///
    /// If `after` is None, the chain must be empty, and the new block becomes its head.
    ///
    /// On failure, the chain is left untouched.
    pub(crate) fn grow_chain<S>(&mut self, arena: &mut Arena<S>, after: Option<Block>, size: AllocationSize)
        -> Result<Block, AllocError>
        where
            S: Storage
    {
        debug_assert!(after.is_some() || self.is_empty());
        debug_assert!(after.map(|after| after.next(arena).is_none()).unwrap_or(true));

        let total = HEADER_SIZE.checked_add(size.value()).ok_or(AllocError::OutOfMemory)?;
        let offset = arena.move_break(total)?;

        debug_assert!(after.map(|after| after.end(arena) == offset).unwrap_or(true));

        let block = Block::from_offset(offset);
        block.initialize(arena, size.value(), after, None, false);

        match after {
            Some(after) => after.set_next(arena, Some(block)),
            None => self.head = Some(block),
        }

        log::debug!("[mymalloc] grow_chain({}) -> {:?}, break at {}", size.value(), block.address(), arena.brk());

        Ok(block)
    }

    /// Splits `block` so that it holds `size` bytes, if the surplus is large enough.
    ///
    /// The surplus must accommodate a header and `C::SPLIT_THRESHOLD` bytes; otherwise `block` is left untouched and
    /// None is returned.
    ///
    /// The remainder is a new free block, linked right after `block`, and is returned.
    pub(crate) fn split_block<C, S>(&self, arena: &mut Arena<S>, block: Block, size: AllocationSize) -> Option<Block>
        where
            C: Configuration,
            S: Storage
    {
        let block_size = block.size(arena);

        if !Properties::<C>::should_split(block_size, size) {
            return None;
        }

        let remainder = Block::from_offset(block.address().value() + size.value());
        let next = block.next(arena);

        remainder.initialize(arena, block_size - size.value() - HEADER_SIZE, Some(block), next, true);

        if let Some(next) = next {
            next.set_previous(arena, Some(remainder));
        }

        block.set_next(arena, Some(remainder));
        block.set_size(arena, size.value());

        log::debug!("[mymalloc] split_block({:?}, {}) -> remainder {:?} of {} bytes",
            block.address(), size.value(), remainder.address(), remainder.size(arena));

        Some(remainder)
    }

    /// Merges the successor of `block` into `block`.
    ///
    /// The header of the successor is reclaimed as data, and its marker erased.
    ///
    /// #   Panics
    ///
    /// In debug, if `block` has no successor. In release, it is a no-op.
    pub(crate) fn merge_with_next<S>(&self, arena: &mut Arena<S>, block: Block)
        where
            S: Storage
    {
        let next = if let Some(next) = block.next(arena) {
            next
        } else {
            debug_assert!(false, "merge_with_next requires a successor");
            return;
        };

        block.set_size(arena, block.size(arena) + HEADER_SIZE + next.size(arena));

        let after = next.next(arena);
        block.set_next(arena, after);

        if let Some(after) = after {
            after.set_previous(arena, Some(block));
        }

        next.clear_marker(arena);

        log::debug!("[mymalloc] merge_with_next({:?}) -> {} bytes", block.address(), block.size(arena));
    }

    /// Unlinks the tail `block` from the chain, and retracts the break to its header.
    ///
    /// If `block` was also the head, the chain becomes empty.
    pub(crate) fn release_tail<S>(&mut self, arena: &mut Arena<S>, block: Block) -> Result<(), AllocError>
        where
            S: Storage
    {
        debug_assert!(block.next(arena).is_none());

        arena.set_break(block.offset())?;

        match block.previous(arena) {
            Some(previous) => previous.set_next(arena, None),
            None => self.head = None,
        }

        block.clear_marker(arena);

        log::debug!("[mymalloc] release_tail({:?}) -> break at {}", block.address(), arena.brk());

        Ok(())
    }
}

// mod tests
