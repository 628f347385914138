//! Heap
//!
//! The Heap is the integration layer: it composes the Arena, owning the storage and the break, with the Directory,
//! tracking the blocks carved out of it, to implement allocate, zero-allocate, reallocate and free.
//!
//! Policies:
//!
//! -   Placement is first-fit, in address order; when no block fits, the chain grows from the break.
//! -   Oversized blocks are split when the surplus accommodates a header and the split threshold.
//! -   Freed blocks are eagerly coalesced with any free neighbour, so that no two adjacent blocks are ever free.
//! -   A free block at the tail of the chain is given back to the arena by retracting the break.

use core::marker::PhantomData;

use crate::internals::{arena::Arena, block::Block, directory::Directory};

use super::{Address, AllocError, AllocationSize, BlockInfo, Configuration, Storage, HEADER_SIZE};

/// Heap.
///
/// A heap owning its arena storage, `S`, typically a `Region`.
///
/// The storage is only ever accessed through raw pointers, hence pointers to the data regions remain valid across
/// heap operations, until the region is freed.
///
/// The Heap is single-threaded: every mutating operation requires `&mut self`. Share it behind a single lock, if need
/// be.
pub struct Heap<C, S> {
    arena: Arena<S>,
    directory: Directory,
    _configuration: PhantomData<C>,
}

impl<C, S> Heap<C, S> {
    /// Creates an instance, using `storage` as arena.
    ///
    /// The content of `storage` is irrelevant, and its length determines the capacity of the heap.
    pub const fn new(storage: S) -> Self {
        Self { arena: Arena::new(storage), directory: Directory::new(), _configuration: PhantomData }
    }

    /// Returns whether no block is carved out of the arena.
    pub fn is_empty(&self) -> bool { self.directory.is_empty() }

    /// Returns the offset of the break, that is the number of bytes currently carved out of the arena.
    pub fn break_offset(&self) -> usize { self.arena.brk() }
}

impl<C, S> Heap<C, S>
    where
        S: Storage
{
    /// Returns the capacity of the arena.
    pub fn capacity(&self) -> usize { self.arena.capacity() }

    /// Returns whether `address` looks like the address of a data region produced by this heap.
    ///
    /// An address is accepted only if:
    ///
    /// -   At least one block is carved.
    /// -   It lies strictly between the head of the chain and the break.
    /// -   The header preceding it holds a marker matching it.
    ///
    /// This is a heuristic: it rejects garbage, and addresses of blocks merged away or given back to the arena, but it
    /// does accept the address of a block which is free yet still distinct.
    pub fn is_valid_address(&self, address: Address) -> bool {
        let head = if let Some(head) = self.directory.head() {
            head
        } else {
            return false;
        };

        if address.value() <= head.offset() || address.value() >= self.arena.brk() {
            return false;
        }

        Block::from_address(address)
            .filter(|block| block.offset() >= head.offset())
            .map(|block| block.has_marker(&self.arena))
            .unwrap_or(false)
    }

    /// Returns the usable size of the allocation at `address`, if live.
    pub fn usable_size(&self, address: Address) -> Option<usize> {
        self.live_block(address).map(|block| block.size(&self.arena))
    }

    /// Returns the usable bytes of the allocation at `address`, if live.
    pub fn data(&self, address: Address) -> Option<&[u8]> {
        let block = self.live_block(address)?;

        Some(self.arena.bytes(block.data(&self.arena)))
    }

    /// Returns a pointer to the first byte of the arena.
    ///
    /// The pointer to the data region of `address` is `as_ptr() + address.value()`.
    pub fn as_ptr(&self) -> *mut u8 { self.arena.as_ptr() }

    /// Returns an iterator over all the blocks carved out of the arena, free or not, in address order.
    pub fn blocks(&self) -> Blocks<'_, S> { Blocks { arena: &self.arena, current: self.directory.head() } }

    //  Returns the block of `address`, if valid and not free.
    fn live_block(&self, address: Address) -> Option<Block> {
        if !self.is_valid_address(address) {
            return None;
        }

        Block::from_address(address).filter(|block| !block.is_free(&self.arena))
    }
}

impl<C, S> Heap<C, S>
    where
        C: Configuration,
        S: Storage
{
    /// Allocates `size` bytes, rounded up to a multiple of 4.
    ///
    /// Fails only if the arena is exhausted, or `size` is too close to `usize::MAX` to be rounded up.
    pub fn allocate(&mut self, size: usize) -> Result<Address, AllocError> {
        let result = AllocationSize::from_request(size).and_then(|size| self.allocate_block(size));

        match result {
            Ok(block) => {
                log::trace!("[mymalloc] allocate({}) -> {:?}", size, block.address());
                Ok(block.address())
            },
            Err(error) => {
                log::warn!("[mymalloc] allocate({}) -> {}", size, error);
                Err(error)
            },
        }
    }

    /// Allocates `count * size` bytes, rounded up to a multiple of 4, all zeroed.
    ///
    /// Fails if `count * size` overflows, or for any reason `allocate` fails.
    pub fn zero_allocate(&mut self, count: usize, size: usize) -> Result<Address, AllocError> {
        let total = count.checked_mul(size).ok_or_else(|| {
            log::warn!("[mymalloc] zero_allocate({}, {}) -> overflow", count, size);
            AllocError::Overflow
        })?;

        let extent = AllocationSize::from_request(total)?;
        let address = self.allocate(total)?;

        let start = address.value();

        self.arena.fill(start..start + extent.value(), 0);

        Ok(address)
    }

    /// Reallocates the allocation at `address` to hold `size` bytes, preserving its content up to the lesser of the
    /// old and new sizes.
    ///
    /// If `address` is None, this is equivalent to `allocate(size)`.
    ///
    /// The allocation is resized in place whenever possible, either because it is already large enough, in which case
    /// its surplus may be split off, or because its successor is free and large enough to be absorbed. Otherwise, a
    /// fresh allocation is made, the content copied, and the original allocation freed.
    ///
    /// Fails if `address` is not a live allocation of this heap, or if the fresh allocation fails; in the latter case
    /// the original allocation is left intact.
    pub fn reallocate(&mut self, address: Option<Address>, size: usize) -> Result<Address, AllocError> {
        let address = if let Some(address) = address {
            address
        } else {
            return self.allocate(size);
        };

        let block = if let Some(block) = self.live_block(address) {
            block
        } else {
            log::warn!("[mymalloc] reallocate({:?}, {}) -> invalid address", address, size);
            return Err(AllocError::InvalidAddress);
        };

        let result = AllocationSize::from_request(size).and_then(|size| self.reallocate_block(block, size));

        match result {
            Ok(block) => {
                log::trace!("[mymalloc] reallocate({:?}, {}) -> {:?}", address, size, block.address());
                Ok(block.address())
            },
            Err(error) => {
                log::warn!("[mymalloc] reallocate({:?}, {}) -> {}", address, size, error);
                Err(error)
            },
        }
    }

    /// Frees the allocation at `address`.
    ///
    /// Does nothing if `address` is None, or is not a live allocation of this heap; in particular, freeing an
    /// allocation twice is harmless.
    pub fn free(&mut self, address: Option<Address>) {
        let address = if let Some(address) = address {
            address
        } else {
            return;
        };

        let block = if let Some(block) = self.live_block(address) {
            block
        } else {
            log::warn!("[mymalloc] free({:?}) -> ignored, not a live allocation", address);
            return;
        };

        block.set_free(&mut self.arena, true);
        self.coalesce(block);

        log::trace!("[mymalloc] free({:?})", address);
    }

    /// Returns the usable bytes of the allocation at `address`, if live.
    pub fn data_mut(&mut self, address: Address) -> Option<&mut [u8]> {
        let block = self.live_block(address)?;
        let range = block.data(&self.arena);

        Some(self.arena.bytes_mut(range))
    }

    //  Allocates a block of `size` bytes, reusing the first free block which fits, or growing the chain otherwise.
    fn allocate_block(&mut self, size: AllocationSize) -> Result<Block, AllocError> {
        if self.directory.is_empty() {
            return self.directory.grow_chain(&mut self.arena, None, size);
        }

        let fit = self.directory.find_first_fit(&self.arena, size);

        if let Some(block) = fit.found {
            block.set_free(&mut self.arena, false);
            self.trim(block, size);
            return Ok(block);
        }

        self.directory.grow_chain(&mut self.arena, fit.last, size)
    }

    //  Resizes the live `block` to hold `size` bytes.
    fn reallocate_block(&mut self, block: Block, size: AllocationSize) -> Result<Block, AllocError> {
        let current = block.size(&self.arena);

        if current >= size.value() {
            self.trim(block, size);
            return Ok(block);
        }

        if let Some(next) = block.next(&self.arena) {
            let combined = current + HEADER_SIZE + next.size(&self.arena);

            if next.is_free(&self.arena) && combined >= size.value() {
                self.directory.merge_with_next(&mut self.arena, block);
                self.trim(block, size);
                return Ok(block);
            }
        }

        //  `current < size`, hence the whole content is copied.
        let fresh = self.allocate_block(size)?;

        let source = block.data(&self.arena);
        self.arena.copy(source, fresh.address().value());

        block.set_free(&mut self.arena, true);
        self.coalesce(block);

        Ok(fresh)
    }

    //  Splits off the surplus of the live `block`, if large enough, and releases it.
    fn trim(&mut self, block: Block, size: AllocationSize) {
        if let Some(remainder) = self.directory.split_block::<C, _>(&mut self.arena, block, size) {
            self.coalesce(remainder);
        }
    }

    //  Coalesces the free `block` with its free neighbours, if any, then gives it back to the arena if it is the tail.
    fn coalesce(&mut self, block: Block) {
        debug_assert!(block.is_free(&self.arena));

        let arena = &mut self.arena;

        if let Some(next) = block.next(arena) {
            if next.is_free(arena) {
                self.directory.merge_with_next(arena, block);
            }
        }

        let block = match block.previous(arena) {
            Some(previous) if previous.is_free(arena) => {
                self.directory.merge_with_next(arena, previous);
                previous
            },
            _ => block,
        };

        if block.next(arena).is_some() {
            return;
        }

        if let Err(error) = self.directory.release_tail(arena, block) {
            log::warn!("[mymalloc] release_tail({:?}) -> {}", block.address(), error);
        }
    }
}

/// Blocks.
///
/// An iterator over the blocks of a heap, in address order.
pub struct Blocks<'a, S> {
    arena: &'a Arena<S>,
    current: Option<Block>,
}

impl<'a, S> Iterator for Blocks<'a, S>
    where
        S: Storage
{
    type Item = BlockInfo;

    fn next(&mut self) -> Option<BlockInfo> {
        let block = self.current?;

        self.current = block.next(self.arena);

        Some(BlockInfo { address: block.address(), size: block.size(self.arena), free: block.is_free(self.arena) })
    }
}

// mod tests
