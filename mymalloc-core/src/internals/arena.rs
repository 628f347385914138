//! Arena & Break Pointer.
//!
//! The Arena is a fixed-capacity byte region, split by the break cursor into carved space, below, and uncarved space,
//! above. Moving the break is the only way for the heap to acquire, or give back, raw storage.

use core::{ops::Range, ptr, slice};

use crate::{AllocError, Storage};

/// Arena.
///
/// Invariant: `0 <= brk <= capacity`.
///
/// All accesses go through the raw pointer of the storage, and references are only ever formed over the requested
/// ranges, never over the whole storage.
pub(crate) struct Arena<S> {
    storage: S,
    brk: usize,
}

impl<S> Arena<S> {
    /// Creates an instance, with an empty carved space.
    pub(crate) const fn new(storage: S) -> Self { Self { storage, brk: 0 } }

    /// Returns the current break, that is the offset of the first uncarved byte.
    pub(crate) fn brk(&self) -> usize { self.brk }
}

impl<S> Arena<S>
    where
        S: Storage
{
    /// Returns the capacity of the arena.
    ///
    /// Storage beyond the 4 GB mark is ignored, as headers store offsets on 32 bits.
    pub(crate) fn capacity(&self) -> usize { self.storage.len().min(MAX_CAPACITY) }

    /// Sets the break to `address`.
    ///
    /// Fails, without side-effect, if `address` is beyond the capacity.
    pub(crate) fn set_break(&mut self, address: usize) -> Result<(), AllocError> {
        if address > self.capacity() {
            return Err(AllocError::InvalidAddress);
        }

        self.brk = address;
        Ok(())
    }

    /// Moves the break forward by `amount` bytes.
    ///
    /// Returns the break prior to the move, that is the start of the newly carved region. Fails, without side-effect,
    /// if the arena cannot accommodate `amount` more bytes.
    pub(crate) fn move_break(&mut self, amount: usize) -> Result<usize, AllocError> {
        let capacity = self.capacity();

        let end = self.brk.checked_add(amount)
            .filter(|end| *end <= capacity)
            .ok_or(AllocError::OutOfMemory)?;

        Ok(core::mem::replace(&mut self.brk, end))
    }

    /// Reads the 4 bytes located at `offset` as a u32.
    ///
    /// #   Panics
    ///
    /// If `offset + 4` is beyond the capacity.
    pub(crate) fn read_u32(&self, offset: usize) -> u32 {
        let pointer = self.pointer(offset..offset + 4);

        //  Safety:
        //  -   `pointer` is valid for reads of 4 bytes, as per `pointer`.
        unsafe { ptr::read_unaligned(pointer as *const u32) }
    }

    /// Returns the bytes within `range`.
    ///
    /// #   Panics
    ///
    /// If `range` is beyond the capacity.
    pub(crate) fn bytes(&self, range: Range<usize>) -> &[u8] {
        let len = range.len();
        let pointer = self.pointer(range);

        //  Safety:
        //  -   `pointer` is valid for reads of `len` bytes, as per `pointer`.
        //  -   The bytes cannot be written through the arena while `self` is borrowed.
        unsafe { slice::from_raw_parts(pointer, len) }
    }

    /// Writes `value` in the 4 bytes located at `offset`.
    ///
    /// #   Panics
    ///
    /// If `offset + 4` is beyond the capacity.
    pub(crate) fn write_u32(&mut self, offset: usize, value: u32) {
        let pointer = self.pointer(offset..offset + 4);

        //  Safety:
        //  -   `pointer` is valid for writes of 4 bytes, as per `pointer`.
        unsafe { ptr::write_unaligned(pointer as *mut u32, value) }
    }

    /// Returns the bytes within `range`.
    ///
    /// #   Panics
    ///
    /// If `range` is beyond the capacity.
    pub(crate) fn bytes_mut(&mut self, range: Range<usize>) -> &mut [u8] {
        let len = range.len();
        let pointer = self.pointer(range);

        //  Safety:
        //  -   `pointer` is valid for reads and writes of `len` bytes, as per `pointer`.
        //  -   The bytes cannot be accessed through the arena while `self` is mutably borrowed.
        unsafe { slice::from_raw_parts_mut(pointer, len) }
    }

    /// Overwrites the bytes within `range` with `value`.
    ///
    /// #   Panics
    ///
    /// If `range` is beyond the capacity.
    pub(crate) fn fill(&mut self, range: Range<usize>, value: u8) {
        let len = range.len();
        let pointer = self.pointer(range);

        //  Safety:
        //  -   `pointer` is valid for writes of `len` bytes, as per `pointer`.
        unsafe { ptr::write_bytes(pointer, value, len) }
    }

    /// Copies the bytes within `source` to `destination`; the ranges may overlap.
    ///
    /// #   Panics
    ///
    /// If either range is beyond the capacity.
    pub(crate) fn copy(&mut self, source: Range<usize>, destination: usize) {
        let len = source.len();
        let target = self.pointer(destination..destination + len);
        let source = self.pointer(source);

        //  Safety:
        //  -   `source` is valid for reads of `len` bytes, as per `pointer`.
        //  -   `target` is valid for writes of `len` bytes, as per `pointer`.
        //  -   `ptr::copy` handles overlapping ranges.
        unsafe { ptr::copy(source, target, len) }
    }

    /// Returns a pointer to the first byte of the arena.
    pub(crate) fn as_ptr(&self) -> *mut u8 { self.storage.as_ptr().as_ptr() }

    //  Returns a pointer to the start of `range`, valid for reads and writes of `range.len()` bytes.
    //
    //  Panics if `range` is beyond the capacity.
    fn pointer(&self, range: Range<usize>) -> *mut u8 {
        assert!(range.start <= range.end && range.end <= self.capacity(),
            "Range {:?} beyond capacity {}", range, self.capacity());

        //  Safety:
        //  -   `range.start` is within the storage, as checked above.
        unsafe { self.as_ptr().add(range.start) }
    }
}

//
//  Implementation Details.
//

//  Offsets are stored on 32 bits, with u32::MAX reserved as null link.
const MAX_CAPACITY: usize = u32::MAX as usize;

// mod tests
