//! Storage
//!
//! The raw memory backing a heap.
//!
//! The heap only ever accesses its storage through a raw pointer, and never forms a reference spanning the whole of
//! it: pointers to allocations handed out to users therefore remain valid across heap operations.

use core::{marker::PhantomData, ptr::NonNull};

/// Storage
///
/// A region of raw memory, from `as_ptr()` to `as_ptr() + len()`.
///
/// #   Safety
///
/// -   `as_ptr()` must be valid for reads and writes of `len()` bytes, for as long as the instance lives.
/// -   `as_ptr()` must return the same pointer on every call.
/// -   The region must not be accessed by anything but the heap, save for the data regions it hands out.
pub unsafe trait Storage {
    /// Returns a pointer to the first byte of the region.
    fn as_ptr(&self) -> NonNull<u8>;

    /// Returns the length of the region, in bytes.
    fn len(&self) -> usize;
}

/// Region
///
/// A Storage borrowing a mutable slice, or any raw region of memory.
pub struct Region<'a> {
    base: NonNull<u8>,
    len: usize,
    _marker: PhantomData<&'a mut [u8]>,
}

impl<'a> Region<'a> {
    /// Creates an instance, borrowing `slice` for its lifetime.
    pub fn from_slice(slice: &'a mut [u8]) -> Self {
        let len = slice.len();

        //  Safety:
        //  -   `slice` is valid for reads and writes of `len` bytes, and exclusively borrowed for `'a`.
        unsafe { Self::from_raw_parts(NonNull::from(slice).cast(), len) }
    }

    /// Creates an instance, spanning `len` bytes from `base`.
    ///
    /// #   Safety
    ///
    /// -   Assumes `base` is valid for reads and writes of `len` bytes, for `'a`.
    /// -   Assumes the bytes are not otherwise accessed for `'a`, save through the pointers handed out by the heap.
    pub const unsafe fn from_raw_parts(base: NonNull<u8>, len: usize) -> Self {
        Self { base, len, _marker: PhantomData }
    }
}

//  Safety:
//  -   `Region` is equivalent to `&'a mut [u8]`, which is Send.
unsafe impl<'a> Send for Region<'a> {}

//  Safety:
//  -   As per the constructors.
unsafe impl<'a> Storage for Region<'a> {
    fn as_ptr(&self) -> NonNull<u8> { self.base }

    fn len(&self) -> usize { self.len }
}

// mod tests
