//! Allocator

use core::{
    alloc::{GlobalAlloc, Layout},
    ptr::{self, NonNull},
};

use spin::{Mutex, MutexGuard};

use mymalloc_core::{Address, Heap};

use crate::{ArenaHandle, MyConfiguration, MAX_ALIGNMENT};

/// Fixed-Arena Allocator.
///
/// All instances share the same process-wide heap, protected by a single lock.
#[derive(Clone, Copy, Debug, Default)]
pub struct MyAllocator;

impl MyAllocator {
    /// Creates an instance.
    pub const fn new() -> Self { Self }

    /// Allocates `size` bytes of memory, aligned on at least `MAX_ALIGNMENT` bytes.
    ///
    /// Returns None if the arena is exhausted.
    pub fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        let mut heap = lock();

        let address = heap.allocate(size).ok()?;

        Some(pointer_of(&heap, address))
    }

    /// Allocates `count * size` bytes of zeroed memory, aligned on at least `MAX_ALIGNMENT` bytes.
    ///
    /// Returns None if `count * size` overflows, or the arena is exhausted.
    pub fn zero_allocate(&self, count: usize, size: usize) -> Option<NonNull<u8>> {
        let mut heap = lock();

        let address = heap.zero_allocate(count, size).ok()?;

        Some(pointer_of(&heap, address))
    }

    /// Reallocates the memory located at `pointer` to hold `size` bytes, preserving its content up to the lesser of
    /// the old and new sizes.
    ///
    /// If `pointer` is None, this is equivalent to `allocate(size)`.
    ///
    /// Returns None if `pointer` is not a live allocation, or if the arena is exhausted; in either case, the memory
    /// located at `pointer` is left untouched.
    ///
    /// #   Safety
    ///
    /// -   Assumes the memory pointed by `pointer` is no longer in use, unless None is returned.
    pub unsafe fn reallocate(&self, pointer: Option<NonNull<u8>>, size: usize) -> Option<NonNull<u8>> {
        let mut heap = lock();

        let address = match pointer {
            Some(pointer) => Some(address_of(&heap, pointer)?),
            None => None,
        };

        let address = heap.reallocate(address, size).ok()?;

        Some(pointer_of(&heap, address))
    }

    /// Deallocates the memory located at `pointer`.
    ///
    /// Pointers which are not live allocations of this allocator are ignored.
    ///
    /// #   Safety
    ///
    /// -   Assumes the memory pointed by `pointer` is no longer in use.
    pub unsafe fn deallocate(&self, pointer: NonNull<u8>) {
        let mut heap = lock();

        if let Some(address) = address_of(&heap, pointer) {
            heap.free(Some(address));
        }
    }

    /// Returns the number of usable bytes of the memory located at `pointer`, if it is a live allocation.
    ///
    /// The usable size is at least the requested size, and may be larger.
    pub fn usable_size(&self, pointer: NonNull<u8>) -> Option<usize> {
        let heap = lock();

        let address = address_of(&heap, pointer)?;

        heap.usable_size(address)
    }
}

unsafe impl GlobalAlloc for MyAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.align() > MAX_ALIGNMENT {
            return ptr::null_mut();
        }

        self.allocate(layout.size()).map(NonNull::as_ptr).unwrap_or(ptr::null_mut())
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        if layout.align() > MAX_ALIGNMENT {
            return ptr::null_mut();
        }

        self.zero_allocate(1, layout.size()).map(NonNull::as_ptr).unwrap_or(ptr::null_mut())
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _: Layout) {
        if let Some(ptr) = NonNull::new(ptr) {
            self.deallocate(ptr);
        }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if layout.align() > MAX_ALIGNMENT {
            return ptr::null_mut();
        }

        self.reallocate(NonNull::new(ptr), new_size).map(NonNull::as_ptr).unwrap_or(ptr::null_mut())
    }
}

//
//  Integration test backdoors.
//
//  Unfortunately the backdoors have to be exposed as part of the public API for use in integration tests.
//

impl MyAllocator {
    /// Exposes the offset of the break of the arena.
    #[cold]
    #[doc(hidden)]
    pub fn break_offset(&self) -> usize { lock().break_offset() }

    /// Exposes the number of blocks, free or not, carved out of the arena.
    #[cold]
    #[doc(hidden)]
    pub fn block_count(&self) -> usize { lock().blocks().count() }
}

//
//  Implementation
//

type MyHeap = Heap<MyConfiguration, ArenaHandle>;

//  The heap only holds a handle to the arena: the guard never borrows the bytes handed out to users.
static HEAP: Mutex<MyHeap> = Mutex::new(Heap::new(ArenaHandle));

fn lock() -> MutexGuard<'static, MyHeap> { HEAP.lock() }

//  Returns the pointer to the data region at `address`.
fn pointer_of(heap: &MyHeap, address: Address) -> NonNull<u8> {
    debug_assert!(address.value() < heap.capacity());

    //  Safety:
    //  -   `address` was produced by `heap`, hence lies within the arena.
    let pointer = unsafe { heap.as_ptr().add(address.value()) };

    //  Safety:
    //  -   `pointer` is derived from the base of a static buffer, which is not null.
    unsafe { NonNull::new_unchecked(pointer) }
}

//  Returns the address of `pointer`, if it lies within the arena.
fn address_of(heap: &MyHeap, pointer: NonNull<u8>) -> Option<Address> {
    let base = heap.as_ptr() as usize;

    let offset = (pointer.as_ptr() as usize)
        .checked_sub(base)
        .filter(|offset| *offset < heap.capacity());

    if offset.is_none() {
        log::warn!("[mymalloc] {:p} -> not within the arena", pointer);
    }

    offset.map(Address::new)
}

#[cfg(test)]
mod tests {

use super::*;

#[test]
fn address_of_foreign() {
    let heap = lock();

    let mut local = 0u8;
    let foreign = NonNull::from(&mut local);

    assert_eq!(None, address_of(&heap, foreign));
}

#[test]
fn address_of_pointer_of() {
    let heap = lock();

    let address = Address::new(20);
    let pointer = pointer_of(&heap, address);

    assert_eq!(0, pointer.as_ptr() as usize % MAX_ALIGNMENT);
    assert_eq!(Some(address), address_of(&heap, pointer));
}

} // mod tests
