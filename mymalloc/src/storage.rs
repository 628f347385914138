//! The storage backing the process-wide heap.

use core::{cell::UnsafeCell, ptr::NonNull};

use mymalloc_core::{Configuration, Storage};

/// The capacity, in bytes, of the process-wide arena.
pub const ARENA_SIZE: usize = 10240;

/// The maximum alignment guaranteed by the allocator.
///
/// All addresses produced by the heap are multiples of 4 bytes from the start of the arena, which is itself aligned on
/// 16 bytes.
pub const MAX_ALIGNMENT: usize = 4;

/// The configuration of the process-wide heap.
#[derive(Default)]
pub(crate) struct MyConfiguration;

impl Configuration for MyConfiguration {
    const SPLIT_THRESHOLD: usize = 512;
}

/// Handle to the process-wide arena.
///
/// The bytes of the arena live in a separate static, outside of the heap, so that locking the heap never borrows them.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ArenaHandle;

//  Safety:
//  -   `ARENA` is valid for reads and writes of `ARENA_SIZE` bytes, for the lifetime of the program.
//  -   `ARENA` never moves, hence the pointer is stable.
//  -   `ARENA` is private to this module, and only ever accessed through this handle.
unsafe impl Storage for ArenaHandle {
    fn as_ptr(&self) -> NonNull<u8> {
        //  Safety:
        //  -   The address of a static is not null.
        unsafe { NonNull::new_unchecked(ARENA.0.get().cast()) }
    }

    fn len(&self) -> usize { ARENA_SIZE }
}

//
//  Implementation Details
//

#[repr(C, align(16))]
struct ArenaBuffer(UnsafeCell<[u8; ARENA_SIZE]>);

//  Safety:
//  -   All accesses are serialized by the lock of the heap, save for those to the data regions it hands out, which
//      belong to their respective users.
unsafe impl Sync for ArenaBuffer {}

static ARENA: ArenaBuffer = ArenaBuffer(UnsafeCell::new([0; ARENA_SIZE]));

#[cfg(test)]
mod tests {

use core::mem;

use super::*;

#[test]
fn arena_buffer_layout() {
    assert_eq!(ARENA_SIZE, mem::size_of::<ArenaBuffer>());
    assert_eq!(0, mem::align_of::<ArenaBuffer>() % MAX_ALIGNMENT);
}

#[test]
fn arena_handle_stable() {
    let handle = ArenaHandle;

    assert_eq!(ARENA_SIZE, handle.len());
    assert_eq!(handle.as_ptr(), ArenaHandle.as_ptr());
    assert_eq!(0, handle.as_ptr().as_ptr() as usize % 16);
}

} // mod tests
