#![deny(missing_docs)]

//! Exposition of MyAllocator API via a C ABI.
//!
//! The functions mirror their C standard library counterparts, with a `my_` prefix.

use core::ptr::{self, NonNull};

use libc::{c_void, size_t};

use mymalloc::MyAllocator;

/// Allocates `size` bytes of memory, aligned on at least 4 bytes.
///
/// If the allocation fails, the returned pointer is NULL.
#[no_mangle]
pub extern "C" fn my_malloc(size: size_t) -> *mut c_void { into_raw(ALLOCATOR.allocate(size)) }

/// Allocates `count * size` bytes of zeroed memory, aligned on at least 4 bytes.
///
/// If `count * size` overflows, or the allocation fails, the returned pointer is NULL.
#[no_mangle]
pub extern "C" fn my_calloc(count: size_t, size: size_t) -> *mut c_void {
    into_raw(ALLOCATOR.zero_allocate(count, size))
}

/// Reallocates the memory located at `pointer` to hold `size` bytes.
///
/// If `pointer` is NULL, this is equivalent to `my_malloc(size)`.
///
/// If `pointer` was not returned by a prior call to this library, or the allocation fails, the returned pointer is
/// NULL and the memory located at `pointer` is left untouched.
///
/// #   Safety
///
/// -   Assumes the memory pointed by `pointer` is no longer in use, unless NULL is returned.
#[no_mangle]
pub unsafe extern "C" fn my_realloc(pointer: *mut c_void, size: size_t) -> *mut c_void {
    into_raw(ALLOCATOR.reallocate(NonNull::new(pointer as *mut u8), size))
}

/// Deallocates the memory located at `pointer`.
///
/// NULL pointers, and pointers not returned by a prior call to this library, are ignored.
///
/// #   Safety
///
/// -   Assumes the memory pointed by `pointer` is no longer in use.
#[no_mangle]
pub unsafe extern "C" fn my_free(pointer: *mut c_void) {
    if let Some(pointer) = NonNull::new(pointer as *mut u8) {
        ALLOCATOR.deallocate(pointer);
    }
}

//
//  Implementation
//

static ALLOCATOR: MyAllocator = MyAllocator::new();

fn into_raw(pointer: Option<NonNull<u8>>) -> *mut c_void {
    pointer.map(|pointer| pointer.as_ptr() as *mut c_void).unwrap_or(ptr::null_mut())
}

// mod tests
