use std::{ptr::NonNull, slice, sync, thread};

use serial_test::serial;

use mymalloc::MyAllocator;
use mymalloc_test::{Operation, Pattern, Workload};

static MY_ALLOCATOR: MyAllocator = MyAllocator::new();

//
//  Tests
//

#[serial]
#[test]
fn concurrent_workloads() {
    //  Test that the lock fully serializes access to the heap: each thread runs its own workload, filling each of its
    //  allocations with its own pattern, and checks that no other thread ever scribbled over them.
    //
    //  The arena is small, hence allocations are expected to fail from time to time; this is not an error.

    let number_iterations = number_iterations();
    let number_threads = number_threads();

    let start = sync::Arc::new(sync::Barrier::new(number_threads));

    let pool = Pool::new(number_threads, |thread_index| {
        let start = start.clone();

        move || {
            let mut workload = Workload::new(thread_index as u64 + 1, 64);
            let mut live: Vec<Allocation> = Vec::new();

            start.wait();

            for iteration in 0..number_iterations {
                let pattern = Pattern::new((thread_index * 16 + iteration % 16) as u8);

                //  Keep the footprint of each thread bounded, so that all threads get a share of the arena.
                let operation = if live.len() >= 8 {
                    Operation::Free { slot: iteration % live.len() }
                } else {
                    workload.operation(live.len())
                };

                match operation {
                    Operation::Allocate { size } => {
                        if let Some(allocation) = Allocation::new(size, pattern) {
                            live.push(allocation);
                        }
                    },
                    Operation::Free { slot } => {
                        let allocation = live.swap_remove(slot);

                        assert!(allocation.is_intact(), "thread {}, iteration {}", thread_index, iteration);
                    },
                    Operation::Reallocate { slot, size } => {
                        assert!(live[slot].is_intact(), "thread {}, iteration {}", thread_index, iteration);

                        live[slot].reallocate(size, pattern);
                    },
                }
            }

            for allocation in &live {
                assert!(allocation.is_intact(), "thread {}", thread_index);
            }
        }
    });

    pool.join();

    assert_eq!(0, MY_ALLOCATOR.block_count());
    assert_eq!(0, MY_ALLOCATOR.break_offset());
}

//
//  Multi-threaded helpers
//

struct Pool<T>(Vec<thread::JoinHandle<T>>);

impl<T> Pool<T> {
    fn new<F, G>(count: usize, mut factory: F) -> Self
        where
            F: FnMut(usize) -> G,
            G: FnOnce() -> T + Send + 'static,
            T: Send + 'static
    {
        let threads : Vec<_> = (0..count)
            .map(|i| thread::spawn(factory(i)))
            .collect();

        Self(threads)
    }

    fn join(mut self) -> Vec<T> {
        let thread_handles = std::mem::replace(&mut self.0, vec!());
        Self::join_handles(thread_handles)
    }

    fn join_handles(thread_handles: Vec<thread::JoinHandle<T>>) -> Vec<T> {
        //  First join _all_ threads.
        let results: Vec<_> = thread_handles.into_iter()
            .map(|handle| handle.join())
            .collect();
        //  Then collect the results.
        results.into_iter()
            .map(|value| value.unwrap())
            .collect()
    }
}

impl<T> Drop for Pool<T> {
    fn drop(&mut self) {
        let thread_handles = std::mem::replace(&mut self.0, vec!());
        Self::join_handles(thread_handles);
    }
}

//
//  Implementation Details
//

fn number_iterations() -> usize { read_number_from_environment("MYMALLOC_MULTI_NUMBER_ITERATIONS", 10_000) }

fn number_threads() -> usize {
    read_number_from_environment("MYMALLOC_MULTI_NUMBER_THREADS", num_cpus::get().max(2).min(8))
}

fn read_number_from_environment(name: &str, default: usize) -> usize {
    if let Some(result) = std::env::var(name).ok().and_then(|value| value.parse().ok()) {
        println!("read_number_from_environment - {}: {}", name, result);
        return result;
    }

    println!("read_number_from_environment - {}: {} (default)", name, default);
    default
}

//  An allocation filled with a pattern, freed on drop.
struct Allocation {
    pointer: NonNull<u8>,
    size: usize,
    pattern: Pattern,
}

impl Allocation {
    fn new(size: usize, pattern: Pattern) -> Option<Self> {
        let pointer = MY_ALLOCATOR.allocate(size)?;

        let mut result = Allocation { pointer, size, pattern };
        pattern.fill(result.bytes_mut());

        Some(result)
    }

    fn is_intact(&self) -> bool { self.pattern.check(self.bytes()) }

    fn reallocate(&mut self, size: usize, pattern: Pattern) {
        //  Safety:
        //  -   `self.pointer` is not used again, unless reallocation fails.
        if let Some(pointer) = unsafe { MY_ALLOCATOR.reallocate(Some(self.pointer), size) } {
            self.pointer = pointer;
            self.size = size;
            self.pattern = pattern;

            pattern.fill(self.bytes_mut());
        }
    }

    fn bytes(&self) -> &[u8] {
        //  Safety:
        //  -   `self.pointer` is a live allocation of at least `self.size` bytes, owned by `self`.
        unsafe { slice::from_raw_parts(self.pointer.as_ptr(), self.size) }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        //  Safety:
        //  -   `self.pointer` is a live allocation of at least `self.size` bytes, owned by `self`.
        //  -   `self` is mutably borrowed, hence the bytes are not otherwise borrowed.
        unsafe { slice::from_raw_parts_mut(self.pointer.as_ptr(), self.size) }
    }
}

impl Drop for Allocation {
    fn drop(&mut self) {
        //  Safety:
        //  -   `self.pointer` is owned by `self`, and no longer in use.
        unsafe { MY_ALLOCATOR.deallocate(self.pointer) }
    }
}

unsafe impl Send for Allocation {}
