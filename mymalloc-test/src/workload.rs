//! A reproducible stream of heap operations.

/// Operation
///
/// An operation to apply to a heap, in terms of "slots": the indices of the currently live allocations, as tracked
/// by the test itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Allocates `size` bytes, pushing a new slot.
    Allocate {
        /// Requested size.
        size: usize,
    },
    /// Frees the allocation in `slot`, removing it.
    Free {
        /// Index of the live allocation.
        slot: usize,
    },
    /// Reallocates the allocation in `slot` to `size` bytes.
    Reallocate {
        /// Index of the live allocation.
        slot: usize,
        /// Requested size.
        size: usize,
    },
}

/// Workload
///
/// Generates a stream of operations from a seed, using a xorshift generator: the same seed always yields the same
/// stream, so that failures can be replayed.
///
/// #   Example
///
/// ```
/// use mymalloc_test::{Operation, Workload};
///
/// let mut workload = Workload::new(42, 64);
///
/// //  With nothing live, the only possible operation is an allocation.
/// match workload.operation(0) {
///     Operation::Allocate { size } => assert!(size <= 64),
///     operation => panic!("Unexpected {:?}", operation),
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Workload {
    state: u64,
    max_size: usize,
}

impl Workload {
    /// Creates an instance.
    ///
    /// Requested sizes are within `[0, max_size]`.
    pub fn new(seed: u64, max_size: usize) -> Self {
        //  Xorshift is stuck on 0.
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };

        Self { state, max_size }
    }

    /// Returns the next operation, given the number of live allocations.
    ///
    /// Allocations are favoured, so that the heap fills up over time.
    pub fn operation(&mut self, live: usize) -> Operation {
        if live == 0 {
            return Operation::Allocate { size: self.size() };
        }

        match self.next() % 8 {
            0..=3 => Operation::Allocate { size: self.size() },
            4..=5 => Operation::Free { slot: self.below(live) },
            _ => Operation::Reallocate { slot: self.below(live), size: self.size() },
        }
    }

    fn size(&mut self) -> usize { self.below(self.max_size + 1) }

    fn below(&mut self, bound: usize) -> usize { (self.next() % bound as u64) as usize }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

// mod tests
