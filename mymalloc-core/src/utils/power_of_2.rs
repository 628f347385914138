//! An integer guaranteed to be a PowerOf2.

use core::num;

/// PowerOf2
///
/// An integral guaranteed to be non-zero and a power of 2.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub(crate) struct PowerOf2(num::NonZeroUsize);

impl PowerOf2 {
    /// Creates a new instance of PowerOf2.
    ///
    /// Or nothing if the value is not a power of 2.
    #[cfg(test)]
    pub(crate) fn new(value: usize) -> Option<PowerOf2> {
        if value.count_ones() == 1 {
            //  Safety:
            //  -   Value is a power of 2, as per the if check.
            Some(unsafe { PowerOf2::new_unchecked(value) })
        } else {
            None
        }
    }

    /// Creates a new instance of PowerOf2.
    ///
    /// #   Safety
    ///
    /// Assumes that the value is a power of 2.
    pub(crate) const unsafe fn new_unchecked(value: usize) -> PowerOf2 {
        //  Safety:
        //  -   A power of 2 cannot be 0.
        PowerOf2(num::NonZeroUsize::new_unchecked(value))
    }

    /// Returns the inner value.
    pub(crate) const fn value(&self) -> usize { self.0.get() }

    /// Rounds the value up to the nearest higher multiple of `self`, or None on overflow.
    pub(crate) const fn checked_round_up(&self, n: usize) -> Option<usize> {
        let mask = self.mask();

        match n.checked_add(mask) {
            Some(n) => Some(n & !mask),
            None => None,
        }
    }

    /// Returns whether `n` is a multiple of `self`.
    pub(crate) const fn is_multiple(&self, n: usize) -> bool { n & self.mask() == 0 }

    const fn mask(&self) -> usize { self.value() - 1 }
}

#[cfg(test)]
mod tests {

use super::*;

#[test]
fn power_of_2_new() {
    fn new(value: usize) -> Option<usize> {
        PowerOf2::new(value).map(|p| p.value())
    }

    assert_eq!(None, new(0));
    assert_eq!(Some(1), new(1));
    assert_eq!(Some(2), new(2));
    assert_eq!(None, new(3));
    assert_eq!(Some(4), new(4));
    assert_eq!(None, new(12));
}

#[test]
fn power_of_2_checked_round_up() {
    fn round_up(pow2: usize, n: usize) -> Option<usize> {
        PowerOf2::new(pow2).expect("Power of 2").checked_round_up(n)
    }

    assert_eq!(Some(0), round_up(4, 0));
    assert_eq!(Some(4), round_up(4, 1));
    assert_eq!(Some(4), round_up(4, 4));
    assert_eq!(Some(8), round_up(4, 5));
    assert_eq!(Some(13), round_up(1, 13));

    assert_eq!(Some(usize::MAX - 3), round_up(4, usize::MAX - 3));
    assert_eq!(None, round_up(4, usize::MAX - 2));
    assert_eq!(None, round_up(4, usize::MAX));
}

#[test]
fn power_of_2_is_multiple() {
    let four = PowerOf2::new(4).expect("Power of 2");

    assert!(four.is_multiple(0));
    assert!(!four.is_multiple(1));
    assert!(!four.is_multiple(3));
    assert!(four.is_multiple(4));
    assert!(four.is_multiple(1024));
    assert!(!four.is_multiple(1026));
}

} // mod tests
