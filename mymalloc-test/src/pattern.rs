//! A recognizable byte sequence.

/// Pattern
///
/// A byte sequence derived from a seed, such that two patterns with distinct seeds differ at every index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pattern(u8);

impl Pattern {
    /// Creates an instance.
    pub fn new(seed: u8) -> Self { Self(seed) }

    /// Returns the byte expected at `index`.
    pub fn byte(&self, index: usize) -> u8 { (index as u8).wrapping_mul(31).wrapping_add(self.0) }

    /// Fills `bytes` with the pattern.
    pub fn fill(&self, bytes: &mut [u8]) {
        for (index, byte) in bytes.iter_mut().enumerate() {
            *byte = self.byte(index);
        }
    }

    /// Returns whether `bytes` holds the pattern.
    pub fn check(&self, bytes: &[u8]) -> bool {
        bytes.iter().enumerate().all(|(index, byte)| *byte == self.byte(index))
    }
}

// mod tests
