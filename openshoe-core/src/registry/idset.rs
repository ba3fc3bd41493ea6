//! 256-bit set of byte identifiers

use core::fmt;

/// Set of `u8` identifiers stored as a 256-bit bitmap
///
/// Membership tests are a shift and a mask. Iteration is in ascending ID
/// order, which is also the order states appear in a report.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IdSet {
    bits: [u8; 32],
}

impl IdSet {
    /// Create an empty set
    pub const fn new() -> Self {
        Self { bits: [0; 32] }
    }

    /// Add `id`; returns false if it was already present
    pub fn insert(&mut self, id: u8) -> bool {
        let (byte, mask) = Self::slot(id);
        let fresh = self.bits[byte] & mask == 0;
        self.bits[byte] |= mask;
        fresh
    }

    /// Remove `id`
    pub fn remove(&mut self, id: u8) {
        let (byte, mask) = Self::slot(id);
        self.bits[byte] &= !mask;
    }

    /// Check whether `id` is present
    pub fn contains(&self, id: u8) -> bool {
        let (byte, mask) = Self::slot(id);
        self.bits[byte] & mask != 0
    }

    /// Remove every ID
    pub fn clear(&mut self) {
        self.bits = [0; 32];
    }

    /// Check whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    /// Number of IDs in the set
    pub fn len(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Iterate over IDs in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |&id| self.contains(id))
    }

    const fn slot(id: u8) -> (usize, u8) {
        ((id >> 3) as usize, 1 << (id & 7))
    }
}

impl fmt::Debug for IdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<u8> for IdSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}
