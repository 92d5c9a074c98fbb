//! # Signatures
//!
//! A signature is a fixed-width bitset over component-type ids.
//! Systems carry the set of types they require; entities carry the set
//! they currently own. Matching is a handful of word-wise ANDs.

use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Small integer id assigned to a component type.
pub type ComponentType = u8;

const WORDS: usize = 4;

/// Bitmask over component-type ids (256 bits).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    bits: [u64; WORDS],
}

impl Signature {
    /// Number of distinct component types a signature can describe.
    pub const CAPACITY: usize = WORDS * 64;

    /// Signature with no bits set.
    pub const EMPTY: Self = Self { bits: [0; WORDS] };

    /// Creates an empty signature.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Builds a signature from a list of component types.
    #[must_use]
    pub fn from_types(types: &[ComponentType]) -> Self {
        types.iter().fold(Self::EMPTY, |sig, &id| sig.with(id))
    }

    #[inline]
    const fn locate(id: ComponentType) -> (usize, u64) {
        ((id / 64) as usize, 1u64 << (id % 64))
    }

    /// Returns a copy with `id` set.
    #[inline]
    #[must_use]
    pub fn with(mut self, id: ComponentType) -> Self {
        let (word, mask) = Self::locate(id);
        self.bits[word] |= mask;
        self
    }

    /// Sets the bit for `id`.
    #[inline]
    pub fn set(&mut self, id: ComponentType) {
        let (word, mask) = Self::locate(id);
        self.bits[word] |= mask;
    }

    /// Clears the bit for `id`.
    #[inline]
    pub fn reset(&mut self, id: ComponentType) {
        let (word, mask) = Self::locate(id);
        self.bits[word] &= !mask;
    }

    /// Checks if the bit for `id` is set.
    #[inline]
    #[must_use]
    pub const fn contains(&self, id: ComponentType) -> bool {
        let (word, mask) = Self::locate(id);
        self.bits[word] & mask != 0
    }

    /// Checks that every bit of `required` is also set in `self`.
    ///
    /// An empty `required` is matched by every signature.
    #[inline]
    #[must_use]
    pub fn matches(&self, required: &Self) -> bool {
        self.bits
            .iter()
            .zip(required.bits.iter())
            .all(|(have, need)| have & need == *need)
    }

    /// Union of two signatures.
    #[inline]
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        *self | *other
    }

    /// Checks if no bit is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    /// Number of set bits.
    #[inline]
    #[must_use]
    pub fn count(&self) -> u32 {
        self.bits.iter().copied().map(u64::count_ones).sum()
    }

    /// Clears every bit.
    #[inline]
    pub fn clear(&mut self) {
        self.bits = [0; WORDS];
    }

    /// Iterates over the set component types in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ComponentType> + '_ {
        (0..Self::CAPACITY)
            .filter_map(|i| u8::try_from(i).ok())
            .filter(move |&id| self.contains(id))
    }
}

impl BitOr for Signature {
    type Output = Self;

    fn bitor(mut self, rhs: Self) -> Self {
        self |= rhs;
        self
    }
}

impl BitOrAssign for Signature {
    fn bitor_assign(&mut self, rhs: Self) {
        for (word, other) in self.bits.iter_mut().zip(rhs.bits) {
            *word |= other;
        }
    }
}

impl BitAnd for Signature {
    type Output = Self;

    fn bitand(mut self, rhs: Self) -> Self {
        for (word, other) in self.bits.iter_mut().zip(rhs.bits) {
            *word &= other;
        }
        self
    }
}

impl FromIterator<ComponentType> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentType>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_reset() {
        let mut sig = Signature::new();
        assert!(!sig.contains(5));

        sig.set(5);
        sig.set(200);
        assert!(sig.contains(5));
        assert!(sig.contains(200));
        assert_eq!(sig.count(), 2);

        sig.reset(5);
        assert!(!sig.contains(5));
        assert!(sig.contains(200));
    }

    #[test]
    fn test_matches_requires_all_bits() {
        let required = Signature::from_types(&[0, 1]);
        assert!(!Signature::from_types(&[0]).matches(&required));
        assert!(Signature::from_types(&[0, 1]).matches(&required));
        assert!(Signature::from_types(&[0, 1, 70]).matches(&required));
    }

    #[test]
    fn test_empty_required_matches_anything() {
        assert!(Signature::EMPTY.matches(&Signature::EMPTY));
        assert!(Signature::from_types(&[3]).matches(&Signature::EMPTY));
    }

    #[test]
    fn test_combine_and_intersection() {
        let a = Signature::from_types(&[1, 64]);
        let b = Signature::from_types(&[2, 64]);
        assert_eq!(a.combine(&b), Signature::from_types(&[1, 2, 64]));
        assert_eq!(a & b, Signature::from_types(&[64]));
    }

    #[test]
    fn test_iter_ascending() {
        let sig: Signature = [255, 3, 128].into_iter().collect();
        assert_eq!(sig.iter().collect::<Vec<_>>(), vec![3, 128, 255]);
    }
}
