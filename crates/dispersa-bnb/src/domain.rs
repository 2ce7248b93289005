// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Finite integer domains.
//!
//! A `Domain` is the set of values a variable may still take, stored as a
//! bitset over `0..capacity`. Size, minimum and maximum are cached so the hot
//! queries of the propagators and branching heuristics are O(1); removing the
//! current minimum or maximum rescans towards the other end.

use fixedbitset::FixedBitSet;

/// A mutable set of candidate values for one variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain {
    values: FixedBitSet,
    size: usize,
    min: usize,
    max: usize,
}

impl Domain {
    /// Creates the domain `[lower, upper]`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `lower > upper`.
    #[inline]
    pub fn new(lower: usize, upper: usize) -> Self {
        debug_assert!(
            lower <= upper,
            "called `Domain::new` with empty range: lower {} > upper {}",
            lower,
            upper
        );
        let mut values = FixedBitSet::with_capacity(upper + 1);
        values.insert_range(lower..upper + 1);
        Self {
            values,
            size: upper - lower + 1,
            min: lower,
            max: upper,
        }
    }

    /// Number of values left.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns `true` if exactly one value is left.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.size == 1
    }

    /// Returns the single remaining value, if the domain is fixed.
    #[inline]
    pub fn value(&self) -> Option<usize> {
        self.is_fixed().then_some(self.min)
    }

    /// Smallest value left. Meaningless on an empty domain.
    #[inline]
    pub fn min(&self) -> usize {
        debug_assert!(!self.is_empty(), "called `Domain::min` on an empty domain");
        self.min
    }

    /// Largest value left. Meaningless on an empty domain.
    #[inline]
    pub fn max(&self) -> usize {
        debug_assert!(!self.is_empty(), "called `Domain::max` on an empty domain");
        self.max
    }

    /// Upper end of the representable range (exclusive).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn contains(&self, value: usize) -> bool {
        value < self.values.len() && self.values.contains(value)
    }

    /// Iterates over the remaining values in ascending order.
    #[inline]
    pub fn iter(&self) -> fixedbitset::Ones<'_> {
        self.values.ones()
    }

    /// Returns the underlying bitset.
    #[inline]
    pub fn as_bitset(&self) -> &FixedBitSet {
        &self.values
    }

    /// Removes `value`. Returns `true` if it was present.
    pub fn remove(&mut self, value: usize) -> bool {
        if !self.contains(value) {
            return false;
        }
        self.values.set(value, false);
        self.size -= 1;

        if self.size == 0 {
            return true;
        }
        if value == self.min {
            self.min = self.values.ones().next().unwrap_or(self.max);
        }
        if value == self.max {
            self.max = (self.min..value)
                .rev()
                .find(|&v| self.values.contains(v))
                .unwrap_or(self.min);
        }
        true
    }

    /// Re-inserts a previously removed `value`. Used when undoing removals.
    pub fn restore(&mut self, value: usize) {
        debug_assert!(
            value < self.values.len(),
            "called `Domain::restore` with value out of bounds: the capacity is {} but the value is {}",
            self.values.len(),
            value
        );
        if self.values.put(value) {
            return;
        }
        if self.size == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.size += 1;
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "{{}}");
        }
        if self.max - self.min + 1 == self.size {
            return write!(f, "[{}..{}]", self.min, self.max);
        }
        write!(f, "{{")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::Domain;

    #[test]
    fn test_new_range() {
        let d = Domain::new(2, 5);
        assert_eq!(d.size(), 4);
        assert_eq!(d.min(), 2);
        assert_eq!(d.max(), 5);
        assert!(!d.contains(1));
        assert!(d.contains(3));
        assert!(!d.contains(100));
        assert_eq!(d.iter().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_remove_updates_min_and_max() {
        let mut d = Domain::new(0, 4);
        assert!(d.remove(0));
        assert_eq!(d.min(), 1);
        assert!(d.remove(4));
        assert_eq!(d.max(), 3);
        assert!(d.remove(2));
        assert_eq!((d.min(), d.max(), d.size()), (1, 3, 2));
        assert!(!d.remove(2));
        assert!(d.remove(3));
        assert!(d.is_fixed());
        assert_eq!(d.value(), Some(1));
        assert!(d.remove(1));
        assert!(d.is_empty());
    }

    #[test]
    fn test_restore_in_reverse_order() {
        let mut d = Domain::new(0, 3);
        let removed = [3, 0, 1, 2];
        for v in removed {
            d.remove(v);
        }
        assert!(d.is_empty());
        for v in removed.iter().rev() {
            d.restore(*v);
        }
        assert_eq!(d, Domain::new(0, 3));
    }

    #[test]
    fn test_display() {
        let mut d = Domain::new(1, 4);
        assert_eq!(d.to_string(), "[1..4]");
        d.remove(2);
        assert_eq!(d.to_string(), "{1, 3, 4}");
        for v in [1, 3, 4] {
            d.remove(v);
        }
        assert_eq!(d.to_string(), "{}");
    }
}
