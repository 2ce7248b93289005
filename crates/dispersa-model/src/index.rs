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

//! # Strongly Typed Indices
//!
//! Phantom-tagged wrappers around `usize` that keep the three index spaces of
//! a dispersion model apart: candidate points, facilities and model variables.
//! A facility index used where a point index is expected fails to compile,
//! and the wrapper is `#[repr(transparent)]`, so the compiled code is still a
//! bare `usize`.
//!
//! ```rust
//! use dispersa_model::index::{FacilityIndex, PointIndex};
//!
//! let facility = FacilityIndex::new(1);
//! let point = PointIndex::new(7);
//! assert_eq!(facility.get(), 1);
//! assert_eq!(format!("{}", point), "PointIndex(7)");
//! ```

/// Tags a typed index with a human-readable name for `Debug` and `Display`.
pub trait TypedIndexTag: Clone {
    const NAME: &'static str;
}

/// A `usize` index bound to the index space named by `T`.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypedIndex<T> {
    index: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T> TypedIndex<T> {
    /// Creates a new typed index.
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            _marker: std::marker::PhantomData,
        }
    }

    /// Returns the underlying `usize`.
    #[inline(always)]
    pub const fn get(&self) -> usize {
        self.index
    }
}

impl<T> std::fmt::Debug for TypedIndex<T>
where
    T: TypedIndexTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T> std::fmt::Display for TypedIndex<T>
where
    T: TypedIndexTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T> From<usize> for TypedIndex<T> {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

impl<T> From<TypedIndex<T>> for usize {
    fn from(typed_index: TypedIndex<T>) -> Self {
        typed_index.index
    }
}

impl<T> std::ops::Add<usize> for TypedIndex<T> {
    type Output = Self;

    fn add(self, rhs: usize) -> Self::Output {
        Self::new(self.index + rhs)
    }
}

impl<T> std::ops::Sub<usize> for TypedIndex<T> {
    type Output = Self;

    fn sub(self, rhs: usize) -> Self::Output {
        Self::new(self.index - rhs)
    }
}

/// A tag type for candidate point indices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PointIndexTag;

impl TypedIndexTag for PointIndexTag {
    const NAME: &'static str = "PointIndex";
}

/// Position of a candidate point in the metric space (row-major for grids).
pub type PointIndex = TypedIndex<PointIndexTag>;

/// A tag type for facility indices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FacilityIndexTag;

impl TypedIndexTag for FacilityIndexTag {
    const NAME: &'static str = "FacilityIndex";
}

/// Label `k` of the facility variable `F_k`.
pub type FacilityIndex = TypedIndex<FacilityIndexTag>;

/// A tag type for model variable indices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct VariableIndexTag;

impl TypedIndexTag for VariableIndexTag {
    const NAME: &'static str = "VariableIndex";
}

/// Position of a decision variable in a `DispersionModel`.
pub type VariableIndex = TypedIndex<VariableIndexTag>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_get_and_conversions() {
        let p = PointIndex::new(10);
        assert_eq!(p.get(), 10);

        let from: FacilityIndex = 4.into();
        assert_eq!(from.get(), 4);

        let raw: usize = VariableIndex::new(3).into();
        assert_eq!(raw, 3);
    }

    #[test]
    fn test_display_uses_tag_name() {
        assert_eq!(format!("{}", PointIndex::new(7)), "PointIndex(7)");
        assert_eq!(format!("{:?}", FacilityIndex::new(2)), "FacilityIndex(2)");
        assert_eq!(format!("{}", VariableIndex::new(0)), "VariableIndex(0)");
    }

    #[test]
    fn test_offset_arithmetic() {
        let f = FacilityIndex::new(5);
        assert_eq!((f + 1).get(), 6);
        assert_eq!((f - 5).get(), 0);
    }

    #[test]
    fn test_ordering_follows_inner_value() {
        assert!(PointIndex::new(1) < PointIndex::new(2));
        assert_eq!(PointIndex::new(3), PointIndex::new(3));
    }
}
