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

//! Pairwise distance bounds
//!
//! `PairBounds<T>` restricts the distance between every pair of facilities
//! `(i, j)` to a band `[lower, upper]`. Whether the band ends are part of it
//! is an explicit `BoundSemantics` choice: the default `Exclusive` admits
//! `lower < d < upper`, while `Inclusive` admits `lower <= d <= upper`.
//!
//! The tables are symmetric `p x p` matrices; only the strict upper triangle
//! is ever read by the model. Random bounds are drawn per unordered pair:
//! `lower` uniformly from `[1, maxD / 3]` and `upper` uniformly from
//! `[lower + 2, maxD]`, which leaves at least one admissible integer even
//! under exclusive semantics.

use crate::{error::ConfigError, num::DistanceNumeric};
use rand::Rng;

/// Whether the ends of a bound band are admissible distances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BoundSemantics {
    /// `lower < d < upper`.
    #[default]
    Exclusive,
    /// `lower <= d <= upper`.
    Inclusive,
}

impl BoundSemantics {
    /// Returns `true` if `value` lies within the band.
    #[inline]
    pub fn admits<T>(self, lower: T, upper: T, value: T) -> bool
    where
        T: PartialOrd,
    {
        match self {
            BoundSemantics::Exclusive => lower < value && value < upper,
            BoundSemantics::Inclusive => lower <= value && value <= upper,
        }
    }
}

impl std::fmt::Display for BoundSemantics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundSemantics::Exclusive => write!(f, "Exclusive"),
            BoundSemantics::Inclusive => write!(f, "Inclusive"),
        }
    }
}

/// Symmetric lower and upper distance bounds for every facility pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairBounds<T> {
    num_facilities: usize,
    lower: Vec<T>,
    upper: Vec<T>,
    semantics: BoundSemantics,
}

impl<T> PairBounds<T>
where
    T: DistanceNumeric,
{
    /// Creates bounds where every pair shares the band `[lower, upper]`.
    pub fn uniform(num_facilities: usize, lower: T, upper: T, semantics: BoundSemantics) -> Self {
        let len = num_facilities * num_facilities;
        Self {
            num_facilities,
            lower: vec![lower; len],
            upper: vec![upper; len],
            semantics,
        }
    }

    /// Draws bounds for `num_facilities` facilities from `rng`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::BoundRangeTooSmall` if `max_distance < 3`, where
    /// `[1, maxD / 3]` would be empty.
    pub fn random<R>(
        num_facilities: usize,
        max_distance: T,
        semantics: BoundSemantics,
        rng: &mut R,
    ) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
    {
        let max: i64 = max_distance.into();
        if max < 3 {
            return Err(ConfigError::BoundRangeTooSmall(max));
        }

        let mut bounds = Self::uniform(num_facilities, T::zero(), max_distance, semantics);
        for i in 0..num_facilities {
            for j in (i + 1)..num_facilities {
                let lower = rng.random_range(1..=max / 3);
                let upper = rng.random_range(lower + 2..=max);
                // Both draws lie in [1, max], which T represents.
                bounds.set(
                    i,
                    j,
                    T::from_i64(lower).unwrap_or(T::one()),
                    T::from_i64(upper).unwrap_or(max_distance),
                );
            }
        }

        tracing::debug!(
            num_facilities,
            max_distance = max,
            %semantics,
            "generated random pair bounds"
        );

        Ok(bounds)
    }

    /// Sets the band for the unordered pair `{first, second}`.
    ///
    /// # Panics
    ///
    /// Panics if either facility is out of range.
    #[inline]
    pub fn set(&mut self, first: usize, second: usize, lower: T, upper: T) {
        assert!(
            first < self.num_facilities && second < self.num_facilities,
            "called `PairBounds::set` with facility out of bounds: the len is {} but the indices are {} and {}",
            self.num_facilities,
            first,
            second
        );
        let p = self.num_facilities;
        self.lower[first * p + second] = lower;
        self.lower[second * p + first] = lower;
        self.upper[first * p + second] = upper;
        self.upper[second * p + first] = upper;
    }

    /// Returns the number of facilities covered.
    #[inline]
    pub fn num_facilities(&self) -> usize {
        self.num_facilities
    }

    /// Returns the bound semantics.
    #[inline]
    pub fn semantics(&self) -> BoundSemantics {
        self.semantics
    }

    /// Returns a copy with different semantics.
    #[inline]
    pub fn with_semantics(mut self, semantics: BoundSemantics) -> Self {
        self.semantics = semantics;
        self
    }

    #[inline]
    pub fn lower(&self, first: usize, second: usize) -> T {
        self.lower[first * self.num_facilities + second]
    }

    #[inline]
    pub fn upper(&self, first: usize, second: usize) -> T {
        self.upper[first * self.num_facilities + second]
    }

    /// Returns row `i` of the lower-bound table.
    #[inline]
    pub fn lower_row(&self, i: usize) -> &[T] {
        let start = i * self.num_facilities;
        &self.lower[start..start + self.num_facilities]
    }

    /// Returns row `i` of the upper-bound table.
    #[inline]
    pub fn upper_row(&self, i: usize) -> &[T] {
        let start = i * self.num_facilities;
        &self.upper[start..start + self.num_facilities]
    }

    /// Returns `true` if `distance` is admissible for the pair.
    #[inline]
    pub fn admits(&self, first: usize, second: usize, distance: T) -> bool {
        self.semantics.admits(
            self.lower(first, second),
            self.upper(first, second),
            distance,
        )
    }

    /// Checks that every pair has `lower < upper`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBound` for the first offending pair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for i in 0..self.num_facilities {
            for j in (i + 1)..self.num_facilities {
                let (lower, upper) = (self.lower(i, j), self.upper(i, j));
                if lower >= upper {
                    return Err(ConfigError::InvalidBound {
                        first: i,
                        second: j,
                        lower: lower.into(),
                        upper: upper.into(),
                    });
                }
            }
        }
        Ok(())
    }
}
