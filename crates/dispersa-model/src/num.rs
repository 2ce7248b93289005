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

//! Numeric requirements for distance values.
//!
//! Distances are integral and signed so that bound arithmetic (`lower - 1`,
//! `upper + 1`) stays well defined at the edges. `Into<i64>` lets the shared
//! incumbent store objectives in an atomic without knowing `T`.

use num_traits::{FromPrimitive, PrimInt, Signed};

/// Trait alias for the integer types usable as distances and objectives.
pub trait DistanceNumeric:
    PrimInt
    + Signed
    + FromPrimitive
    + Into<i64>
    + std::fmt::Debug
    + std::fmt::Display
    + std::hash::Hash
    + Send
    + Sync
    + 'static
{
}

impl<T> DistanceNumeric for T where
    T: PrimInt
        + Signed
        + FromPrimitive
        + Into<i64>
        + std::fmt::Debug
        + std::fmt::Display
        + std::hash::Hash
        + Send
        + Sync
        + 'static
{
}

#[cfg(test)]
mod tests {
    use super::DistanceNumeric;

    fn accepts<T: DistanceNumeric>(value: T) -> i64 {
        value.into()
    }

    #[test]
    fn test_signed_primitives_are_distance_numeric() {
        assert_eq!(accepts(7i8), 7);
        assert_eq!(accepts(-3i16), -3);
        assert_eq!(accepts(42i32), 42);
        assert_eq!(accepts(i64::MAX), i64::MAX);
    }
}
