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

//! Configuration errors.
//!
//! Every invalid input is rejected while the space, the bounds or the model
//! are being built. Once a `DispersionModel` exists the search has no error
//! path: infeasibility and aborted runs are outcomes, not errors.

use thiserror::Error;

/// An invalid problem configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The grid side length must be positive.
    #[error("grid size must be positive, got {0}")]
    InvalidGridSize(usize),

    /// A metric space needs at least one candidate point.
    #[error("point set is empty")]
    EmptyPointSet,

    /// All points of a metric space must share one dimension.
    #[error("point {index} has {found} coordinates but {expected} were expected")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// A Manhattan distance does not fit the distance type.
    #[error("distance between points {first} and {second} overflows the distance type")]
    DistanceOverflow { first: usize, second: usize },

    /// At least one facility must be placed.
    #[error("number of facilities must be positive")]
    NoFacilities,

    /// More facilities than candidate points can never be placed distinctly.
    ///
    /// Rejected while building the model rather than reported as an
    /// infeasible search result, so the CLI exits with status 2.
    #[error("cannot place {requested} facilities on {available} candidate points")]
    TooManyFacilities { requested: usize, available: usize },

    /// Bounds were generated for a different number of facilities.
    #[error("pair bounds cover {found} facilities but the model places {expected}")]
    BoundsDimensionMismatch { expected: usize, found: usize },

    /// A pair bound admits no distance at all.
    #[error("bound for facilities {first} and {second} is empty: lower {lower} >= upper {upper}")]
    InvalidBound {
        first: usize,
        second: usize,
        lower: i64,
        upper: i64,
    },

    /// Random bounds need a maximum distance of at least 3.
    #[error("maximum distance {0} is too small to draw random bounds (need at least 3)")]
    BoundRangeTooSmall(i64),
}

#[cfg(test)]
mod tests {
    use super::ConfigError;

    #[test]
    fn test_messages_name_the_offending_values() {
        let err = ConfigError::TooManyFacilities {
            requested: 5,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "cannot place 5 facilities on 4 candidate points"
        );

        let err = ConfigError::InvalidBound {
            first: 0,
            second: 2,
            lower: 4,
            upper: 4,
        };
        assert!(err.to_string().contains("lower 4 >= upper 4"));
    }
}
