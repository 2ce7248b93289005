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

//! Metric space of candidate points
//!
//! A `MetricSpace<T>` owns an ordered list of candidate points and their
//! pairwise Manhattan distances. Points keep the order they were supplied in;
//! for square grids that order is row-major, so point `k` of a `size x size`
//! grid is `(k / size, k % size)`.
//!
//! The distance matrix is stored flat (`D[i][j]` at `i * n + j`), which is the
//! layout the element propagator indexes into. Construction guarantees a
//! symmetric matrix with a zero diagonal that satisfies the triangle
//! inequality, since all three follow from the L1 metric.

use crate::{error::ConfigError, index::PointIndex, num::DistanceNumeric};
use smallvec::SmallVec;

/// An integer coordinate tuple.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    coordinates: SmallVec<[i64; 2]>,
}

impl Point {
    /// Creates a point from its coordinates.
    #[inline]
    pub fn new<I>(coordinates: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        Self {
            coordinates: coordinates.into_iter().collect(),
        }
    }

    /// Creates a planar point.
    #[inline]
    pub fn planar(x: i64, y: i64) -> Self {
        Self::new([x, y])
    }

    /// Returns the number of coordinates.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.coordinates.len()
    }

    /// Returns the coordinates.
    #[inline]
    pub fn coordinates(&self) -> &[i64] {
        &self.coordinates
    }

    /// Returns the L1 distance to `other`, or `None` on overflow.
    ///
    /// Both points must have the same dimension.
    #[inline]
    pub fn manhattan_distance(&self, other: &Point) -> Option<i64> {
        debug_assert_eq!(
            self.dimension(),
            other.dimension(),
            "called `Point::manhattan_distance` with points of different dimension"
        );

        self.coordinates
            .iter()
            .zip(other.coordinates.iter())
            .try_fold(0i64, |acc, (&a, &b)| {
                let delta = a.checked_sub(b)?.checked_abs()?;
                acc.checked_add(delta)
            })
    }
}

impl From<(i64, i64)> for Point {
    fn from((x, y): (i64, i64)) -> Self {
        Self::planar(x, y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coordinates.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

/// Flattened, row-major `n x n` distance matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistanceMatrix<T> {
    num_points: usize,
    distances: Vec<T>,
    max_distance: T,
}

impl<T> DistanceMatrix<T>
where
    T: DistanceNumeric,
{
    /// Computes the Manhattan distance matrix of `points`.
    fn from_points(points: &[Point]) -> Result<Self, ConfigError> {
        let n = points.len();
        let mut distances = vec![T::zero(); n * n];
        let mut max_distance = T::zero();

        for i in 0..n {
            for j in (i + 1)..n {
                let raw = points[i]
                    .manhattan_distance(&points[j])
                    .ok_or(ConfigError::DistanceOverflow {
                        first: i,
                        second: j,
                    })?;
                let d = T::from_i64(raw).ok_or(ConfigError::DistanceOverflow {
                    first: i,
                    second: j,
                })?;
                distances[i * n + j] = d;
                distances[j * n + i] = d;
                max_distance = max_distance.max(d);
            }
        }

        Ok(Self {
            num_points: n,
            distances,
            max_distance,
        })
    }

    /// Returns the number of points (rows and columns).
    #[inline]
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Returns the flat index of `(row, col)`.
    #[inline]
    pub fn flatten_index(&self, row: usize, col: usize) -> usize {
        row * self.num_points + col
    }

    /// Returns the distance between two points.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, a: PointIndex, b: PointIndex) -> T {
        let (a, b) = (a.get(), b.get());
        assert!(
            a < self.num_points && b < self.num_points,
            "called `DistanceMatrix::get` with point index out of bounds: the len is {} but the indices are {} and {}",
            self.num_points,
            a,
            b
        );
        self.distances[self.flatten_index(a, b)]
    }

    /// Returns the entry at flat position `index`.
    #[inline]
    pub fn get_flat(&self, index: usize) -> T {
        debug_assert!(
            index < self.distances.len(),
            "called `DistanceMatrix::get_flat` with index out of bounds: the len is {} but the index is {}",
            self.distances.len(),
            index
        );
        self.distances[index]
    }

    /// Returns the flat buffer.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.distances
    }

    /// Returns row `i` of the matrix.
    #[inline]
    pub fn row(&self, i: PointIndex) -> &[T] {
        let start = i.get() * self.num_points;
        &self.distances[start..start + self.num_points]
    }

    /// Returns the largest entry (`maxD`).
    #[inline]
    pub fn max_distance(&self) -> T {
        self.max_distance
    }

    /// Returns `true` if `D[i][j] == D[j][i]` and `D[i][i] == 0` everywhere.
    pub fn is_symmetric_with_zero_diagonal(&self) -> bool {
        let n = self.num_points;
        (0..n).all(|i| {
            self.distances[i * n + i].is_zero()
                && ((i + 1)..n).all(|j| self.distances[i * n + j] == self.distances[j * n + i])
        })
    }
}

impl<T> std::fmt::Display for DistanceMatrix<T>
where
    T: DistanceNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.max_distance.to_string().len().max(2);
        for row in self.distances.chunks(self.num_points.max(1)) {
            for (j, d) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:>width$}", d, width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Candidate points together with their distance matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricSpace<T> {
    points: Vec<Point>,
    distances: DistanceMatrix<T>,
}

impl<T> MetricSpace<T>
where
    T: DistanceNumeric,
{
    /// Builds the `size x size` grid `{(r, c) : 0 <= r, c < size}` in
    /// row-major order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidGridSize` if `size` is zero.
    pub fn grid(size: usize) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::InvalidGridSize(size));
        }

        let side = i64::try_from(size).map_err(|_| ConfigError::DistanceOverflow {
            first: 0,
            second: size * size - 1,
        })?;
        let points = (0..side).flat_map(|r| (0..side).map(move |c| Point::planar(r, c)));
        Self::from_points(points)
    }

    /// Builds a space from explicit points, keeping their order.
    ///
    /// # Errors
    ///
    /// Fails if the list is empty, the points disagree on their dimension,
    /// or a distance does not fit into `T`.
    pub fn from_points<I>(points: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator,
        I::Item: Into<Point>,
    {
        let points: Vec<Point> = points.into_iter().map(Into::into).collect();
        let first = points.first().ok_or(ConfigError::EmptyPointSet)?;
        let expected = first.dimension();

        if let Some((index, p)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| p.dimension() != expected)
        {
            return Err(ConfigError::DimensionMismatch {
                index,
                expected,
                found: p.dimension(),
            });
        }

        let distances = DistanceMatrix::from_points(&points)?;
        Ok(Self { points, distances })
    }

    /// Returns the number of candidate points `n`.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Returns all candidate points.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the point at `index`.
    #[inline]
    pub fn point(&self, index: PointIndex) -> &Point {
        &self.points[index.get()]
    }

    /// Returns the distance matrix.
    #[inline]
    pub fn distances(&self) -> &DistanceMatrix<T> {
        &self.distances
    }

    /// Returns the distance between two points.
    #[inline]
    pub fn distance(&self, a: PointIndex, b: PointIndex) -> T {
        self.distances.get(a, b)
    }

    /// Returns the largest pairwise distance.
    #[inline]
    pub fn max_distance(&self) -> T {
        self.distances.max_distance()
    }
}
