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

use crate::{
    index::{FacilityIndex, PointIndex},
    num::DistanceNumeric,
    space::DistanceMatrix,
};

/// A facility assignment together with its objective.
///
/// Facility `k` sits on point `facilities[k]`. The objective is the smallest
/// pairwise distance among the chosen points as reported by the solver; use
/// `min_pairwise_distance` to recompute it from a distance matrix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Solution<T> {
    objective_value: T,
    facilities: Vec<PointIndex>,
}

impl<T> Solution<T>
where
    T: Copy,
{
    /// Creates a new solution.
    #[inline]
    pub fn new(objective_value: T, facilities: Vec<PointIndex>) -> Self {
        Self {
            objective_value,
            facilities,
        }
    }

    /// Returns the objective value.
    #[inline]
    pub fn objective_value(&self) -> T {
        self.objective_value
    }

    /// Returns the number of placed facilities.
    #[inline]
    pub fn num_facilities(&self) -> usize {
        self.facilities.len()
    }

    /// Returns the point facility `index` is placed on.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn facility_point(&self, index: FacilityIndex) -> PointIndex {
        let i = index.get();
        assert!(
            i < self.facilities.len(),
            "called `Solution::facility_point` with facility index out of bounds: the len is {} but the index is {}",
            self.facilities.len(),
            i
        );
        self.facilities[i]
    }

    /// Returns all placements, indexed by facility.
    #[inline]
    pub fn facilities(&self) -> &[PointIndex] {
        &self.facilities
    }

    /// Returns `true` if no two facilities share a point.
    pub fn is_distinct(&self) -> bool {
        let mut seen: Vec<PointIndex> = self.facilities.clone();
        seen.sort_unstable();
        seen.windows(2).all(|w| w[0] != w[1])
    }
}

impl<T> Solution<T>
where
    T: DistanceNumeric,
{
    /// Recomputes `min_{i<j} D[x_i][x_j]`, or `None` with fewer than two facilities.
    pub fn min_pairwise_distance(&self, distances: &DistanceMatrix<T>) -> Option<T> {
        let mut best: Option<T> = None;
        for (i, &a) in self.facilities.iter().enumerate() {
            for &b in &self.facilities[i + 1..] {
                let d = distances.get(a, b);
                best = Some(best.map_or(d, |m| m.min(d)));
            }
        }
        best
    }
}

impl<T> std::fmt::Display for Solution<T>
where
    T: Copy + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution Summary")?;
        writeln!(f, "   Objective Value: {}", self.objective_value)?;
        writeln!(f)?;

        if self.facilities.is_empty() {
            writeln!(f, "   (No facilities placed)")?;
            return Ok(());
        }

        writeln!(f, "   {:<10} | {:<10}", "Facility", "Point")?;
        writeln!(f, "   {:-<10}-+-{:-<10}", "", "")?;
        for (k, point) in self.facilities.iter().enumerate() {
            writeln!(f, "   {:<10} | {:<10}", k, point.get())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::MetricSpace;

    type IntegerType = i64;

    fn sol(objective: IntegerType, points: &[usize]) -> Solution<IntegerType> {
        Solution::new(objective, points.iter().copied().map(PointIndex::new).collect())
    }

    #[test]
    fn test_accessors() {
        let s = sol(4, &[0, 8]);
        assert_eq!(s.objective_value(), 4);
        assert_eq!(s.num_facilities(), 2);
        assert_eq!(s.facility_point(FacilityIndex::new(1)), PointIndex::new(8));
        assert!(s.is_distinct());
        assert!(!sol(0, &[3, 1, 3]).is_distinct());
    }

    #[test]
    fn test_min_pairwise_distance_recomputes_objective() {
        let space = MetricSpace::<IntegerType>::grid(3).unwrap();
        let s = sol(2, &[0, 2, 8]);
        assert_eq!(s.min_pairwise_distance(space.distances()), Some(2));
        assert_eq!(sol(4, &[4]).min_pairwise_distance(space.distances()), None);
    }

    #[test]
    #[should_panic(expected = "called `Solution::facility_point` with facility index out of bounds")]
    fn test_facility_point_out_of_bounds() {
        let _ = sol(1, &[0]).facility_point(FacilityIndex::new(1));
    }

    #[test]
    fn test_display_lists_facilities() {
        let out = sol(4, &[0, 8]).to_string();
        assert!(out.contains("Objective Value: 4"));
        assert!(out.contains("Facility"));
        assert!(out.lines().any(|l| l.trim_start().starts_with("1 ") && l.contains("8")));
        assert!(sol(0, &[]).to_string().contains("No facilities placed"));
    }
}
