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

//! Declarative p-dispersion model
//!
//! `DispersionModel<T>` describes the constraint network that the search
//! engine solves. It holds no search state: variables are declared with their
//! initial integer domains and constraints are plain data, so one model can be
//! shared by any number of solver threads.
//!
//! Variables are laid out contiguously:
//! - `F_0 .. F_{p-1}`: the point each facility occupies, domain `[0, n-1]`.
//! - `d_ij` for every `i < j` in lexicographic pair order, domain `[0, maxD]`.
//! - `B`: the objective, domain `[0, maxD]`, maximized.
//!
//! Constraints posted by `DispersionModelBuilder::build`, in order:
//! - `AllDifferent(F_0 .. F_{p-1})`.
//! - `Element`: `d_ij = D[F_i * n + F_j]` for every pair.
//! - `Range`: `d_ij` within its pair bound, when bounds are supplied.
//! - `LinearInequality`: `B <= d_ij` for every pair.
//! - `LinearInequality`: `F_k + 1 <= F_{k+1}` when symmetry breaking is active.
//!
//! Symmetry breaking is only posted for unbounded models. Pair bounds attach
//! to facility labels, so permuting labels can change feasibility.

use crate::{
    bounds::{BoundSemantics, PairBounds},
    error::ConfigError,
    index::{FacilityIndex, PointIndex, VariableIndex},
    num::DistanceNumeric,
    space::{DistanceMatrix, MetricSpace},
};

/// The role a variable plays in the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// `F_k`, the point chosen for facility `k`.
    Facility(FacilityIndex),
    /// `d_ij`, the distance between facilities `i < j`.
    PairDistance(FacilityIndex, FacilityIndex),
    /// `B`, the minimum pairwise distance.
    Objective,
}

/// A variable with its initial domain `[lower, upper]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VariableDecl {
    kind: VariableKind,
    lower: usize,
    upper: usize,
}

impl VariableDecl {
    #[inline]
    fn new(kind: VariableKind, lower: usize, upper: usize) -> Self {
        debug_assert!(
            lower <= upper,
            "called `VariableDecl::new` with empty domain: lower {} > upper {}",
            lower,
            upper
        );
        Self { kind, lower, upper }
    }

    #[inline]
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// Smallest initial domain value.
    #[inline]
    pub fn lower(&self) -> usize {
        self.lower
    }

    /// Largest initial domain value.
    #[inline]
    pub fn upper(&self) -> usize {
        self.upper
    }

    /// Number of values in the initial domain.
    #[inline]
    pub fn domain_size(&self) -> usize {
        self.upper - self.lower + 1
    }
}

impl std::fmt::Display for VariableDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            VariableKind::Facility(k) => write!(f, "F_{}", k.get())?,
            VariableKind::PairDistance(i, j) => write!(f, "d_{}_{}", i.get(), j.get())?,
            VariableKind::Objective => write!(f, "B")?,
        }
        write!(f, " in [{}, {}]", self.lower, self.upper)
    }
}

/// A constraint over model variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint<T> {
    /// All listed variables take pairwise different values.
    AllDifferent { variables: Vec<VariableIndex> },
    /// `result = D[row * n + col]` for the model's distance matrix `D`.
    Element {
        row: VariableIndex,
        col: VariableIndex,
        result: VariableIndex,
    },
    /// `variable` lies within `(lower, upper)` or `[lower, upper]`.
    Range {
        variable: VariableIndex,
        lower: T,
        upper: T,
        semantics: BoundSemantics,
    },
    /// `lhs + offset <= rhs`.
    LinearInequality {
        lhs: VariableIndex,
        rhs: VariableIndex,
        offset: i64,
    },
}

impl<T> Constraint<T> {
    /// Returns the variables the constraint mentions.
    pub fn scope(&self) -> Vec<VariableIndex> {
        match self {
            Constraint::AllDifferent { variables } => variables.clone(),
            Constraint::Element { row, col, result } => vec![*row, *col, *result],
            Constraint::Range { variable, .. } => vec![*variable],
            Constraint::LinearInequality { lhs, rhs, .. } => vec![*lhs, *rhs],
        }
    }

    /// Returns a short name for the constraint kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Constraint::AllDifferent { .. } => "AllDifferent",
            Constraint::Element { .. } => "Element",
            Constraint::Range { .. } => "Range",
            Constraint::LinearInequality { .. } => "LinearInequality",
        }
    }
}

impl<T> std::fmt::Display for Constraint<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::AllDifferent { variables } => {
                write!(f, "AllDifferent(")?;
                for (i, v) in variables.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "x{}", v.get())?;
                }
                write!(f, ")")
            }
            Constraint::Element { row, col, result } => write!(
                f,
                "x{} = D[x{} * n + x{}]",
                result.get(),
                row.get(),
                col.get()
            ),
            Constraint::Range {
                variable,
                lower,
                upper,
                semantics,
            } => match semantics {
                BoundSemantics::Exclusive => {
                    write!(f, "{} < x{} < {}", lower, variable.get(), upper)
                }
                BoundSemantics::Inclusive => {
                    write!(f, "{} <= x{} <= {}", lower, variable.get(), upper)
                }
            },
            Constraint::LinearInequality { lhs, rhs, offset } => {
                write!(f, "x{} + {} <= x{}", lhs.get(), offset, rhs.get())
            }
        }
    }
}

/// Immutable p-dispersion constraint model.
#[derive(Clone, Debug)]
pub struct DispersionModel<T> {
    distances: DistanceMatrix<T>,
    num_facilities: usize,
    variables: Vec<VariableDecl>,
    constraints: Vec<Constraint<T>>,
    bounds: Option<PairBounds<T>>,
    symmetry_breaking: bool,
}

impl<T> DispersionModel<T>
where
    T: DistanceNumeric,
{
    /// Returns the number of candidate points `n`.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.distances.num_points()
    }

    /// Returns the number of facilities `p`.
    #[inline]
    pub fn num_facilities(&self) -> usize {
        self.num_facilities
    }

    /// Returns the number of facility pairs `p (p - 1) / 2`.
    #[inline]
    pub fn num_pairs(&self) -> usize {
        self.num_facilities * self.num_facilities.saturating_sub(1) / 2
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    #[inline]
    pub fn variables(&self) -> &[VariableDecl] {
        &self.variables
    }

    /// Returns the declaration of `index`.
    #[inline]
    pub fn variable(&self, index: VariableIndex) -> &VariableDecl {
        &self.variables[index.get()]
    }

    #[inline]
    pub fn constraints(&self) -> &[Constraint<T>] {
        &self.constraints
    }

    /// Returns the distance matrix the element constraints index into.
    #[inline]
    pub fn distances(&self) -> &DistanceMatrix<T> {
        &self.distances
    }

    /// Returns the largest pairwise distance.
    #[inline]
    pub fn max_distance(&self) -> T {
        self.distances.max_distance()
    }

    #[inline]
    pub fn bounds(&self) -> Option<&PairBounds<T>> {
        self.bounds.as_ref()
    }

    /// Returns `true` if `F_k < F_{k+1}` was posted.
    #[inline]
    pub fn has_symmetry_breaking(&self) -> bool {
        self.symmetry_breaking
    }

    /// Returns the variable `F_k`.
    #[inline]
    pub fn facility_variable(&self, facility: FacilityIndex) -> VariableIndex {
        debug_assert!(
            facility.get() < self.num_facilities,
            "called `DispersionModel::facility_variable` with facility index out of bounds: the len is {} but the index is {}",
            self.num_facilities,
            facility.get()
        );
        VariableIndex::new(facility.get())
    }

    /// Returns the facility variables `F_0 .. F_{p-1}` as a contiguous range.
    #[inline]
    pub fn facility_variables(&self) -> impl Iterator<Item = VariableIndex> + '_ {
        (0..self.num_facilities).map(VariableIndex::new)
    }

    /// Returns the variable `d_ij`; the pair is unordered.
    ///
    /// # Panics
    ///
    /// Panics if `first == second` or either index is out of bounds.
    #[inline]
    pub fn pair_variable(&self, first: FacilityIndex, second: FacilityIndex) -> VariableIndex {
        let (i, j) = (first.get().min(second.get()), first.get().max(second.get()));
        assert!(
            i < j && j < self.num_facilities,
            "called `DispersionModel::pair_variable` with invalid pair ({}, {}) for {} facilities",
            first.get(),
            second.get(),
            self.num_facilities
        );
        let p = self.num_facilities;
        let offset = i * (2 * p - i - 1) / 2 + (j - i - 1);
        VariableIndex::new(p + offset)
    }

    /// Returns the objective variable `B`.
    #[inline]
    pub fn objective_variable(&self) -> VariableIndex {
        VariableIndex::new(self.variables.len() - 1)
    }

    /// Returns every pair `(i, j, d_ij)` with `i < j`.
    pub fn pairs(&self) -> impl Iterator<Item = (FacilityIndex, FacilityIndex, VariableIndex)> + '_ {
        let p = self.num_facilities;
        (0..p)
            .flat_map(move |i| ((i + 1)..p).map(move |j| (i, j)))
            .enumerate()
            .map(move |(offset, (i, j))| {
                (
                    FacilityIndex::new(i),
                    FacilityIndex::new(j),
                    VariableIndex::new(p + offset),
                )
            })
    }

    /// Evaluates a placement against the problem constraints.
    ///
    /// Returns the objective `min_{i<j} D[x_i][x_j]` if the placement is
    /// complete, distinct, in range and respects every pair bound. With one
    /// facility there are no pairs and the objective is `maxD`. The symmetry
    /// breaking order is not a problem constraint and is not checked.
    pub fn evaluate(&self, placement: &[PointIndex]) -> Option<T> {
        if placement.len() != self.num_facilities {
            return None;
        }
        let n = self.num_points();
        if placement.iter().any(|p| p.get() >= n) {
            return None;
        }

        let mut objective = self.max_distance();
        for (i, &a) in placement.iter().enumerate() {
            for (offset, &b) in placement[i + 1..].iter().enumerate() {
                let j = i + 1 + offset;
                if a == b {
                    return None;
                }
                let d = self.distances.get(a, b);
                if let Some(bounds) = &self.bounds
                    && !bounds.admits(i, j, d)
                {
                    return None;
                }
                objective = objective.min(d);
            }
        }
        Some(objective)
    }
}

impl<T> std::fmt::Display for DispersionModel<T>
where
    T: DistanceNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DispersionModel(points: {}, facilities: {}, variables: {}, constraints: {}, bounded: {}, symmetry_breaking: {})",
            self.num_points(),
            self.num_facilities,
            self.variables.len(),
            self.constraints.len(),
            self.bounds.is_some(),
            self.symmetry_breaking
        )
    }
}

/// Builder for `DispersionModel`.
#[derive(Clone, Debug)]
pub struct DispersionModelBuilder<T> {
    distances: DistanceMatrix<T>,
    num_facilities: usize,
    bounds: Option<PairBounds<T>>,
    symmetry_breaking: bool,
}

impl<T> DispersionModelBuilder<T>
where
    T: DistanceNumeric,
{
    /// Starts a model placing `num_facilities` facilities on the points of `distances`.
    #[inline]
    pub fn new(distances: DistanceMatrix<T>, num_facilities: usize) -> Self {
        Self {
            distances,
            num_facilities,
            bounds: None,
            symmetry_breaking: true,
        }
    }

    /// Starts a model over the points of `space`.
    #[inline]
    pub fn from_space(space: &MetricSpace<T>, num_facilities: usize) -> Self {
        Self::new(space.distances().clone(), num_facilities)
    }

    /// Restricts every pair distance to its band in `bounds`.
    #[inline]
    pub fn with_bounds(mut self, bounds: PairBounds<T>) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Same as `with_bounds`, but accepts an optional value.
    #[inline]
    pub fn with_optional_bounds(mut self, bounds: Option<PairBounds<T>>) -> Self {
        self.bounds = bounds;
        self
    }

    /// Enables or disables the `F_k < F_{k+1}` ordering (on by default).
    #[inline]
    pub fn with_symmetry_breaking(mut self, enabled: bool) -> Self {
        self.symmetry_breaking = enabled;
        self
    }

    /// Validates the configuration and assembles the model.
    ///
    /// # Errors
    ///
    /// - `ConfigError::NoFacilities` if `p == 0`.
    /// - `ConfigError::TooManyFacilities` if `p > n`.
    /// - `ConfigError::BoundsDimensionMismatch` if the bounds cover a different `p`.
    /// - `ConfigError::InvalidBound` if some pair has `lower >= upper`.
    pub fn build(self) -> Result<DispersionModel<T>, ConfigError> {
        let n = self.distances.num_points();
        let p = self.num_facilities;

        if p == 0 {
            return Err(ConfigError::NoFacilities);
        }
        if p > n {
            return Err(ConfigError::TooManyFacilities {
                requested: p,
                available: n,
            });
        }
        if let Some(bounds) = &self.bounds {
            if bounds.num_facilities() != p {
                return Err(ConfigError::BoundsDimensionMismatch {
                    expected: p,
                    found: bounds.num_facilities(),
                });
            }
            bounds.validate()?;
        }

        let max_d = self.distances.max_distance().to_usize().unwrap_or(0);
        let num_pairs = p * (p - 1) / 2;

        let mut variables = Vec::with_capacity(p + num_pairs + 1);
        variables.extend(
            (0..p).map(|k| VariableDecl::new(VariableKind::Facility(FacilityIndex::new(k)), 0, n - 1)),
        );
        for i in 0..p {
            for j in (i + 1)..p {
                variables.push(VariableDecl::new(
                    VariableKind::PairDistance(FacilityIndex::new(i), FacilityIndex::new(j)),
                    0,
                    max_d,
                ));
            }
        }
        variables.push(VariableDecl::new(VariableKind::Objective, 0, max_d));
        let objective = VariableIndex::new(variables.len() - 1);

        let facility = |k: usize| VariableIndex::new(k);
        let mut constraints = Vec::with_capacity(1 + 3 * num_pairs + p);
        constraints.push(Constraint::AllDifferent {
            variables: (0..p).map(facility).collect(),
        });

        let mut pair = p;
        for i in 0..p {
            for j in (i + 1)..p {
                let d_ij = VariableIndex::new(pair);
                pair += 1;

                constraints.push(Constraint::Element {
                    row: facility(i),
                    col: facility(j),
                    result: d_ij,
                });
                if let Some(bounds) = &self.bounds {
                    constraints.push(Constraint::Range {
                        variable: d_ij,
                        lower: bounds.lower(i, j),
                        upper: bounds.upper(i, j),
                        semantics: bounds.semantics(),
                    });
                }
                constraints.push(Constraint::LinearInequality {
                    lhs: objective,
                    rhs: d_ij,
                    offset: 0,
                });
            }
        }

        let symmetry_breaking = self.symmetry_breaking && self.bounds.is_none();
        if self.symmetry_breaking && !symmetry_breaking {
            tracing::debug!("symmetry breaking skipped: pair bounds distinguish facility labels");
        }
        if symmetry_breaking {
            for k in 1..p {
                constraints.push(Constraint::LinearInequality {
                    lhs: facility(k - 1),
                    rhs: facility(k),
                    offset: 1,
                });
            }
        }

        let model = DispersionModel {
            distances: self.distances,
            num_facilities: p,
            variables,
            constraints,
            bounds: self.bounds,
            symmetry_breaking,
        };

        tracing::debug!(%model, "built dispersion model");
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type IntegerType = i64;

    fn grid(size: usize) -> MetricSpace<IntegerType> {
        MetricSpace::grid(size).unwrap()
    }

    fn points(indices: &[usize]) -> Vec<PointIndex> {
        indices.iter().copied().map(PointIndex::new).collect()
    }

    #[test]
    fn test_variable_layout() {
        let model = DispersionModelBuilder::from_space(&grid(3), 3).build().unwrap();
        assert_eq!(model.num_points(), 9);
        assert_eq!(model.num_facilities(), 3);
        assert_eq!(model.num_pairs(), 3);
        assert_eq!(model.num_variables(), 3 + 3 + 1);

        let f1 = model.variable(model.facility_variable(FacilityIndex::new(1)));
        assert_eq!(f1.kind(), VariableKind::Facility(FacilityIndex::new(1)));
        assert_eq!((f1.lower(), f1.upper()), (0, 8));

        let b = model.variable(model.objective_variable());
        assert_eq!(b.kind(), VariableKind::Objective);
        assert_eq!(b.domain_size(), 5);
    }

    #[test]
    fn test_pair_variable_matches_pairs_iterator() {
        let model = DispersionModelBuilder::from_space(&grid(3), 4).build().unwrap();
        for (i, j, var) in model.pairs() {
            assert_eq!(model.pair_variable(i, j), var);
            assert_eq!(model.pair_variable(j, i), var);
            assert_eq!(model.variable(var).kind(), VariableKind::PairDistance(i, j));
        }
        assert_eq!(model.pairs().count(), 6);
    }

    #[test]
    #[should_panic(expected = "called `DispersionModel::pair_variable` with invalid pair")]
    fn test_pair_variable_rejects_diagonal() {
        let model = DispersionModelBuilder::from_space(&grid(2), 2).build().unwrap();
        let _ = model.pair_variable(FacilityIndex::new(1), FacilityIndex::new(1));
    }

    #[test]
    fn test_constraint_list_unbounded() {
        let model = DispersionModelBuilder::from_space(&grid(3), 3).build().unwrap();
        let kinds: Vec<&str> = model.constraints().iter().map(|c| c.kind_name()).collect();
        assert_eq!(kinds.iter().filter(|k| **k == "AllDifferent").count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == "Element").count(), 3);
        assert_eq!(kinds.iter().filter(|k| **k == "Range").count(), 0);
        // three objective links plus two ordering constraints
        assert_eq!(kinds.iter().filter(|k| **k == "LinearInequality").count(), 5);
        assert!(model.has_symmetry_breaking());
    }

    #[test]
    fn test_bounds_disable_symmetry_breaking() {
        let bounds = PairBounds::uniform(3, 0, 5, BoundSemantics::Exclusive);
        let model = DispersionModelBuilder::from_space(&grid(3), 3)
            .with_bounds(bounds)
            .build()
            .unwrap();
        assert!(!model.has_symmetry_breaking());
        let ranges = model
            .constraints()
            .iter()
            .filter(|c| matches!(c, Constraint::Range { .. }))
            .count();
        assert_eq!(ranges, 3);
    }

    #[test]
    fn test_symmetry_breaking_can_be_disabled() {
        let model = DispersionModelBuilder::from_space(&grid(2), 2)
            .with_symmetry_breaking(false)
            .build()
            .unwrap();
        assert!(!model.has_symmetry_breaking());
        assert_eq!(model.constraints().len(), 3);
    }

    #[test]
    fn test_configuration_errors() {
        let space = grid(2);
        assert_eq!(
            DispersionModelBuilder::from_space(&space, 0).build().unwrap_err(),
            ConfigError::NoFacilities
        );
        assert_eq!(
            DispersionModelBuilder::from_space(&space, 5).build().unwrap_err(),
            ConfigError::TooManyFacilities {
                requested: 5,
                available: 4
            }
        );
        assert_eq!(
            DispersionModelBuilder::from_space(&space, 2)
                .with_bounds(PairBounds::uniform(3, 0, 2, BoundSemantics::Exclusive))
                .build()
                .unwrap_err(),
            ConfigError::BoundsDimensionMismatch {
                expected: 2,
                found: 3
            }
        );
        assert!(matches!(
            DispersionModelBuilder::from_space(&space, 2)
                .with_bounds(PairBounds::uniform(2, 2, 2, BoundSemantics::Inclusive))
                .build(),
            Err(ConfigError::InvalidBound { .. })
        ));
    }

    #[test]
    fn test_p_equals_n_is_allowed() {
        let model = DispersionModelBuilder::from_space(&grid(2), 4).build().unwrap();
        assert_eq!(model.num_pairs(), 6);
    }

    #[test]
    fn test_evaluate() {
        let model = DispersionModelBuilder::from_space(&grid(3), 3).build().unwrap();
        assert_eq!(model.evaluate(&points(&[0, 2, 8])), Some(2));
        assert_eq!(model.evaluate(&points(&[8, 2, 0])), Some(2));
        assert_eq!(model.evaluate(&points(&[0, 0, 8])), None);
        assert_eq!(model.evaluate(&points(&[0, 9, 8])), None);
        assert_eq!(model.evaluate(&points(&[0, 8])), None);

        let single = DispersionModelBuilder::from_space(&grid(3), 1).build().unwrap();
        assert_eq!(single.evaluate(&points(&[4])), Some(4));
    }

    #[test]
    fn test_evaluate_respects_bounds() {
        let mut bounds = PairBounds::uniform(2, 1, 4, BoundSemantics::Exclusive);
        bounds.set(0, 1, 1, 4);
        let model = DispersionModelBuilder::from_space(&grid(3), 2)
            .with_bounds(bounds.clone())
            .build()
            .unwrap();
        assert_eq!(model.evaluate(&points(&[0, 8])), None);
        assert_eq!(model.evaluate(&points(&[0, 5])), Some(3));

        let inclusive = DispersionModelBuilder::from_space(&grid(3), 2)
            .with_bounds(bounds.with_semantics(BoundSemantics::Inclusive))
            .build()
            .unwrap();
        assert_eq!(inclusive.evaluate(&points(&[0, 8])), Some(4));
    }

    #[test]
    fn test_display() {
        let model = DispersionModelBuilder::from_space(&grid(2), 2).build().unwrap();
        let s = model.to_string();
        assert!(s.contains("points: 4"));
        assert!(s.contains("facilities: 2"));
        assert_eq!(
            model.constraints()[1].to_string(),
            "x2 = D[x0 * n + x1]"
        );
        assert_eq!(model.variables()[2].to_string(), "d_0_1 in [0, 2]");
    }
}
