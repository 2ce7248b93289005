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

//! Search state
//!
//! `SearchState` holds the current domain of every model variable. It is the
//! only mutable data of a search node; all changes go through `SearchTrail`
//! so they can be undone on backtrack.
//!
//! A node is a leaf once every facility variable is fixed. At that point the
//! element propagators have fixed every `d_ij` and the linear inequalities
//! have capped the objective at `min d_ij`, so the objective of the leaf is
//! the maximum of the objective domain.

use crate::domain::Domain;
use dispersa_model::{
    index::{PointIndex, VariableIndex},
    model::DispersionModel,
    num::DistanceNumeric,
    solution::Solution,
};

/// The domains of all variables at the current search node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchState {
    domains: Vec<Domain>,
    num_facilities: usize,
    objective: VariableIndex,
}

impl SearchState {
    /// Creates the root state with the initial domains of `model`.
    pub fn new<T>(model: &DispersionModel<T>) -> Self
    where
        T: DistanceNumeric,
    {
        let domains = model
            .variables()
            .iter()
            .map(|v| Domain::new(v.lower(), v.upper()))
            .collect();
        Self {
            domains,
            num_facilities: model.num_facilities(),
            objective: model.objective_variable(),
        }
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.domains.len()
    }

    /// Returns the domain of `variable`.
    #[inline]
    pub fn domain(&self, variable: VariableIndex) -> &Domain {
        debug_assert!(
            variable.get() < self.domains.len(),
            "called `SearchState::domain` with variable index out of bounds: the len is {} but the index is {}",
            self.domains.len(),
            variable.get()
        );
        &self.domains[variable.get()]
    }

    /// Mutable access for the trail. Removals made here bypass undo.
    #[inline]
    pub(crate) fn domain_mut(&mut self, variable: VariableIndex) -> &mut Domain {
        &mut self.domains[variable.get()]
    }

    #[inline]
    pub fn is_fixed(&self, variable: VariableIndex) -> bool {
        self.domain(variable).is_fixed()
    }

    /// Number of facility variables that are fixed.
    #[inline]
    pub fn num_fixed_facilities(&self) -> usize {
        self.domains[..self.num_facilities]
            .iter()
            .filter(|d| d.is_fixed())
            .count()
    }

    /// Returns `true` if every facility variable is fixed.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.domains[..self.num_facilities]
            .iter()
            .all(Domain::is_fixed)
    }

    /// Largest objective value still reachable from this node.
    #[inline]
    pub fn objective_upper_bound(&self) -> usize {
        self.domains[self.objective.get()].max()
    }

    /// Returns the facility placement if every facility is fixed.
    pub fn placement(&self) -> Option<Vec<PointIndex>> {
        self.domains[..self.num_facilities]
            .iter()
            .map(|d| d.value().map(PointIndex::new))
            .collect()
    }

    /// Extracts the solution of a leaf node.
    ///
    /// # Errors
    ///
    /// Returns `IncompleteSolutionError` if some facility is still unfixed.
    pub fn to_solution<T>(&self) -> Result<Solution<T>, IncompleteSolutionError>
    where
        T: DistanceNumeric,
    {
        let placement = self.placement().ok_or(IncompleteSolutionError {
            fixed: self.num_fixed_facilities(),
            total: self.num_facilities,
        })?;
        let objective = T::from_usize(self.objective_upper_bound()).unwrap_or_else(T::max_value);
        Ok(Solution::new(objective, placement))
    }
}

impl std::fmt::Display for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchState(fixed facilities: {}/{}, objective: {})",
            self.num_fixed_facilities(),
            self.num_facilities,
            self.domains[self.objective.get()]
        )
    }
}

/// Raised when a non-leaf state is turned into a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncompleteSolutionError {
    pub fixed: usize,
    pub total: usize,
}

impl std::fmt::Display for IncompleteSolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cannot build a solution: only {} of {} facilities are fixed",
            self.fixed, self.total
        )
    }
}

impl std::error::Error for IncompleteSolutionError {}
