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

//! Constraint propagation
//!
//! Propagators narrow variable domains until nothing more can be inferred.
//! Each constraint of a `DispersionModel` becomes one propagator:
//!
//! - `AllDifferentPropagator`: removes fixed values from the other variables
//!   and fails when fewer values than variables remain.
//! - `ElementPropagator`: keeps `result = table[row * n + col]` consistent in
//!   all three directions, including narrowing `row` and `col` from `result`.
//! - `RangePropagator`: restricts a variable to an admissible band.
//! - `LinearInequalityPropagator`: bounds reasoning on `lhs + offset <= rhs`.
//!
//! All domain changes go through `PropagationContext`, which records them on
//! the trail and reports the touched variables to the `PropagationEngine`.
//! The engine re-runs every propagator watching a touched variable until a
//! fixpoint is reached or some domain becomes empty.

pub mod all_different;
pub mod element;
pub mod engine;
pub mod linear;
pub mod range;

use crate::{domain::Domain, state::SearchState, trail::SearchTrail};
use dispersa_model::index::VariableIndex;
use fixedbitset::FixedBitSet;

/// A domain became empty while propagating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Inconsistency {
    /// The variable whose domain was wiped out.
    pub variable: VariableIndex,
}

impl std::fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Inconsistency(domain of {} is empty)", self.variable)
    }
}

impl std::error::Error for Inconsistency {}

pub type PropagationResult = Result<(), Inconsistency>;

/// Trailed, change-tracking access to the domains of a search node.
pub struct PropagationContext<'a> {
    state: &'a mut SearchState,
    trail: &'a mut SearchTrail,
    modified: &'a mut Vec<VariableIndex>,
    modified_flags: &'a mut FixedBitSet,
}

impl<'a> PropagationContext<'a> {
    #[inline]
    pub(crate) fn new(
        state: &'a mut SearchState,
        trail: &'a mut SearchTrail,
        modified: &'a mut Vec<VariableIndex>,
        modified_flags: &'a mut FixedBitSet,
    ) -> Self {
        Self {
            state,
            trail,
            modified,
            modified_flags,
        }
    }

    #[inline]
    pub fn domain(&self, variable: VariableIndex) -> &Domain {
        self.state.domain(variable)
    }

    #[inline]
    fn mark(&mut self, variable: VariableIndex) {
        if !self.modified_flags.put(variable.get()) {
            self.modified.push(variable);
        }
    }

    /// Removes `value` from `variable`.
    ///
    /// # Errors
    ///
    /// Returns `Inconsistency` if the domain becomes empty.
    #[inline]
    pub fn remove(&mut self, variable: VariableIndex, value: usize) -> PropagationResult {
        if self.trail.remove_value(self.state, variable, value) {
            self.mark(variable);
            if self.state.domain(variable).is_empty() {
                return Err(Inconsistency { variable });
            }
        }
        Ok(())
    }

    /// Keeps only the values of `variable` for which `keep` holds.
    ///
    /// Returns whether anything was removed.
    pub fn retain<F>(&mut self, variable: VariableIndex, mut keep: F) -> Result<bool, Inconsistency>
    where
        F: FnMut(usize) -> bool,
    {
        let domain = self.state.domain(variable);
        if domain.is_empty() {
            return Err(Inconsistency { variable });
        }
        let (min, max) = (domain.min(), domain.max());
        let mut changed = false;
        for value in min..=max {
            if self.state.domain(variable).contains(value) && !keep(value) {
                self.remove(variable, value)?;
                changed = true;
            }
        }
        Ok(changed)
    }

    /// Removes every value below `bound`.
    #[inline]
    pub fn remove_below(
        &mut self,
        variable: VariableIndex,
        bound: usize,
    ) -> Result<bool, Inconsistency> {
        if self.state.domain(variable).min() >= bound {
            return Ok(false);
        }
        self.retain(variable, |v| v >= bound)
    }

    /// Removes every value above `bound`.
    #[inline]
    pub fn remove_above(
        &mut self,
        variable: VariableIndex,
        bound: usize,
    ) -> Result<bool, Inconsistency> {
        if self.state.domain(variable).max() <= bound {
            return Ok(false);
        }
        self.retain(variable, |v| v <= bound)
    }

    /// Fixes `variable` to `value`.
    #[inline]
    pub fn assign(&mut self, variable: VariableIndex, value: usize) -> PropagationResult {
        if !self.state.domain(variable).contains(value) {
            // Clear the domain so the failure is trailed like any other wipe-out.
            self.retain(variable, |_| false)?;
            return Err(Inconsistency { variable });
        }
        self.retain(variable, |v| v == value).map(|_| ())
    }
}

/// A filtering algorithm for one constraint.
pub trait Propagator: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Variables whose changes should wake this propagator.
    fn scope(&self) -> &[VariableIndex];

    /// Narrows the domains in `ctx` to this propagator's own fixpoint.
    ///
    /// # Errors
    ///
    /// Returns `Inconsistency` if the constraint cannot be satisfied.
    fn propagate(&self, ctx: &mut PropagationContext<'_>) -> PropagationResult;

    /// Checks the constraint on a state where its whole scope is fixed.
    ///
    /// Returns `false` if some scope variable is unfixed.
    fn is_satisfied(&self, state: &SearchState) -> bool;
}

impl std::fmt::Display for dyn Propagator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Propagator({})", self.name())
    }
}

/// Returns the fixed values of `variables`, or `None` if any is unfixed.
pub(crate) fn fixed_values(state: &SearchState, variables: &[VariableIndex]) -> Option<Vec<usize>> {
    variables.iter().map(|&v| state.domain(v).value()).collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::Harness;
    use super::*;
    use dispersa_model::{model::DispersionModelBuilder, space::MetricSpace};

    fn harness() -> Harness {
        let space = MetricSpace::<i64>::grid(3).unwrap();
        let model = DispersionModelBuilder::from_space(&space, 2).build().unwrap();
        Harness::new(&model)
    }

    fn var(i: usize) -> VariableIndex {
        VariableIndex::new(i)
    }

    #[test]
    fn test_remove_marks_variable_once() {
        let mut h = harness();
        let mut ctx = h.ctx();
        ctx.remove(var(0), 3).unwrap();
        ctx.remove(var(0), 4).unwrap();
        ctx.remove(var(0), 4).unwrap();
        assert_eq!(h.modified, vec![var(0)]);
        assert_eq!(h.state.domain(var(0)).size(), 7);
        assert_eq!(h.trail.num_entries(), 2);
    }

    #[test]
    fn test_bounds_and_assign() {
        let mut h = harness();
        let mut ctx = h.ctx();
        assert!(ctx.remove_below(var(0), 2).unwrap());
        assert!(!ctx.remove_below(var(0), 1).unwrap());
        assert!(ctx.remove_above(var(0), 6).unwrap());
        assert_eq!(ctx.domain(var(0)).to_string(), "[2..6]");
        ctx.assign(var(0), 4).unwrap();
        assert_eq!(ctx.domain(var(0)).value(), Some(4));
    }

    #[test]
    fn test_wipe_out_reports_inconsistency() {
        let mut h = harness();
        let mut ctx = h.ctx();
        assert_eq!(
            ctx.remove_below(var(1), 9),
            Err(Inconsistency { variable: var(1) })
        );

        let mut h = harness();
        let mut ctx = h.ctx();
        ctx.remove(var(0), 5).unwrap();
        assert_eq!(ctx.assign(var(0), 5), Err(Inconsistency { variable: var(0) }));
        assert!(h.state.domain(var(0)).is_empty());
        h.trail.backtrack(&mut h.state);
        assert_eq!(h.state.domain(var(0)).size(), 9);
    }
}
