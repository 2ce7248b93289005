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
    propagation::{
        Inconsistency, PropagationContext, PropagationResult, Propagator,
        all_different::AllDifferentPropagator, element::ElementPropagator,
        linear::LinearInequalityPropagator, range::RangePropagator,
    },
    state::SearchState,
    trail::SearchTrail,
};
use dispersa_model::{
    index::VariableIndex,
    model::{Constraint, DispersionModel},
    num::DistanceNumeric,
};
use fixedbitset::FixedBitSet;
use std::collections::VecDeque;
use std::sync::Arc;

/// Runs propagators to a common fixpoint.
///
/// Propagators are woken through per-variable watch lists: whenever a domain
/// shrinks, every propagator with that variable in its scope is queued once.
/// The propagator that caused a change is not re-queued by it, since each
/// propagator leaves its own scope at a fixpoint.
#[derive(Debug)]
pub struct PropagationEngine {
    propagators: Vec<Box<dyn Propagator>>,
    watchers: Vec<Vec<usize>>,
    queue: VecDeque<usize>,
    queued: FixedBitSet,
    modified: Vec<VariableIndex>,
    modified_flags: FixedBitSet,
}

impl PropagationEngine {
    /// Creates an engine without propagators for `num_variables` variables.
    pub fn new(num_variables: usize) -> Self {
        Self {
            propagators: Vec::new(),
            watchers: vec![Vec::new(); num_variables],
            queue: VecDeque::new(),
            queued: FixedBitSet::new(),
            modified: Vec::with_capacity(num_variables),
            modified_flags: FixedBitSet::with_capacity(num_variables),
        }
    }

    /// Creates one propagator per constraint of `model`.
    pub fn from_model<T>(model: &DispersionModel<T>) -> Self
    where
        T: DistanceNumeric,
    {
        let mut engine = Self::new(model.num_variables());
        let table = ElementPropagator::table_from(model.distances());
        let n = model.num_points();

        for constraint in model.constraints() {
            let propagator: Box<dyn Propagator> = match constraint {
                Constraint::AllDifferent { variables } => {
                    Box::new(AllDifferentPropagator::new(variables.clone()))
                }
                Constraint::Element { row, col, result } => Box::new(ElementPropagator::new(
                    *row,
                    *col,
                    *result,
                    Arc::clone(&table),
                    n,
                )),
                Constraint::Range {
                    variable,
                    lower,
                    upper,
                    semantics,
                } => Box::new(RangePropagator::new(
                    *variable,
                    (*lower).into(),
                    (*upper).into(),
                    *semantics,
                )),
                Constraint::LinearInequality { lhs, rhs, offset } => {
                    Box::new(LinearInequalityPropagator::new(*lhs, *rhs, *offset))
                }
            };
            engine.add(propagator);
        }

        engine
    }

    /// Registers a propagator and its watch list entries.
    pub fn add(&mut self, propagator: Box<dyn Propagator>) {
        let id = self.propagators.len();
        for variable in propagator.scope() {
            debug_assert!(
                variable.get() < self.watchers.len(),
                "called `PropagationEngine::add` with variable index out of bounds: the len is {} but the index is {}",
                self.watchers.len(),
                variable.get()
            );
            self.watchers[variable.get()].push(id);
        }
        self.propagators.push(propagator);
        self.queued.grow(self.propagators.len());
    }

    #[inline]
    pub fn num_propagators(&self) -> usize {
        self.propagators.len()
    }

    /// Iterates over the registered propagators.
    pub fn propagators(&self) -> impl Iterator<Item = &dyn Propagator> {
        self.propagators.iter().map(|p| p.as_ref())
    }

    /// Queues every propagator; used once at the root.
    pub fn schedule_all(&mut self) {
        for id in 0..self.propagators.len() {
            if !self.queued.put(id) {
                self.queue.push_back(id);
            }
        }
    }

    /// Fixes `variable` to `value` and records the change for the next fixpoint.
    pub fn assign(
        &mut self,
        state: &mut SearchState,
        trail: &mut SearchTrail,
        variable: VariableIndex,
        value: usize,
    ) -> PropagationResult {
        let result = PropagationContext::new(
            state,
            trail,
            &mut self.modified,
            &mut self.modified_flags,
        )
        .assign(variable, value);
        if result.is_err() {
            self.clear();
        }
        result
    }

    /// Removes every value below `bound` from `variable`.
    pub fn remove_below(
        &mut self,
        state: &mut SearchState,
        trail: &mut SearchTrail,
        variable: VariableIndex,
        bound: usize,
    ) -> PropagationResult {
        let result = PropagationContext::new(
            state,
            trail,
            &mut self.modified,
            &mut self.modified_flags,
        )
        .remove_below(variable, bound)
        .map(|_| ());
        if result.is_err() {
            self.clear();
        }
        result
    }

    /// Propagates until no domain changes.
    ///
    /// Returns the number of propagator runs.
    ///
    /// # Errors
    ///
    /// Returns the first `Inconsistency` found. The queue is cleared, the
    /// partial reductions stay on the trail for the caller to undo.
    pub fn fixpoint(
        &mut self,
        state: &mut SearchState,
        trail: &mut SearchTrail,
    ) -> Result<u64, Inconsistency> {
        self.schedule_modified(None);
        let mut runs = 0u64;

        while let Some(id) = self.queue.pop_front() {
            self.queued.set(id, false);
            let result = {
                let mut ctx = PropagationContext::new(
                    state,
                    trail,
                    &mut self.modified,
                    &mut self.modified_flags,
                );
                self.propagators[id].propagate(&mut ctx)
            };
            runs = runs.saturating_add(1);

            if let Err(inconsistency) = result {
                self.clear();
                return Err(inconsistency);
            }
            self.schedule_modified(Some(id));
        }

        Ok(runs)
    }

    /// Returns `true` if every propagator holds on a fully fixed state.
    pub fn is_satisfied(&self, state: &SearchState) -> bool {
        self.propagators.iter().all(|p| p.is_satisfied(state))
    }

    fn schedule_modified(&mut self, source: Option<usize>) {
        for variable in self.modified.drain(..) {
            self.modified_flags.set(variable.get(), false);
            for &id in &self.watchers[variable.get()] {
                if Some(id) != source && !self.queued.put(id) {
                    self.queue.push_back(id);
                }
            }
        }
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.queued.clear();
        for variable in self.modified.drain(..) {
            self.modified_flags.set(variable.get(), false);
        }
    }
}

impl std::fmt::Display for PropagationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PropagationEngine(propagators: {}, queued: {})",
            self.propagators.len(),
            self.queue.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispersa_model::{
        bounds::{BoundSemantics, PairBounds},
        index::FacilityIndex,
        model::DispersionModelBuilder,
        space::MetricSpace,
    };

    type IntegerType = i64;

    fn root(model: &DispersionModel<IntegerType>) -> (PropagationEngine, SearchState, SearchTrail) {
        let engine = PropagationEngine::from_model(model);
        let state = SearchState::new(model);
        let mut trail = SearchTrail::new();
        trail.push_frame();
        (engine, state, trail)
    }

    #[test]
    fn test_one_propagator_per_constraint() {
        let space = MetricSpace::<IntegerType>::grid(3).unwrap();
        let model = DispersionModelBuilder::from_space(&space, 3).build().unwrap();
        let engine = PropagationEngine::from_model(&model);
        assert_eq!(engine.num_propagators(), model.constraints().len());
        let names: Vec<&str> = engine.propagators().map(|p| p.name()).collect();
        assert_eq!(names[0], "AllDifferent");
        assert!(engine.to_string().starts_with("PropagationEngine(propagators: "));
    }

    #[test]
    fn test_root_fixpoint_applies_symmetry_order() {
        let space = MetricSpace::<IntegerType>::grid(3).unwrap();
        let model = DispersionModelBuilder::from_space(&space, 3).build().unwrap();
        let (mut engine, mut state, mut trail) = root(&model);

        engine.schedule_all();
        let runs = engine.fixpoint(&mut state, &mut trail).unwrap();
        assert!(runs >= model.constraints().len() as u64);

        let f = |k| state.domain(model.facility_variable(FacilityIndex::new(k))).to_string();
        assert_eq!(f(0), "[0..6]");
        assert_eq!(f(1), "[1..7]");
        assert_eq!(f(2), "[2..8]");
    }

    #[test]
    fn test_assignment_propagates_to_distance_and_objective() {
        let space = MetricSpace::<IntegerType>::grid(3).unwrap();
        let model = DispersionModelBuilder::from_space(&space, 2).build().unwrap();
        let (mut engine, mut state, mut trail) = root(&model);
        engine.schedule_all();
        engine.fixpoint(&mut state, &mut trail).unwrap();

        let f0 = model.facility_variable(FacilityIndex::new(0));
        let f1 = model.facility_variable(FacilityIndex::new(1));
        engine.assign(&mut state, &mut trail, f0, 0).unwrap();
        engine.assign(&mut state, &mut trail, f1, 8).unwrap();
        engine.fixpoint(&mut state, &mut trail).unwrap();

        let d01 = model.pair_variable(FacilityIndex::new(0), FacilityIndex::new(1));
        assert_eq!(state.domain(d01).value(), Some(4));
        assert_eq!(state.objective_upper_bound(), 4);
    }

    #[test]
    fn test_objective_cut_prunes_facility_domains() {
        let space = MetricSpace::<IntegerType>::grid(3).unwrap();
        let model = DispersionModelBuilder::from_space(&space, 2)
            .with_symmetry_breaking(false)
            .build()
            .unwrap();
        let (mut engine, mut state, mut trail) = root(&model);
        engine.schedule_all();
        engine.fixpoint(&mut state, &mut trail).unwrap();

        // B >= 4 leaves only opposite corners
        engine
            .remove_below(&mut state, &mut trail, model.objective_variable(), 4)
            .unwrap();
        engine.fixpoint(&mut state, &mut trail).unwrap();
        let f0: Vec<usize> = state
            .domain(model.facility_variable(FacilityIndex::new(0)))
            .iter()
            .collect();
        assert_eq!(f0, vec![0, 2, 6, 8]);
    }

    #[test]
    fn test_pigeonhole_detected_at_root() {
        let space = MetricSpace::<IntegerType>::grid(2).unwrap();
        let model = DispersionModelBuilder::from_space(&space, 4)
            .with_symmetry_breaking(false)
            .build()
            .unwrap();
        let (mut engine, mut state, mut trail) = root(&model);

        // Four facilities, three candidate points.
        {
            let mut ctx = PropagationContext::new(
                &mut state,
                &mut trail,
                &mut engine.modified,
                &mut engine.modified_flags,
            );
            for k in 0..4 {
                ctx.remove(VariableIndex::new(k), 3).unwrap();
            }
        }
        engine.schedule_all();
        assert!(engine.fixpoint(&mut state, &mut trail).is_err());
        assert!(engine.queue.is_empty());
        assert!(engine.modified.is_empty());
    }

    #[test]
    fn test_exclusive_bounds_can_make_root_infeasible() {
        let space = MetricSpace::<IntegerType>::grid(3).unwrap();
        let bounds = PairBounds::uniform(2, 4, 6, BoundSemantics::Exclusive);
        let model = DispersionModelBuilder::from_space(&space, 2)
            .with_bounds(bounds)
            .build()
            .unwrap();
        let (mut engine, mut state, mut trail) = root(&model);
        engine.schedule_all();
        assert!(engine.fixpoint(&mut state, &mut trail).is_err());

        trail.backtrack(&mut state);
        assert_eq!(state, SearchState::new(&model));
    }

    #[test]
    fn test_is_satisfied_on_complete_assignment() {
        let space = MetricSpace::<IntegerType>::grid(2).unwrap();
        let model = DispersionModelBuilder::from_space(&space, 2).build().unwrap();
        let (mut engine, mut state, mut trail) = root(&model);
        engine.schedule_all();
        engine.fixpoint(&mut state, &mut trail).unwrap();
        assert!(!engine.is_satisfied(&state));

        engine.assign(&mut state, &mut trail, VariableIndex::new(0), 0).unwrap();
        engine.assign(&mut state, &mut trail, VariableIndex::new(1), 3).unwrap();
        engine.fixpoint(&mut state, &mut trail).unwrap();
        let objective = state.objective_upper_bound();
        engine
            .remove_below(&mut state, &mut trail, model.objective_variable(), objective)
            .unwrap();
        engine.fixpoint(&mut state, &mut trail).unwrap();
        assert!(engine.is_satisfied(&state));
    }
}
