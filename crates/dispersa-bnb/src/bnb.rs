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

//! Branch-and-bound solver for the p-dispersion problem.
//!
//! This module implements a stateful search engine that explores facility
//! placements by depth-first search over the decision stack, propagating the
//! constraint network at every node. The objective is maximized: once a
//! placement with objective `b` is known, every node is tightened with
//! `B >= b + 1` before its fixpoint, so any subtree that cannot improve on the
//! incumbent fails during propagation and is never expanded.
//!
//! The `BnbSolver` keeps its trail and decision stack across runs, so repeated
//! solves reuse their capacity, and a fast `reset` clears per-run state. It
//! accepts a warm start through a shared incumbent and fixed assignments for
//! solving variants of one model. A search session object holds the per-run
//! state, statistics and timing.

use crate::{
    branching::{
        decision::{Decision, DecisionBuilder},
        first_fail::FirstFailBuilder,
    },
    fixed::FixedAssignment,
    incumbent::{IncumbentStore, NoSharedIncumbent, SharedIncumbent, SharedIncumbentAdapter},
    monitor::{
        no_op::NoOperationMonitor,
        tree_search_monitor::{PruneReason, SearchCommand, TreeSearchMonitor},
    },
    propagation::engine::PropagationEngine,
    result::{BnbSolverOutcome, TerminationReason},
    stack::SearchStack,
    state::SearchState,
    stats::BnbSolverStatistics,
    trail::SearchTrail,
};
use dispersa_model::{model::DispersionModel, num::DistanceNumeric, solution::Solution};

/// A branch-and-bound solver for `DispersionModel`s.
///
/// This is only the execution engine: which variable and value to try next is
/// decided by a `DecisionBuilder`, and all pruning comes from propagating the
/// model's constraints together with the objective cut.
#[derive(Clone, Debug, Default)]
pub struct BnbSolver {
    trail: SearchTrail,
    stack: SearchStack,
}

impl BnbSolver {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a solver with storage preallocated for `num_points` candidate
    /// points and `num_facilities` facilities.
    ///
    /// # Note
    ///
    /// The solver grows its storage to fit each model anyway; preallocation
    /// only moves that cost to construction time.
    #[inline]
    pub fn preallocated(num_points: usize, num_facilities: usize) -> Self {
        let num_pairs = num_facilities.saturating_mul(num_facilities.saturating_sub(1)) / 2;
        let num_variables = num_facilities + num_pairs + 1;
        Self {
            trail: SearchTrail::preallocated(num_variables, num_points),
            stack: SearchStack::preallocated(num_points, num_facilities),
        }
    }

    /// Solves `model` as a standalone, single-threaded run.
    #[inline]
    pub fn solve<T, B, S>(
        &mut self,
        model: &DispersionModel<T>,
        builder: &mut B,
        monitor: S,
    ) -> BnbSolverOutcome<T>
    where
        T: DistanceNumeric,
        B: DecisionBuilder<T>,
        S: TreeSearchMonitor<T>,
    {
        self.solve_internal(model, &[], builder, monitor, NoSharedIncumbent::new())
    }

    /// Solves `model` while sharing the best objective through `incumbent`.
    ///
    /// Subtrees that cannot beat the shared incumbent are pruned, even if it
    /// was found by another solver.
    #[inline]
    pub fn solve_with_incumbent<T, B, S>(
        &mut self,
        model: &DispersionModel<T>,
        builder: &mut B,
        monitor: S,
        incumbent: &SharedIncumbent<T>,
    ) -> BnbSolverOutcome<T>
    where
        T: DistanceNumeric,
        B: DecisionBuilder<T>,
        S: TreeSearchMonitor<T>,
    {
        let backing = SharedIncumbentAdapter::new(incumbent);
        self.solve_internal(model, &[], builder, monitor, backing)
    }

    /// Solves `model` with some facilities pinned beforehand.
    #[inline]
    pub fn solve_with_fixed<T, B, S>(
        &mut self,
        model: &DispersionModel<T>,
        builder: &mut B,
        monitor: S,
        fixed: &[FixedAssignment],
    ) -> BnbSolverOutcome<T>
    where
        T: DistanceNumeric,
        B: DecisionBuilder<T>,
        S: TreeSearchMonitor<T>,
    {
        self.solve_internal(model, fixed, builder, monitor, NoSharedIncumbent::new())
    }

    /// Solves `model` with pinned facilities and a shared incumbent.
    #[inline]
    pub fn solve_with_fixed_and_incumbent<T, B, S>(
        &mut self,
        model: &DispersionModel<T>,
        builder: &mut B,
        monitor: S,
        fixed: &[FixedAssignment],
        incumbent: &SharedIncumbent<T>,
    ) -> BnbSolverOutcome<T>
    where
        T: DistanceNumeric,
        B: DecisionBuilder<T>,
        S: TreeSearchMonitor<T>,
    {
        let backing = SharedIncumbentAdapter::new(incumbent);
        self.solve_internal(model, fixed, builder, monitor, backing)
    }

    fn solve_internal<T, B, S, I>(
        &mut self,
        model: &DispersionModel<T>,
        fixed: &[FixedAssignment],
        builder: &mut B,
        mut monitor: S,
        backing: I,
    ) -> BnbSolverOutcome<T>
    where
        T: DistanceNumeric,
        B: DecisionBuilder<T>,
        S: TreeSearchMonitor<T>,
        I: IncumbentStore<T>,
    {
        let session = BnbSolverSearchSession::new(self, model, fixed, builder, &mut monitor, backing);
        let outcome = session.run();
        self.reset();
        outcome
    }

    /// Clears the trail and stack, keeping their capacity.
    #[inline]
    fn reset(&mut self) {
        self.trail.reset();
        self.stack.reset();
    }

    #[inline]
    pub fn allocated_memory_bytes(&self) -> usize {
        self.trail.allocated_memory_bytes() + self.stack.allocated_memory_bytes()
    }
}

/// Solves `model` to optimality with first-fail branching and no monitoring.
pub fn solve<T>(model: &DispersionModel<T>) -> BnbSolverOutcome<T>
where
    T: DistanceNumeric,
{
    let mut builder = FirstFailBuilder::preallocated(model.num_points(), model.num_facilities());
    BnbSolver::new().solve(model, &mut builder, NoOperationMonitor::new())
}

/// The state and logic of a single search run.
struct BnbSolverSearchSession<'a, T, B, S, I>
where
    T: DistanceNumeric,
    I: IncumbentStore<T>,
{
    solver: &'a mut BnbSolver,
    model: &'a DispersionModel<T>,
    fixed: &'a [FixedAssignment],
    builder: &'a mut B,
    monitor: &'a mut S,
    incumbent: I,
    engine: PropagationEngine,
    state: SearchState,
    best_objective: Option<T>,
    best_solution: Option<Solution<T>>,
    stats: BnbSolverStatistics,
    start_time: std::time::Instant,
}

impl<'a, T, B, S, I> std::fmt::Display for BnbSolverSearchSession<'a, T, B, S, I>
where
    T: DistanceNumeric,
    I: IncumbentStore<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let best = match self.best_objective {
            Some(b) => b.to_string(),
            None => "none".to_string(),
        };
        write!(
            f,
            "SearchSession(best_objective: {}, state: {}, nodes: {})",
            best, self.state, self.stats.nodes_explored
        )
    }
}

impl<'a, T, B, S, I> BnbSolverSearchSession<'a, T, B, S, I>
where
    T: DistanceNumeric,
    B: DecisionBuilder<T>,
    S: TreeSearchMonitor<T>,
    I: IncumbentStore<T>,
{
    fn new(
        solver: &'a mut BnbSolver,
        model: &'a DispersionModel<T>,
        fixed: &'a [FixedAssignment],
        builder: &'a mut B,
        monitor: &'a mut S,
        incumbent: I,
    ) -> Self {
        let best_objective = incumbent.initial_lower_bound();
        Self {
            solver,
            model,
            fixed,
            builder,
            monitor,
            incumbent,
            engine: PropagationEngine::from_model(model),
            state: SearchState::new(model),
            best_objective,
            best_solution: None,
            stats: BnbSolverStatistics::default(),
            start_time: std::time::Instant::now(),
        }
    }

    fn run(mut self) -> BnbSolverOutcome<T> {
        tracing::debug!(
            points = self.model.num_points(),
            facilities = self.model.num_facilities(),
            propagators = self.engine.num_propagators(),
            builder = self.builder.name(),
            "starting branch-and-bound"
        );
        self.monitor.on_enter_search(self.model, &self.stats);

        // `false` means the root is already infeasible.
        if !self.initialize() {
            self.stats.set_total_time(self.start_time.elapsed());
            self.monitor.on_exit_search(&self.stats);
            return self.finalize_result(TerminationReason::InfeasibilityProven);
        }

        let termination_reason = loop {
            self.best_objective = self.incumbent.tighten(self.best_objective);
            self.monitor.on_step(&self.state, &self.stats);
            self.stats.on_step();

            if let SearchCommand::Terminate(msg) =
                self.monitor.search_command(&self.state, &self.stats)
            {
                break TerminationReason::Aborted(msg);
            }

            if self.solver.stack.is_current_level_empty() {
                if self.solver.stack.depth() <= 1 {
                    break if self.best_solution.is_some() {
                        TerminationReason::OptimalityProven
                    } else {
                        TerminationReason::InfeasibilityProven
                    };
                }
                self.backtrack_step();
            } else {
                self.process_next_decision();
            }
        };

        self.stats.set_total_time(self.start_time.elapsed());
        self.monitor.on_exit_search(&self.stats);
        tracing::debug!(
            reason = %termination_reason,
            nodes = self.stats.nodes_explored,
            solutions = self.stats.solutions_found,
            "branch-and-bound finished"
        );
        self.finalize_result(termination_reason)
    }

    fn finalize_result(self, reason: TerminationReason) -> BnbSolverOutcome<T> {
        match reason {
            TerminationReason::OptimalityProven => match self.best_solution {
                Some(solution) => BnbSolverOutcome::optimal(solution, self.stats),
                None => BnbSolverOutcome::infeasible(self.stats),
            },
            TerminationReason::InfeasibilityProven => BnbSolverOutcome::infeasible(self.stats),
            TerminationReason::Aborted(msg) => {
                BnbSolverOutcome::aborted(self.best_solution, msg, self.stats)
            }
        }
    }

    /// Opens the root node, applies the fixed assignments, propagates and
    /// enqueues the first decisions.
    fn initialize(&mut self) -> bool {
        let max_domain_size = self
            .model
            .variables()
            .iter()
            .map(|v| v.domain_size())
            .max()
            .unwrap_or(0);
        self.solver
            .trail
            .ensure_capacity(self.model.num_variables(), max_domain_size);
        self.solver
            .stack
            .ensure_capacity(self.model.num_points(), self.model.num_facilities());

        // Root frame. Must exist before any domain change or decision.
        self.solver.trail.push_frame();
        self.solver.stack.push_frame();
        self.stats.on_node_explored();

        for assignment in self.fixed {
            if assignment.facility.get() >= self.model.num_facilities()
                || assignment.point.get() >= self.model.num_points()
            {
                tracing::warn!(%assignment, "fixed assignment outside the model; treating as infeasible");
                return false;
            }
            let variable = self.model.facility_variable(assignment.facility);
            if self
                .engine
                .assign(&mut self.state, &mut self.solver.trail, variable, assignment.point.get())
                .is_err()
            {
                self.stats.on_pruning_infeasible();
                self.monitor
                    .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
                return false;
            }
        }

        self.engine.schedule_all();
        if !self.propagate_node() {
            return false;
        }
        self.stats
            .set_root_upper_bound(self.state.objective_upper_bound() as u64);

        if self.state.is_leaf() {
            self.handle_complete_solution();
            return true;
        }

        self.enqueue_decisions();
        true
    }

    /// Smallest objective value that would improve on the incumbent.
    #[inline]
    fn required_objective(&self) -> Option<usize> {
        self.best_objective
            .and_then(|b| b.to_usize())
            .map(|b| b.saturating_add(1))
    }

    /// Applies the objective cut and runs propagation to a fixpoint.
    ///
    /// Returns `false` if the node was pruned.
    fn propagate_node(&mut self) -> bool {
        if let Some(required) = self.required_objective() {
            let objective = self.model.objective_variable();
            if self.state.objective_upper_bound() < required
                || self
                    .engine
                    .remove_below(&mut self.state, &mut self.solver.trail, objective, required)
                    .is_err()
            {
                self.stats.on_pruning_bound();
                self.monitor
                    .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
                return false;
            }
        }

        match self.engine.fixpoint(&mut self.state, &mut self.solver.trail) {
            Ok(runs) => self.stats.on_propagations(runs),
            Err(_) => {
                self.stats.on_pruning_infeasible();
                self.monitor
                    .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
                return false;
            }
        }

        self.monitor.on_upper_bound_computed(
            &self.state,
            self.state.objective_upper_bound(),
            &self.stats,
        );
        true
    }

    fn enqueue_decisions(&mut self) {
        let count_before = self.solver.stack.num_entries();
        let decisions = self.builder.next_decision(self.model, &self.state);
        self.solver.stack.extend(decisions);
        let added = self.solver.stack.num_entries() - count_before;

        self.stats.on_decisions_generated(added as u64);
        self.monitor
            .on_decisions_enqueued(&self.state, added, &self.stats);
    }

    #[inline]
    fn backtrack_step(&mut self) {
        self.stats.on_backtrack();
        self.monitor.on_backtrack(&self.state, &self.stats);

        self.solver.trail.backtrack(&mut self.state);
        self.solver.stack.pop_frame();
    }

    fn process_next_decision(&mut self) {
        let Some(decision) = self.solver.stack.pop() else {
            return;
        };

        // The incumbent may have improved since this level was expanded;
        // if the parent can no longer beat it, neither can any sibling.
        if let Some(required) = self.required_objective()
            && self.state.objective_upper_bound() < required
        {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            self.backtrack_step();
            return;
        }

        self.descend(decision);
    }

    /// Applies `decision` in a new frame and expands the resulting node.
    fn descend(&mut self, decision: Decision) {
        self.solver.trail.push_frame();
        self.solver.stack.push_frame();
        self.stats.on_node_explored();
        self.stats
            .on_depth_update(self.solver.stack.depth().saturating_sub(1) as u64);

        if self
            .engine
            .assign(
                &mut self.state,
                &mut self.solver.trail,
                decision.variable(),
                decision.value(),
            )
            .is_err()
        {
            self.stats.on_pruning_infeasible();
            self.monitor
                .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            self.backtrack_step();
            return;
        }

        if !self.propagate_node() {
            self.backtrack_step();
            return;
        }

        self.monitor.on_descend(&self.state, decision, &self.stats);

        if self.state.is_leaf() {
            // The frame stays open with no decisions; the next step closes it.
            self.handle_complete_solution();
            return;
        }

        self.enqueue_decisions();
    }

    /// Records the placement of the current leaf.
    ///
    /// At a leaf every pair distance is fixed and `B` is capped by the
    /// smallest of them, so the objective is the maximum of `B`'s domain.
    /// `B` is pinned to that value inside the leaf frame, which leaves the
    /// whole model fixed until the frame is undone.
    fn handle_complete_solution(&mut self) {
        let objective_value = self.state.objective_upper_bound();
        if let Some(required) = self.required_objective()
            && objective_value < required
        {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return;
        }

        let objective = self.model.objective_variable();
        let pinned = self
            .engine
            .remove_below(&mut self.state, &mut self.solver.trail, objective, objective_value)
            .and_then(|()| self.engine.fixpoint(&mut self.state, &mut self.solver.trail));
        match pinned {
            Ok(runs) => self.stats.on_propagations(runs),
            Err(_) => {
                self.stats.on_pruning_infeasible();
                self.monitor
                    .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
                return;
            }
        }

        match self.state.to_solution::<T>() {
            Ok(solution) => {
                debug_assert!(
                    self.engine.is_satisfied(&self.state),
                    "leaf violates a constraint: {}",
                    self.state
                );
                tracing::debug!(
                    objective = %solution.objective_value(),
                    nodes = self.stats.nodes_explored,
                    "new incumbent"
                );
                self.best_objective = Some(solution.objective_value());
                self.incumbent.on_solution_found(&solution);
                self.stats.on_solution_found();
                self.monitor.on_solution_found(&solution, &self.stats);
                self.best_solution = Some(solution);
            }
            Err(_) => {
                self.stats.on_pruning_infeasible();
                self.monitor
                    .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            }
        }
    }
}
