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

//! Tree search monitoring interface
//!
//! Declares the `TreeSearchMonitor` trait, `SearchCommand` and `PruneReason`
//! for observing and controlling branch-and-bound. Callbacks track the solver
//! lifecycle, and a monitor can stop the search through `search_command`
//! (default: `Continue`).
//!
//! Lifecycle highlights
//! - enter → step → {bound/prune | decisions/descend/backtrack} → solution → exit
//! - `BnbSolverStatistics` is passed to every callback for telemetry.
//!
//! Design notes
//! - Methods take `&mut self`; a monitor belongs to one solver run.
//! - Callbacks sit on the hot path; keep them cheap.

use crate::{branching::decision::Decision, state::SearchState, stats::BnbSolverStatistics};
use dispersa_model::{model::DispersionModel, num::DistanceNumeric, solution::Solution};

/// What the solver should do next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchCommand {
    #[default]
    Continue,
    /// Stop and report the best solution so far; the string says why.
    Terminate(String),
}

impl std::fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchCommand::Continue => write!(f, "Continue"),
            SearchCommand::Terminate(reason) => write!(f, "Terminate: {}", reason),
        }
    }
}

/// Reasons for closing a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PruneReason {
    /// Propagation emptied a domain.
    Infeasible,
    /// The node's objective bound cannot beat the incumbent.
    BoundDominated,
}

impl std::fmt::Display for PruneReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PruneReason::Infeasible => write!(f, "Infeasible"),
            PruneReason::BoundDominated => write!(f, "BoundDominated"),
        }
    }
}

/// Observes and steers the search of `BnbSolver`.
pub trait TreeSearchMonitor<T>
where
    T: DistanceNumeric,
{
    fn name(&self) -> &str;
    /// Called once before the root is processed.
    fn on_enter_search(&mut self, model: &DispersionModel<T>, statistics: &BnbSolverStatistics);
    /// Called once after the search ended, for any reason.
    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics);
    /// Polled once per step.
    fn search_command(
        &mut self,
        _state: &SearchState,
        _statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        SearchCommand::Continue
    }
    fn on_step(&mut self, _state: &SearchState, _statistics: &BnbSolverStatistics) {}
    /// Called after propagation with the largest objective still reachable.
    fn on_upper_bound_computed(
        &mut self,
        _state: &SearchState,
        _upper_bound: usize,
        _statistics: &BnbSolverStatistics,
    ) {
    }
    fn on_prune(
        &mut self,
        _state: &SearchState,
        _reason: PruneReason,
        _statistics: &BnbSolverStatistics,
    ) {
    }
    fn on_decisions_enqueued(
        &mut self,
        _state: &SearchState,
        _count: usize,
        _statistics: &BnbSolverStatistics,
    ) {
    }
    /// Called after `decision` was applied and propagated.
    fn on_descend(
        &mut self,
        _state: &SearchState,
        _decision: Decision,
        _statistics: &BnbSolverStatistics,
    ) {
    }
    fn on_backtrack(&mut self, _state: &SearchState, _statistics: &BnbSolverStatistics) {}
    /// Called for every improving solution.
    fn on_solution_found(&mut self, _solution: &Solution<T>, _statistics: &BnbSolverStatistics) {}
}

impl<T> std::fmt::Debug for dyn TreeSearchMonitor<T>
where
    T: DistanceNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}

impl<T> std::fmt::Display for dyn TreeSearchMonitor<T>
where
    T: DistanceNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}
