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

use std::time::Duration;

/// Statistics collected while solving one model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BnbSolverStatistics {
    /// Total nodes visited.
    pub nodes_explored: u64,
    /// Total levels closed after their alternatives ran out.
    pub backtracks: u64,
    /// Total branching alternatives generated.
    pub decisions_generated: u64,
    /// The deepest level reached in the tree.
    pub max_depth: u64,
    /// Nodes closed because propagation emptied a domain.
    pub prunings_infeasible: u64,
    /// Nodes closed because their objective bound could not beat the incumbent.
    pub prunings_bound: u64,
    /// Total improving solutions found.
    pub solutions_found: u64,
    /// Total propagator runs.
    pub propagations: u64,
    /// Main-loop iterations; monitors use it to throttle clock checks.
    pub steps: u64,
    /// Objective upper bound after root propagation.
    pub root_upper_bound: u64,
    /// Total time spent in the solver.
    pub time_total: Duration,
}

impl BnbSolverStatistics {
    #[inline]
    pub fn on_node_explored(&mut self) {
        self.nodes_explored = self.nodes_explored.saturating_add(1);
    }

    #[inline]
    pub fn on_backtrack(&mut self) {
        self.backtracks = self.backtracks.saturating_add(1);
    }

    #[inline]
    pub fn on_solution_found(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    #[inline]
    pub fn on_depth_update(&mut self, depth: u64) {
        self.max_depth = self.max_depth.max(depth);
    }

    #[inline]
    pub fn on_decisions_generated(&mut self, count: u64) {
        self.decisions_generated = self.decisions_generated.saturating_add(count);
    }

    #[inline]
    pub fn on_pruning_infeasible(&mut self) {
        self.prunings_infeasible = self.prunings_infeasible.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline]
    pub fn on_propagations(&mut self, runs: u64) {
        self.propagations = self.propagations.saturating_add(runs);
    }

    #[inline]
    pub fn on_step(&mut self) {
        self.steps = self.steps.saturating_add(1);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    #[inline]
    pub fn set_root_upper_bound(&mut self, bound: u64) {
        self.root_upper_bound = bound;
    }

    /// Adds the counters of a worker run into `self`.
    ///
    /// Depth and root bound take the maximum; the total time is left alone,
    /// since workers run concurrently.
    pub fn merge(&mut self, other: &BnbSolverStatistics) {
        self.nodes_explored = self.nodes_explored.saturating_add(other.nodes_explored);
        self.backtracks = self.backtracks.saturating_add(other.backtracks);
        self.decisions_generated = self
            .decisions_generated
            .saturating_add(other.decisions_generated);
        self.max_depth = self.max_depth.max(other.max_depth);
        self.prunings_infeasible = self
            .prunings_infeasible
            .saturating_add(other.prunings_infeasible);
        self.prunings_bound = self.prunings_bound.saturating_add(other.prunings_bound);
        self.solutions_found = self.solutions_found.saturating_add(other.solutions_found);
        self.propagations = self.propagations.saturating_add(other.propagations);
        self.steps = self.steps.saturating_add(other.steps);
        self.root_upper_bound = self.root_upper_bound.max(other.root_upper_bound);
    }
}

impl std::fmt::Display for BnbSolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dispersa-BnB Solver Statistics:")?;
        writeln!(f, "  Nodes explored:       {}", self.nodes_explored)?;
        writeln!(f, "  Backtracks:           {}", self.backtracks)?;
        writeln!(f, "  Max depth reached:    {}", self.max_depth)?;
        writeln!(f, "  Decisions generated:  {}", self.decisions_generated)?;
        writeln!(f, "  Propagations:         {}", self.propagations)?;
        writeln!(f, "  Prunings (infeasible): {}", self.prunings_infeasible)?;
        writeln!(f, "  Prunings (bound):     {}", self.prunings_bound)?;
        writeln!(f, "  Solutions found:      {}", self.solutions_found)?;
        writeln!(f, "  Root Upper Bound:     {}", self.root_upper_bound)?;
        writeln!(f, "  Total time:           {:.2?}", self.time_total)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_saturate() {
        let mut stats = BnbSolverStatistics {
            nodes_explored: u64::MAX,
            ..Default::default()
        };
        stats.on_node_explored();
        stats.on_propagations(7);
        stats.on_propagations(u64::MAX);
        assert_eq!(stats.nodes_explored, u64::MAX);
        assert_eq!(stats.propagations, u64::MAX);
    }

    #[test]
    fn test_depth_keeps_maximum() {
        let mut stats = BnbSolverStatistics::default();
        stats.on_depth_update(4);
        stats.on_depth_update(2);
        assert_eq!(stats.max_depth, 4);
    }

    #[test]
    fn test_merge_adds_counters() {
        let mut a = BnbSolverStatistics {
            nodes_explored: 10,
            max_depth: 3,
            solutions_found: 1,
            time_total: Duration::from_secs(2),
            ..Default::default()
        };
        let b = BnbSolverStatistics {
            nodes_explored: 5,
            max_depth: 6,
            solutions_found: 2,
            backtracks: 4,
            time_total: Duration::from_secs(9),
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.nodes_explored, 15);
        assert_eq!(a.max_depth, 6);
        assert_eq!(a.solutions_found, 3);
        assert_eq!(a.backtracks, 4);
        assert_eq!(a.time_total, Duration::from_secs(2));
    }

    #[test]
    fn test_display_lists_counters() {
        let text = BnbSolverStatistics::default().to_string();
        assert!(text.starts_with("Dispersa-BnB Solver Statistics:"));
        assert!(text.contains("Propagations:"));
    }
}
