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

//! Monitoring combinators for tree search
//!
//! `CompositeTreeSearchMonitor` forwards every event to its children, so
//! logging and stop conditions can be combined without touching the solver.
//!
//! Behavior
//! - Events are dispatched to children in insertion order.
//! - `search_command` returns the first non-`Continue` answer; put stricter
//!   stop conditions first.

use crate::{
    branching::decision::Decision,
    monitor::tree_search_monitor::{PruneReason, SearchCommand, TreeSearchMonitor},
    state::SearchState,
    stats::BnbSolverStatistics,
};
use dispersa_model::{model::DispersionModel, num::DistanceNumeric, solution::Solution};

/// Fans every event out to a list of monitors.
pub struct CompositeTreeSearchMonitor<'a, T>
where
    T: DistanceNumeric,
{
    monitors: Vec<Box<dyn TreeSearchMonitor<T> + 'a>>,
}

impl<'a, T> Default for CompositeTreeSearchMonitor<'a, T>
where
    T: DistanceNumeric,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> CompositeTreeSearchMonitor<'a, T>
where
    T: DistanceNumeric,
{
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: TreeSearchMonitor<T> + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    #[inline(always)]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn TreeSearchMonitor<T> + 'a>) {
        self.monitors.push(monitor);
    }

    #[inline(always)]
    pub fn monitors(&self) -> &[Box<dyn TreeSearchMonitor<T> + 'a>] {
        &self.monitors
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<'a, T> FromIterator<Box<dyn TreeSearchMonitor<T> + 'a>> for CompositeTreeSearchMonitor<'a, T>
where
    T: DistanceNumeric,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn TreeSearchMonitor<T> + 'a>>,
    {
        Self {
            monitors: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> TreeSearchMonitor<T> for CompositeTreeSearchMonitor<'a, T>
where
    T: DistanceNumeric,
{
    fn name(&self) -> &str {
        "CompositeTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, model: &DispersionModel<T>, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(model, statistics);
        }
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search(statistics);
        }
    }

    fn search_command(
        &mut self,
        state: &SearchState,
        statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        for monitor in &mut self.monitors {
            let command = monitor.search_command(state, statistics);
            if command != SearchCommand::Continue {
                return command;
            }
        }
        SearchCommand::Continue
    }

    fn on_step(&mut self, state: &SearchState, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_step(state, statistics);
        }
    }

    fn on_upper_bound_computed(
        &mut self,
        state: &SearchState,
        upper_bound: usize,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_upper_bound_computed(state, upper_bound, statistics);
        }
    }

    fn on_prune(&mut self, state: &SearchState, reason: PruneReason, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_prune(state, reason, statistics);
        }
    }

    fn on_decisions_enqueued(
        &mut self,
        state: &SearchState,
        count: usize,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in &mut self.monitors {
            monitor.on_decisions_enqueued(state, count, statistics);
        }
    }

    fn on_descend(&mut self, state: &SearchState, decision: Decision, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_descend(state, decision, statistics);
        }
    }

    fn on_backtrack(&mut self, state: &SearchState, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_backtrack(state, statistics);
        }
    }

    fn on_solution_found(&mut self, solution: &Solution<T>, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_solution_found(solution, statistics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{interrupt::InterruptMonitor, no_op::NoOperationMonitor};
    use dispersa_model::{model::DispersionModelBuilder, space::MetricSpace};
    use std::sync::atomic::{AtomicBool, Ordering};

    type IntegerType = i64;

    /// Counts callbacks it receives.
    #[derive(Default)]
    struct Counting {
        entered: usize,
        solutions: usize,
    }

    impl TreeSearchMonitor<IntegerType> for &mut Counting {
        fn name(&self) -> &str {
            "Counting"
        }
        fn on_enter_search(&mut self, _: &DispersionModel<IntegerType>, _: &BnbSolverStatistics) {
            self.entered += 1;
        }
        fn on_exit_search(&mut self, _: &BnbSolverStatistics) {}
        fn on_solution_found(&mut self, _: &Solution<IntegerType>, _: &BnbSolverStatistics) {
            self.solutions += 1;
        }
    }

    #[test]
    fn test_first_terminate_wins() {
        let space = MetricSpace::<IntegerType>::grid(2).unwrap();
        let model = DispersionModelBuilder::from_space(&space, 2).build().unwrap();
        let state = SearchState::new(&model);
        let stats = BnbSolverStatistics::default();
        let flag = AtomicBool::new(false);

        let mut composite = CompositeTreeSearchMonitor::new();
        composite.add_monitor(NoOperationMonitor::<IntegerType>::new());
        composite.add_monitor(InterruptMonitor::new(&flag));
        assert_eq!(composite.len(), 2);
        assert_eq!(composite.search_command(&state, &stats), SearchCommand::Continue);

        flag.store(true, Ordering::Relaxed);
        assert!(matches!(
            composite.search_command(&state, &stats),
            SearchCommand::Terminate(_)
        ));
    }

    #[test]
    fn test_events_reach_every_child() {
        let space = MetricSpace::<IntegerType>::grid(2).unwrap();
        let model = DispersionModelBuilder::from_space(&space, 2).build().unwrap();
        let stats = BnbSolverStatistics::default();
        let (mut a, mut b) = (Counting::default(), Counting::default());
        {
            let mut composite = CompositeTreeSearchMonitor::with_capacity(2);
            composite.add_monitor(&mut a);
            composite.add_monitor(&mut b);
            composite.on_enter_search(&model, &stats);
            let solution = Solution::new(2, vec![]);
            composite.on_solution_found(&solution, &stats);
            composite.on_solution_found(&solution, &stats);
        }
        assert_eq!((a.entered, a.solutions), (1, 2));
        assert_eq!((b.entered, b.solutions), (1, 2));
    }
}
