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
    branching::decision::Decision,
    monitor::tree_search_monitor::TreeSearchMonitor,
    state::SearchState,
    stats::BnbSolverStatistics,
};
use dispersa_model::{model::DispersionModel, num::DistanceNumeric, solution::Solution};
use std::time::{Duration, Instant};

/// Reports search progress through `tracing` at a fixed interval.
///
/// The clock is read only when `nodes_explored & clock_check_mask == 0`.
#[derive(Debug, Clone)]
pub struct LogTreeSearchMonitor<T> {
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    best_objective: Option<T>,
}

impl<T> LogTreeSearchMonitor<T>
where
    T: DistanceNumeric,
{
    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        Self {
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            log_interval,
            clock_check_mask,
            best_objective: None,
        }
    }

    fn log_line(&mut self, state: &SearchState, stats: &BnbSolverStatistics) {
        let now = Instant::now();
        let best = self
            .best_objective
            .map_or_else(|| "-".to_string(), |b| b.to_string());

        tracing::info!(
            elapsed = %format!("{:.1}s", now.duration_since(self.start_time).as_secs_f32()),
            nodes = stats.nodes_explored,
            depth = state.num_fixed_facilities(),
            best = %best,
            bound = state.objective_upper_bound(),
            backtracks = stats.backtracks,
            pruned = stats.prunings_bound.saturating_add(stats.prunings_infeasible),
            "search progress"
        );

        self.last_log_time = now;
    }
}

impl<T> Default for LogTreeSearchMonitor<T>
where
    T: DistanceNumeric,
{
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 4095)
    }
}

impl<T> std::fmt::Display for LogTreeSearchMonitor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogTreeSearchMonitor(log_interval: {}s, clock_check_mask: {})",
            self.log_interval.as_secs(),
            self.clock_check_mask
        )
    }
}

impl<T> TreeSearchMonitor<T> for LogTreeSearchMonitor<T>
where
    T: DistanceNumeric,
{
    fn name(&self) -> &str {
        "LogTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, model: &DispersionModel<T>, _stats: &BnbSolverStatistics) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best_objective = None;
        tracing::info!(
            points = model.num_points(),
            facilities = model.num_facilities(),
            variables = model.num_variables(),
            constraints = model.constraints().len(),
            "search started"
        );
    }

    fn on_descend(&mut self, state: &SearchState, _decision: Decision, stats: &BnbSolverStatistics) {
        if (stats.nodes_explored & self.clock_check_mask) == 0
            && self.last_log_time.elapsed() >= self.log_interval
        {
            self.log_line(state, stats);
        }
    }

    fn on_solution_found(&mut self, solution: &Solution<T>, stats: &BnbSolverStatistics) {
        self.best_objective = Some(solution.objective_value());
        tracing::info!(
            objective = %solution.objective_value(),
            nodes = stats.nodes_explored,
            "improving solution"
        );
    }

    fn on_exit_search(&mut self, stats: &BnbSolverStatistics) {
        tracing::info!(
            nodes = stats.nodes_explored,
            solutions = stats.solutions_found,
            elapsed = ?self.start_time.elapsed(),
            "search finished"
        );
    }
}
