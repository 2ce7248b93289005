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

//! # Parallel Branch-and-Bound
//!
//! Splits the root of the search tree on the values of the first facility
//! variable and solves the resulting subproblems on scoped worker threads.
//!
//! ## Highlights
//!
//! - Work distribution: subproblem `v` pins facility 0 to point `v`. Workers
//!   claim subproblems from an `AtomicUsize` counter until none are left, so
//!   cheap subproblems (often refuted at their root) do not idle a thread.
//! - Shared state: every worker owns its `BnbSolver`, search state and
//!   decision builder; the model is shared by reference and the best
//!   objective through one `SharedIncumbent`, so an improvement found by one
//!   worker immediately tightens the cut of all others.
//! - Termination: a time limit hit by any worker raises a shared stop flag
//!   that the `InterruptMonitor` of every other worker observes.
//!
//! The union of the subproblems is the full search space, so once all of them
//! are exhausted the shared incumbent is optimal.

use crate::{
    bnb::BnbSolver,
    branching::BranchingStrategy,
    fixed::FixedAssignment,
    incumbent::SharedIncumbent,
    monitor::{
        composite::CompositeTreeSearchMonitor, interrupt::InterruptMonitor,
        time_limit::TimeLimitMonitor,
    },
    result::{BnbSolverOutcome, TerminationReason},
    stats::BnbSolverStatistics,
};
use dispersa_model::{
    index::{FacilityIndex, PointIndex},
    model::DispersionModel,
    num::DistanceNumeric,
};
use std::{
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::{Duration, Instant},
};

/// What one worker thread reports back.
#[derive(Debug, Default)]
struct WorkerReport {
    statistics: BnbSolverStatistics,
    subproblems: usize,
    abort_reason: Option<String>,
}

/// Solves a model with several threads sharing one incumbent.
#[derive(Debug, Clone)]
pub struct ParallelSolver {
    threads: usize,
    time_limit: Option<Duration>,
    branching: BranchingStrategy,
}

impl ParallelSolver {
    #[inline]
    pub fn builder() -> ParallelSolverBuilder {
        ParallelSolverBuilder::new()
    }

    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    #[inline]
    pub fn branching(&self) -> BranchingStrategy {
        self.branching
    }

    pub fn solve<T>(&self, model: &DispersionModel<T>) -> BnbSolverOutcome<T>
    where
        T: DistanceNumeric,
    {
        let start_time = Instant::now();
        let incumbent = SharedIncumbent::new();
        let stop_signal = AtomicBool::new(false);
        let next_subproblem = AtomicUsize::new(0);
        let num_subproblems = model.num_points();
        let threads = self.threads.clamp(1, num_subproblems.max(1));

        tracing::debug!(
            threads,
            subproblems = num_subproblems,
            branching = %self.branching,
            "starting parallel search"
        );

        let reports: Vec<WorkerReport> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    scope.spawn(|| {
                        self.run_worker(
                            model,
                            &incumbent,
                            &stop_signal,
                            &next_subproblem,
                            start_time,
                        )
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(report) => report,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        let mut statistics = BnbSolverStatistics::default();
        let mut solved = 0usize;
        let mut abort_reason = None;
        for report in &reports {
            statistics.merge(&report.statistics);
            solved += report.subproblems;
            if abort_reason.is_none() {
                abort_reason.clone_from(&report.abort_reason);
            }
        }
        statistics.set_total_time(start_time.elapsed());

        let best = incumbent.snapshot();
        tracing::debug!(
            solved,
            subproblems = num_subproblems,
            best = ?best.as_ref().map(|s| s.objective_value()),
            "parallel search finished"
        );

        match abort_reason {
            Some(reason) => BnbSolverOutcome::aborted(best, reason, statistics),
            None if solved < num_subproblems => {
                BnbSolverOutcome::aborted(best, "interrupted", statistics)
            }
            None => match best {
                Some(solution) => BnbSolverOutcome::optimal(solution, statistics),
                None => BnbSolverOutcome::infeasible(statistics),
            },
        }
    }

    fn run_worker<T>(
        &self,
        model: &DispersionModel<T>,
        incumbent: &SharedIncumbent<T>,
        stop_signal: &AtomicBool,
        next_subproblem: &AtomicUsize,
        start_time: Instant,
    ) -> WorkerReport
    where
        T: DistanceNumeric,
    {
        let mut solver = BnbSolver::preallocated(model.num_points(), model.num_facilities());
        let mut builder = self.branching.builder();
        let mut report = WorkerReport::default();

        while !stop_signal.load(Ordering::Relaxed) {
            // The per-run monitor only reads its clock every few steps, so a
            // spent budget must not start another subproblem.
            if let Some(limit) = self.time_limit
                && start_time.elapsed() >= limit
            {
                stop_signal.store(true, Ordering::Relaxed);
                report.abort_reason = Some("time limit exceeded".to_string());
                break;
            }

            let point = next_subproblem.fetch_add(1, Ordering::Relaxed);
            if point >= model.num_points() {
                break;
            }

            let mut monitor = CompositeTreeSearchMonitor::with_capacity(2);
            monitor.add_monitor(InterruptMonitor::new(stop_signal));
            if let Some(limit) = self.time_limit {
                monitor.add_monitor(TimeLimitMonitor::new(
                    limit.saturating_sub(start_time.elapsed()),
                ));
            }

            let fixed = [FixedAssignment::new(
                FacilityIndex::new(0),
                PointIndex::new(point),
            )];
            let outcome = solver.solve_with_fixed_and_incumbent(
                model,
                &mut builder,
                monitor,
                &fixed,
                incumbent,
            );
            report.statistics.merge(outcome.statistics());

            if let TerminationReason::Aborted(reason) = outcome.termination_reason() {
                stop_signal.store(true, Ordering::Relaxed);
                if reason != "interrupt signal received" {
                    report.abort_reason = Some(reason.clone());
                }
                break;
            }
            report.subproblems += 1;
        }

        report
    }
}

/// Configures a `ParallelSolver`.
#[derive(Debug, Clone, Default)]
pub struct ParallelSolverBuilder {
    threads: Option<usize>,
    time_limit: Option<Duration>,
    branching: BranchingStrategy,
}

impl ParallelSolverBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of worker threads. Defaults to the available parallelism.
    #[inline]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    /// Wall-clock budget for the whole run.
    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    #[inline]
    pub fn with_optional_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    #[inline]
    pub fn with_branching(mut self, branching: BranchingStrategy) -> Self {
        self.branching = branching;
        self
    }

    pub fn build(self) -> ParallelSolver {
        let threads = self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        });
        ParallelSolver {
            threads,
            time_limit: self.time_limit,
            branching: self.branching,
        }
    }
}
