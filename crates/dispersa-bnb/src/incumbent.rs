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

//! Incumbent management for branch-and-bound
//!
//! The solver maximizes, so the incumbent objective is a lower bound on the
//! optimum: any node whose objective domain cannot exceed it is pruned.
//!
//! `IncumbentStore<T>` abstracts over where that bound lives:
//! - `NoSharedIncumbent<T>`: local only. No initial bound, `tighten(x) = x`,
//!   and `on_solution_found` is a no-op.
//! - `SharedIncumbentAdapter<'a, T>`: wraps a `SharedIncumbent<T>` so several
//!   solvers (one per worker thread) see each other's improvements.
//!
//! `SharedIncumbent<T>` keeps the best objective in an `AtomicI64` for
//! lock-free reads and the solution itself behind a `Mutex`. The atomic is a
//! hint read with `Ordering::Relaxed`; installation re-checks under the lock.

use dispersa_model::{num::DistanceNumeric, solution::Solution};
use std::marker::PhantomData;
use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicI64, Ordering},
};

/// Concurrent holder for the best solution found so far.
///
/// `lower_bound` starts at `i64::MIN`, meaning "no incumbent yet". Objectives
/// are non-negative distances, so the sentinel never collides with a real value.
#[derive(Debug)]
pub struct SharedIncumbent<T> {
    lower_bound: AtomicI64,
    solution: Mutex<Option<Solution<T>>>,
}

impl<T> Default for SharedIncumbent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SharedIncumbent<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            lower_bound: AtomicI64::new(i64::MIN),
            solution: Mutex::new(None),
        }
    }

    /// Objective of the incumbent, or `i64::MIN` if none is installed.
    #[inline]
    pub fn lower_bound(&self) -> i64 {
        self.lower_bound.load(Ordering::Relaxed)
    }

    /// Objective of the incumbent converted to `T`, if one is installed.
    #[inline]
    pub fn lower_bound_as(&self) -> Option<T>
    where
        T: DistanceNumeric,
    {
        match self.lower_bound() {
            i64::MIN => None,
            value => T::from_i64(value),
        }
    }

    /// Returns a clone of the incumbent solution, if any.
    #[inline]
    pub fn snapshot(&self) -> Option<Solution<T>>
    where
        T: Clone,
    {
        self.solution
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs `candidate` if it is strictly better than the incumbent.
    ///
    /// Returns `true` if the candidate was installed.
    pub fn try_install(&self, candidate: &Solution<T>) -> bool
    where
        T: DistanceNumeric,
    {
        let candidate_objective: i64 = candidate.objective_value().into();
        if candidate_objective <= self.lower_bound() {
            return false;
        }

        let mut guard = self.solution.lock().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have installed a better one while we waited.
        if let Some(current) = guard.as_ref() {
            let current_objective: i64 = current.objective_value().into();
            if candidate_objective <= current_objective {
                return false;
            }
        }

        *guard = Some(candidate.clone());
        self.lower_bound.store(candidate_objective, Ordering::Relaxed);
        true
    }
}

impl<T> std::fmt::Display for SharedIncumbent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.lower_bound() {
            i64::MIN => write!(f, "Incumbent(none)"),
            value => write!(f, "Incumbent(lower_bound: {})", value),
        }
    }
}

/// Where the solver reads and publishes its incumbent objective.
pub trait IncumbentStore<T>
where
    T: DistanceNumeric,
{
    /// Best objective known before the search starts, if any.
    fn initial_lower_bound(&self) -> Option<T>;
    /// Combines the local best with whatever the store knows.
    fn tighten(&self, local_best: Option<T>) -> Option<T>;
    /// Publishes an improving solution.
    fn on_solution_found(&self, solution: &Solution<T>);
}

/// Keeps the incumbent local to one solver.
#[repr(transparent)]
#[derive(Debug, Clone, Copy)]
pub struct NoSharedIncumbent<T>(PhantomData<T>);

impl<T> Default for NoSharedIncumbent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NoSharedIncumbent<T> {
    #[inline]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> IncumbentStore<T> for NoSharedIncumbent<T>
where
    T: DistanceNumeric,
{
    #[inline]
    fn initial_lower_bound(&self) -> Option<T> {
        None
    }

    #[inline]
    fn tighten(&self, local_best: Option<T>) -> Option<T> {
        local_best
    }

    #[inline]
    fn on_solution_found(&self, _: &Solution<T>) {}
}

/// Shares the incumbent with other solvers through a `SharedIncumbent`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy)]
pub struct SharedIncumbentAdapter<'a, T> {
    inner: &'a SharedIncumbent<T>,
}

impl<'a, T> SharedIncumbentAdapter<'a, T> {
    #[inline]
    pub fn new(inner: &'a SharedIncumbent<T>) -> Self {
        Self { inner }
    }
}

impl<'a, T> IncumbentStore<T> for SharedIncumbentAdapter<'a, T>
where
    T: DistanceNumeric,
{
    #[inline]
    fn initial_lower_bound(&self) -> Option<T> {
        self.inner.lower_bound_as()
    }

    #[inline]
    fn tighten(&self, local_best: Option<T>) -> Option<T> {
        match (self.inner.lower_bound_as(), local_best) {
            (Some(shared), Some(local)) => Some(shared.max(local)),
            (shared, local) => shared.or(local),
        }
    }

    #[inline]
    fn on_solution_found(&self, solution: &Solution<T>) {
        self.inner.try_install(solution);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispersa_model::index::PointIndex;
    use std::sync::Arc;

    type IntegerType = i64;

    fn make_solution(objective: IntegerType, p: usize) -> Solution<IntegerType> {
        Solution::new(objective, (0..p).map(PointIndex::new).collect())
    }

    #[test]
    fn test_new_has_no_incumbent() {
        let inc = SharedIncumbent::<IntegerType>::new();
        assert_eq!(inc.lower_bound(), i64::MIN);
        assert_eq!(inc.lower_bound_as(), None);
        assert!(inc.snapshot().is_none());
        assert_eq!(inc.to_string(), "Incumbent(none)");
    }

    #[test]
    fn test_installs_only_strict_improvements() {
        let inc = SharedIncumbent::<IntegerType>::new();
        assert!(inc.try_install(&make_solution(3, 2)));
        assert!(!inc.try_install(&make_solution(3, 2)));
        assert!(!inc.try_install(&make_solution(2, 2)));
        assert!(inc.try_install(&make_solution(5, 3)));

        assert_eq!(inc.lower_bound(), 5);
        let snap = inc.snapshot().unwrap();
        assert_eq!(snap.objective_value(), 5);
        assert_eq!(snap.num_facilities(), 3);
        assert_eq!(inc.to_string(), "Incumbent(lower_bound: 5)");
    }

    #[test]
    fn test_zero_objective_is_installed() {
        let inc = SharedIncumbent::<IntegerType>::new();
        assert!(inc.try_install(&make_solution(0, 2)));
        assert_eq!(inc.lower_bound_as(), Some(0));
    }

    #[test]
    fn test_concurrent_installs_keep_maximum() {
        let inc = Arc::new(SharedIncumbent::<IntegerType>::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let inc = Arc::clone(&inc);
                std::thread::spawn(move || {
                    for k in 0..100 {
                        inc.try_install(&make_solution((k * 8 + t) as IntegerType, 2));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(inc.lower_bound(), 799);
        assert_eq!(inc.snapshot().unwrap().objective_value(), 799);
    }

    #[test]
    fn test_no_shared_incumbent_is_passthrough() {
        let store = NoSharedIncumbent::<IntegerType>::new();
        assert_eq!(store.initial_lower_bound(), None);
        assert_eq!(store.tighten(None), None);
        assert_eq!(store.tighten(Some(4)), Some(4));
        store.on_solution_found(&make_solution(9, 2));
        assert_eq!(store.initial_lower_bound(), None);
    }

    #[test]
    fn test_adapter_reads_and_publishes() {
        let shared = SharedIncumbent::<IntegerType>::new();
        let adapter = SharedIncumbentAdapter::new(&shared);
        assert_eq!(adapter.initial_lower_bound(), None);
        assert_eq!(adapter.tighten(Some(2)), Some(2));

        adapter.on_solution_found(&make_solution(6, 2));
        assert_eq!(shared.lower_bound(), 6);
        assert_eq!(adapter.initial_lower_bound(), Some(6));
        assert_eq!(adapter.tighten(Some(2)), Some(6));
        assert_eq!(adapter.tighten(Some(7)), Some(7));
        assert_eq!(adapter.tighten(None), Some(6));
    }
}
