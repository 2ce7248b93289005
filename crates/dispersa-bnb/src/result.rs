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

use crate::stats::BnbSolverStatistics;
use dispersa_model::solution::Solution;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverResult<T> {
    /// We have proven that no placement satisfies the model.
    Infeasible,
    /// We have found a placement and proven its optimality.
    Optimal(Solution<T>),
    /// We have found a placement, but the search stopped before proving optimality.
    Feasible(Solution<T>),
    /// The search stopped without a placement and without proving infeasibility.
    Unknown,
}

impl<T> std::fmt::Display for SolverResult<T>
where
    T: Copy + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverResult::Infeasible => write!(f, "Infeasible"),
            SolverResult::Optimal(solution) => {
                write!(f, "Optimal(objective={})", solution.objective_value())
            }
            SolverResult::Feasible(solution) => {
                write!(f, "Feasible(objective={})", solution.objective_value())
            }
            SolverResult::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The search space was exhausted with an incumbent.
    OptimalityProven,
    /// The search space was exhausted without an incumbent.
    InfeasibilityProven,
    /// A monitor stopped the search; the string says why.
    Aborted(String),
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "Optimality Proven"),
            TerminationReason::InfeasibilityProven => write!(f, "Infeasibility Proven"),
            TerminationReason::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}

/// Result of the solver after termination.
#[derive(Debug, Clone)]
pub struct BnbSolverOutcome<T> {
    result: SolverResult<T>,
    termination_reason: TerminationReason,
    statistics: BnbSolverStatistics,
}

impl<T> BnbSolverOutcome<T> {
    #[inline]
    pub fn optimal(solution: Solution<T>, statistics: BnbSolverStatistics) -> Self {
        Self {
            result: SolverResult::Optimal(solution),
            termination_reason: TerminationReason::OptimalityProven,
            statistics,
        }
    }

    #[inline]
    pub fn infeasible(statistics: BnbSolverStatistics) -> Self {
        Self {
            result: SolverResult::Infeasible,
            termination_reason: TerminationReason::InfeasibilityProven,
            statistics,
        }
    }

    /// An interrupted search: `Feasible` with the incumbent if there is one,
    /// otherwise `Unknown`.
    #[inline]
    pub fn aborted<R>(
        solution: Option<Solution<T>>,
        reason: R,
        statistics: BnbSolverStatistics,
    ) -> Self
    where
        R: Into<String>,
    {
        let result = match solution {
            Some(solution) => SolverResult::Feasible(solution),
            None => SolverResult::Unknown,
        };
        Self {
            result,
            termination_reason: TerminationReason::Aborted(reason.into()),
            statistics,
        }
    }

    #[inline]
    pub fn result(&self) -> &SolverResult<T> {
        &self.result
    }

    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    #[inline]
    pub fn statistics(&self) -> &BnbSolverStatistics {
        &self.statistics
    }

    #[inline]
    pub fn statistics_mut(&mut self) -> &mut BnbSolverStatistics {
        &mut self.statistics
    }

    /// The best placement found, proven optimal or not.
    #[inline]
    pub fn solution(&self) -> Option<&Solution<T>> {
        match &self.result {
            SolverResult::Optimal(solution) | SolverResult::Feasible(solution) => Some(solution),
            SolverResult::Infeasible | SolverResult::Unknown => None,
        }
    }

    #[inline]
    pub fn into_solution(self) -> Option<Solution<T>> {
        match self.result {
            SolverResult::Optimal(solution) | SolverResult::Feasible(solution) => Some(solution),
            SolverResult::Infeasible | SolverResult::Unknown => None,
        }
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_))
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self.result, SolverResult::Infeasible)
    }
}

impl<T> std::fmt::Display for BnbSolverOutcome<T>
where
    T: Copy + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.result, self.termination_reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispersa_model::index::PointIndex;

    type IntegerType = i64;

    fn solution(objective: IntegerType) -> Solution<IntegerType> {
        Solution::new(objective, vec![PointIndex::new(0), PointIndex::new(8)])
    }

    #[test]
    fn test_optimal_outcome() {
        let outcome = BnbSolverOutcome::optimal(solution(4), BnbSolverStatistics::default());
        assert!(outcome.is_optimal());
        assert_eq!(outcome.solution().map(|s| s.objective_value()), Some(4));
        assert_eq!(outcome.to_string(), "Optimal(objective=4) (Optimality Proven)");
    }

    #[test]
    fn test_aborted_without_incumbent_is_unknown() {
        let outcome = BnbSolverOutcome::<IntegerType>::aborted(
            None,
            "time limit exceeded",
            BnbSolverStatistics::default(),
        );
        assert_eq!(outcome.result(), &SolverResult::Unknown);
        assert!(!outcome.is_infeasible());
        assert!(outcome.solution().is_none());
        assert_eq!(
            outcome.termination_reason(),
            &TerminationReason::Aborted("time limit exceeded".to_string())
        );
    }

    #[test]
    fn test_aborted_with_incumbent_is_feasible() {
        let outcome =
            BnbSolverOutcome::aborted(Some(solution(3)), "interrupted", BnbSolverStatistics::default());
        assert!(matches!(outcome.result(), SolverResult::Feasible(_)));
        assert!(!outcome.is_optimal());
        assert_eq!(outcome.into_solution().map(|s| s.objective_value()), Some(3));
    }

    #[test]
    fn test_infeasible_outcome() {
        let outcome = BnbSolverOutcome::<IntegerType>::infeasible(BnbSolverStatistics::default());
        assert!(outcome.is_infeasible());
        assert_eq!(outcome.to_string(), "Infeasible (Infeasibility Proven)");
    }
}
