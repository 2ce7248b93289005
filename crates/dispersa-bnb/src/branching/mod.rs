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

pub mod decision;
pub mod first_fail;
pub mod input_order;

use crate::{
    branching::{
        decision::{Decision, DecisionBuilder},
        first_fail::FirstFailBuilder,
        input_order::InputOrderBuilder,
    },
    state::SearchState,
};
use dispersa_model::{model::DispersionModel, num::DistanceNumeric};

/// Selects a decision builder at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BranchingStrategy {
    /// `InputOrderBuilder`.
    InputOrder,
    /// `FirstFailBuilder`.
    #[default]
    FirstFail,
}

impl BranchingStrategy {
    /// Creates a fresh builder for this strategy.
    pub fn builder(self) -> StrategyBuilder {
        match self {
            BranchingStrategy::InputOrder => StrategyBuilder::InputOrder(InputOrderBuilder::new()),
            BranchingStrategy::FirstFail => StrategyBuilder::FirstFail(FirstFailBuilder::new()),
        }
    }
}

impl std::fmt::Display for BranchingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BranchingStrategy::InputOrder => write!(f, "InputOrder"),
            BranchingStrategy::FirstFail => write!(f, "FirstFail"),
        }
    }
}

/// A decision builder chosen through `BranchingStrategy`.
#[derive(Debug, Clone)]
pub enum StrategyBuilder {
    InputOrder(InputOrderBuilder),
    FirstFail(FirstFailBuilder),
}

impl<T> DecisionBuilder<T> for StrategyBuilder
where
    T: DistanceNumeric,
{
    type DecisionIterator<'a>
        = std::vec::Drain<'a, Decision>
    where
        Self: 'a,
        T: 'a;

    fn name(&self) -> &str {
        match self {
            StrategyBuilder::InputOrder(b) => DecisionBuilder::<T>::name(b),
            StrategyBuilder::FirstFail(b) => DecisionBuilder::<T>::name(b),
        }
    }

    fn next_decision<'a>(
        &'a mut self,
        model: &'a DispersionModel<T>,
        state: &'a SearchState,
    ) -> Self::DecisionIterator<'a> {
        match self {
            StrategyBuilder::InputOrder(b) => b.next_decision(model, state),
            StrategyBuilder::FirstFail(b) => b.next_decision(model, state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_builders_report_their_names() {
        let input = BranchingStrategy::InputOrder.builder();
        let first_fail = BranchingStrategy::default().builder();
        assert_eq!(DecisionBuilder::<i64>::name(&input), "InputOrderBuilder");
        assert_eq!(DecisionBuilder::<i64>::name(&first_fail), "FirstFailBuilder");
        assert_eq!(BranchingStrategy::FirstFail.to_string(), "FirstFail");
    }
}
