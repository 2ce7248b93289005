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

//! Input-order branching
//!
//! Branches on the first unfixed facility variable `F_k` (lowest `k`) and
//! explores its values in ascending point order. Deterministic and cheap;
//! mostly useful as a baseline and for reproducing reference traces.

use crate::{
    branching::decision::{Decision, DecisionBuilder},
    state::SearchState,
};
use dispersa_model::{model::DispersionModel, num::DistanceNumeric};

#[derive(Debug, Clone, Default)]
pub struct InputOrderBuilder {
    decisions: Vec<Decision>,
}

impl InputOrderBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with room for `num_points` decisions.
    #[inline]
    pub fn preallocated(num_points: usize) -> Self {
        Self {
            decisions: Vec::with_capacity(num_points),
        }
    }
}

impl<T> DecisionBuilder<T> for InputOrderBuilder
where
    T: DistanceNumeric,
{
    type DecisionIterator<'a>
        = std::vec::Drain<'a, Decision>
    where
        Self: 'a,
        T: 'a;

    fn name(&self) -> &str {
        "InputOrderBuilder"
    }

    fn next_decision<'a>(
        &'a mut self,
        model: &'a DispersionModel<T>,
        state: &'a SearchState,
    ) -> Self::DecisionIterator<'a> {
        self.decisions.clear();

        if let Some(variable) = model
            .facility_variables()
            .find(|&v| !state.is_fixed(v))
        {
            self.decisions.extend(
                state
                    .domain(variable)
                    .iter()
                    .map(|value| Decision::new(variable, value)),
            );
            // Largest first: the stack pops the smallest value first.
            self.decisions.reverse();
        }

        self.decisions.drain(..)
    }
}
