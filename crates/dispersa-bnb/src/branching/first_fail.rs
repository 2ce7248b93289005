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

//! First-fail branching with spread-out value ordering
//!
//! Variable choice: the unfixed facility variable with the fewest remaining
//! values, ties broken by the lowest facility index. Small domains fail
//! early, which keeps refutations shallow.
//!
//! Value choice: candidate points are ranked by their distance to the
//! nearest facility that is already fixed, farthest first. This steers the
//! first dive towards well spread placements, so a strong incumbent is found
//! early and the `B >= best + 1` cut bites sooner. With nothing fixed yet all
//! points rank equal and the lowest point index goes first.

use crate::{
    branching::decision::{Decision, DecisionBuilder},
    state::SearchState,
};
use dispersa_model::{
    index::{PointIndex, VariableIndex},
    model::DispersionModel,
    num::DistanceNumeric,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RankedValue {
    spread: usize,
    value: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FirstFailBuilder {
    ranked: Vec<RankedValue>,
    placed: Vec<usize>,
    decisions: Vec<Decision>,
}

impl FirstFailBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder sized for `num_points` candidates and `num_facilities` facilities.
    #[inline]
    pub fn preallocated(num_points: usize, num_facilities: usize) -> Self {
        Self {
            ranked: Vec::with_capacity(num_points),
            placed: Vec::with_capacity(num_facilities),
            decisions: Vec::with_capacity(num_points),
        }
    }

    fn select_variable<T>(model: &DispersionModel<T>, state: &SearchState) -> Option<VariableIndex>
    where
        T: DistanceNumeric,
    {
        model
            .facility_variables()
            .filter(|&v| !state.is_fixed(v))
            .min_by_key(|&v| (state.domain(v).size(), v.get()))
    }
}

impl<T> DecisionBuilder<T> for FirstFailBuilder
where
    T: DistanceNumeric,
{
    type DecisionIterator<'a>
        = std::vec::Drain<'a, Decision>
    where
        Self: 'a,
        T: 'a;

    fn name(&self) -> &str {
        "FirstFailBuilder"
    }

    fn next_decision<'a>(
        &'a mut self,
        model: &'a DispersionModel<T>,
        state: &'a SearchState,
    ) -> Self::DecisionIterator<'a> {
        self.decisions.clear();
        self.ranked.clear();
        self.placed.clear();

        let Some(variable) = Self::select_variable(model, state) else {
            return self.decisions.drain(..);
        };

        self.placed.extend(
            model
                .facility_variables()
                .filter_map(|v| state.domain(v).value()),
        );

        let distances = model.distances();
        let unplaced = usize::MAX;
        for value in state.domain(variable).iter() {
            let spread = self
                .placed
                .iter()
                .map(|&other| {
                    distances
                        .get(PointIndex::new(value), PointIndex::new(other))
                        .to_usize()
                        .unwrap_or(0)
                })
                .min()
                .unwrap_or(unplaced);
            self.ranked.push(RankedValue { spread, value });
        }

        // Worst first; the stack explores the last entry first.
        self.ranked
            .sort_unstable_by(|a, b| a.spread.cmp(&b.spread).then(b.value.cmp(&a.value)));
        self.decisions.extend(
            self.ranked
                .iter()
                .map(|r| Decision::new(variable, r.value)),
        );

        self.decisions.drain(..)
    }
}
