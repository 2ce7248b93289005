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
    propagation::{Inconsistency, PropagationContext, PropagationResult, Propagator},
    state::SearchState,
};
use dispersa_model::{bounds::BoundSemantics, index::VariableIndex};

/// Keeps a variable inside a band of admissible values.
///
/// The band is normalised to the inclusive interval `[lower, upper]` at
/// construction, so exclusive bounds `(l, u)` become `[l + 1, u - 1]`. An
/// interval that ends below zero or is empty admits nothing.
#[derive(Debug, Clone)]
pub struct RangePropagator {
    scope: [VariableIndex; 1],
    lower: i64,
    upper: i64,
}

impl RangePropagator {
    /// Creates the propagator for the band `(lower, upper)` read under `semantics`.
    pub fn new(variable: VariableIndex, lower: i64, upper: i64, semantics: BoundSemantics) -> Self {
        let (lower, upper) = match semantics {
            BoundSemantics::Exclusive => (lower.saturating_add(1), upper.saturating_sub(1)),
            BoundSemantics::Inclusive => (lower, upper),
        };
        Self {
            scope: [variable],
            lower,
            upper,
        }
    }

    /// The inclusive interval this propagator enforces.
    #[inline]
    pub fn interval(&self) -> (i64, i64) {
        (self.lower, self.upper)
    }

    #[inline]
    fn admits(&self, value: usize) -> bool {
        i64::try_from(value).is_ok_and(|v| self.lower <= v && v <= self.upper)
    }
}

impl Propagator for RangePropagator {
    fn name(&self) -> &str {
        "Range"
    }

    fn scope(&self) -> &[VariableIndex] {
        &self.scope
    }

    fn propagate(&self, ctx: &mut PropagationContext<'_>) -> PropagationResult {
        let variable = self.scope[0];
        if self.upper < 0 || self.lower > self.upper {
            ctx.retain(variable, |_| false)?;
            return Err(Inconsistency { variable });
        }
        ctx.retain(variable, |v| self.admits(v)).map(|_| ())
    }

    fn is_satisfied(&self, state: &SearchState) -> bool {
        state
            .domain(self.scope[0])
            .value()
            .is_some_and(|v| self.admits(v))
    }
}
